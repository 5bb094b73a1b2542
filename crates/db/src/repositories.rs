use async_trait::async_trait;
use common::ListOrder;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{GithubEventRow, NewGithubEvent};

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Stores the event under a fresh id. Identical events are stored again.
    async fn insert(&self, event: NewGithubEvent) -> Result<Uuid>;
    async fn list(&self, order: ListOrder) -> Result<Vec<GithubEventRow>>;
}

#[async_trait]
pub trait Repositories: Send + Sync {
    fn events(&self) -> &dyn EventRepository;
    /// Round trip to the store, independent of its contents.
    async fn ping(&self) -> Result<()>;
}
