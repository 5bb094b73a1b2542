use std::sync::Arc;

use async_trait::async_trait;
use common::ListOrder;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::time::{sleep, Duration};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::{DbError, Result};
use crate::models::{GithubEventRow, NewGithubEvent};
use crate::repositories::{EventRepository, Repositories};

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(DbError::Migration)
}

#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
    event_repo: Arc<PgEventRepository>,
}

impl PgDatabase {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        const MAX_ATTEMPTS: u32 = 5;
        const BASE_DELAY_MS: u64 = 500;

        let mut attempts = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(max_connections)
                .connect(database_url)
                .await
            {
                Ok(pool) => {
                    run_migrations(&pool).await?;
                    return Ok(Self::from_pool(pool));
                }
                Err(err) => {
                    attempts += 1;
                    if attempts >= MAX_ATTEMPTS {
                        return Err(DbError::Query(err));
                    }

                    let exp = (attempts - 1).min(5);
                    let backoff = Duration::from_millis(BASE_DELAY_MS * (1u64 << exp));
                    warn!(
                        attempts,
                        error = %err,
                        wait_ms = backoff.as_millis(),
                        "database connection failed; retrying"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let event_repo = Arc::new(PgEventRepository { pool: pool.clone() });
        Self { pool, event_repo }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Repositories for PgDatabase {
    fn events(&self) -> &dyn EventRepository {
        &*self.event_repo
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(DbError::Query)
    }
}

#[derive(Clone)]
struct PgEventRepository {
    pool: PgPool,
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[instrument(skip(self, event), fields(request_id = %event.request_id))]
    async fn insert(&self, event: NewGithubEvent) -> Result<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO github_events
                (id, request_id, author, from_branch, to_branch, "timestamp", occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.request_id)
        .bind(event.author)
        .bind(event.from_branch)
        .bind(event.to_branch)
        .bind(event.timestamp)
        .bind(event.occurred_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::Query)
    }

    #[instrument(skip(self))]
    async fn list(&self, order: ListOrder) -> Result<Vec<GithubEventRow>> {
        let order_by = match order {
            ListOrder::Chronological => "occurred_at DESC NULLS LAST, received_at DESC",
            ListOrder::FormattedTimestamp => r#""timestamp" DESC"#,
        };
        let sql = format!(
            r#"
            SELECT request_id, author, from_branch, to_branch, "timestamp"
            FROM github_events
            ORDER BY {order_by}
            "#
        );
        sqlx::query_as::<_, GithubEventRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Query)
    }
}
