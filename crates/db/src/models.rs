use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored event as listed back to callers; the row id is not selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GithubEventRow {
    pub request_id: String,
    pub author: String,
    pub from_branch: String,
    pub to_branch: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGithubEvent {
    pub request_id: String,
    pub author: String,
    pub from_branch: String,
    pub to_branch: String,
    pub timestamp: String,
    /// Parsed instant behind `timestamp`; drives chronological listing.
    pub occurred_at: Option<DateTime<Utc>>,
}
