use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for author and pull request branch fields GitHub did not send.
pub const UNKNOWN: &str = "Unknown";

/// Canonical shape of one webhook delivery, whatever event produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    pub request_id: String,
    pub author: String,
    pub from_branch: String,
    pub to_branch: String,
    pub timestamp: String,
}

/// A record plus the instant its `timestamp` was rendered from, when it parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub record: EventRecord,
    pub occurred_at: Option<DateTime<Utc>>,
}
