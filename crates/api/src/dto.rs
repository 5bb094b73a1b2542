use serde::Serialize;
use uuid::Uuid;

use db::models::{GithubEventRow, NewGithubEvent};
use normalizer::NormalizedEvent;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WebhookResponse {
    Success { message: String, event_id: String },
    Ignored { message: String },
}

impl WebhookResponse {
    pub fn stored(event_id: Uuid) -> Self {
        Self::Success {
            message: "Event processed and stored".to_string(),
            event_id: event_id.to_string(),
        }
    }

    pub fn ignored(event_type: &str) -> Self {
        Self::Ignored {
            message: format!("{event_type} not handled"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventDto {
    pub request_id: String,
    pub author: String,
    pub from_branch: String,
    pub to_branch: String,
    pub timestamp: String,
}

impl From<GithubEventRow> for EventDto {
    fn from(row: GithubEventRow) -> Self {
        Self {
            request_id: row.request_id,
            author: row.author,
            from_branch: row.from_branch,
            to_branch: row.to_branch,
            timestamp: row.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub status: &'static str,
    pub events: Vec<EventDto>,
}

impl EventsResponse {
    pub fn success(events: Vec<EventDto>) -> Self {
        Self {
            status: "success",
            events,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl StatusResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            message: "Webhook service is running",
        }
    }

    pub fn ready() -> Self {
        Self {
            status: "ready",
            message: "Event store is reachable",
        }
    }
}

pub fn new_event(event: NormalizedEvent) -> NewGithubEvent {
    let NormalizedEvent {
        record,
        occurred_at,
    } = event;
    NewGithubEvent {
        request_id: record.request_id,
        author: record.author,
        from_branch: record.from_branch,
        to_branch: record.to_branch,
        timestamp: record.timestamp,
        occurred_at,
    }
}
