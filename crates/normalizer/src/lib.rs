pub mod error;
pub mod models;
pub mod payloads;
pub mod router;
pub mod timestamp;
pub mod transform;

pub use error::NormalizeError;
pub use models::{EventRecord, NormalizedEvent};
pub use payloads::{PullRequestEventPayload, PushPayload};
pub use router::{normalize, route_event, EventKind, IgnoreReason, RouteOutcome};
pub use timestamp::{format_timestamp, readable_time, FormattedTimestamp, TimestampError};
pub use transform::{
    normalize_pull_request_merged, normalize_pull_request_opened, normalize_push, RuleOutcome,
};
