use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::error::NormalizeError;
use crate::models::{EventRecord, NormalizedEvent};
use crate::transform::{
    normalize_pull_request_merged, normalize_pull_request_opened, normalize_push, RuleOutcome,
};

/// Event types we normalize, keyed by the `X-GitHub-Event` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Push,
    PullRequest,
}

impl EventKind {
    pub fn from_header(label: &str) -> Option<Self> {
        match label {
            "push" => Some(Self::Push),
            "pull_request" => Some(Self::PullRequest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
        }
    }
}

#[derive(Debug)]
pub enum IgnoreReason {
    UnsupportedEvent,
    NotApplicable,
    Malformed(NormalizeError),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::UnsupportedEvent => f.write_str("unsupported event type"),
            IgnoreReason::NotApplicable => f.write_str("no rule applies"),
            IgnoreReason::Malformed(err) => write!(f, "malformed payload: {err}"),
        }
    }
}

#[derive(Debug)]
pub enum RouteOutcome {
    Record(NormalizedEvent),
    Ignored(IgnoreReason),
}

/// Dispatches a delivery to the rules for its event type. For `pull_request` the
/// opened/reopened rule runs before the merged rule.
pub fn route_event(event_type: &str, payload: &Value) -> RouteOutcome {
    let Some(kind) = EventKind::from_header(event_type) else {
        debug!(event_type, "unsupported event type");
        return RouteOutcome::Ignored(IgnoreReason::UnsupportedEvent);
    };

    let outcome = match kind {
        EventKind::Push => normalize_push(payload),
        EventKind::PullRequest => match normalize_pull_request_opened(payload) {
            RuleOutcome::Matched(event) => RuleOutcome::Matched(event),
            opened => match (opened, normalize_pull_request_merged(payload)) {
                (_, RuleOutcome::Matched(event)) => RuleOutcome::Matched(event),
                (RuleOutcome::Malformed(err), _) | (_, RuleOutcome::Malformed(err)) => {
                    RuleOutcome::Malformed(err)
                }
                _ => RuleOutcome::NotApplicable,
            },
        },
    };

    match outcome {
        RuleOutcome::Matched(event) => RouteOutcome::Record(event),
        RuleOutcome::NotApplicable => RouteOutcome::Ignored(IgnoreReason::NotApplicable),
        RuleOutcome::Malformed(err) => RouteOutcome::Ignored(IgnoreReason::Malformed(err)),
    }
}

/// Record for a delivery, or `None` when it is ignored for any reason.
pub fn normalize(event_type: &str, payload: &Value) -> Option<EventRecord> {
    match route_event(event_type, payload) {
        RouteOutcome::Record(event) => Some(event.record),
        RouteOutcome::Ignored(_) => None,
    }
}
