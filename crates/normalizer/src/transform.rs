use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::NormalizeError;
use crate::models::{EventRecord, NormalizedEvent, UNKNOWN};
use crate::payloads::{BranchRef, PullRequestEventPayload, PullRequestPayload, PushPayload};
use crate::timestamp::format_timestamp;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Result of applying one normalization rule to a payload.
#[derive(Debug)]
pub enum RuleOutcome {
    Matched(NormalizedEvent),
    /// The payload is well formed but this rule does not cover it (e.g. another action).
    NotApplicable,
    Malformed(NormalizeError),
}

pub fn normalize_push(payload: &Value) -> RuleOutcome {
    apply_rule("push", payload, |push: PushPayload| {
        let to_branch = push
            .git_ref
            .as_deref()
            .map(|git_ref| git_ref.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(git_ref))
            .unwrap_or_default()
            .to_string();

        let commits = push.commits.unwrap_or_default();
        let author = match commits.first() {
            Some(first) => first
                .author
                .as_ref()
                .and_then(|author| author.name.clone())
                .ok_or(NormalizeError::MissingCommitAuthor)?,
            None => push
                .pusher
                .and_then(|pusher| pusher.name)
                .unwrap_or_else(|| UNKNOWN.to_string()),
        };

        let head_commit = push.head_commit.unwrap_or_default();
        Ok(Some(build_event(
            head_commit.id.unwrap_or_default(),
            author,
            String::new(),
            to_branch,
            head_commit.timestamp.as_deref(),
        )))
    })
}

pub fn normalize_pull_request_opened(payload: &Value) -> RuleOutcome {
    apply_rule("pull_request", payload, |event: PullRequestEventPayload| {
        if !matches!(event.action.as_deref(), Some("opened" | "reopened")) {
            return Ok(None);
        }

        let pr = event.pull_request.unwrap_or_default();
        let author = login_or_unknown(pr.user.as_ref().and_then(|user| user.login.clone()));
        Ok(Some(pull_request_event(&pr, author, pr.created_at.as_deref())))
    })
}

pub fn normalize_pull_request_merged(payload: &Value) -> RuleOutcome {
    apply_rule("merge", payload, |event: PullRequestEventPayload| {
        let pr = event.pull_request.unwrap_or_default();
        if event.action.as_deref() != Some("closed") || pr.merged != Some(true) {
            return Ok(None);
        }

        let author = login_or_unknown(pr.merged_by.as_ref().and_then(|user| user.login.clone()));
        Ok(Some(pull_request_event(&pr, author, pr.merged_at.as_deref())))
    })
}

fn apply_rule<P, F>(rule: &'static str, payload: &Value, extract: F) -> RuleOutcome
where
    P: DeserializeOwned,
    F: FnOnce(P) -> Result<Option<NormalizedEvent>, NormalizeError>,
{
    let result = P::deserialize(payload)
        .map_err(|source| NormalizeError::InvalidPayload {
            event: rule,
            source,
        })
        .and_then(extract);

    match result {
        Ok(Some(event)) => RuleOutcome::Matched(event),
        Ok(None) => {
            debug!(rule, "rule does not apply to payload");
            RuleOutcome::NotApplicable
        }
        Err(err) => {
            warn!(rule, error = %err, "dropping malformed payload");
            RuleOutcome::Malformed(err)
        }
    }
}

fn pull_request_event(
    pr: &PullRequestPayload,
    author: String,
    timestamp: Option<&str>,
) -> NormalizedEvent {
    build_event(
        pr.head
            .as_ref()
            .and_then(|head| head.sha.clone())
            .unwrap_or_default(),
        author,
        branch_or_unknown(pr.head.as_ref()),
        branch_or_unknown(pr.base.as_ref()),
        timestamp,
    )
}

fn build_event(
    request_id: String,
    author: String,
    from_branch: String,
    to_branch: String,
    timestamp: Option<&str>,
) -> NormalizedEvent {
    let formatted = format_timestamp(timestamp.unwrap_or_default());
    NormalizedEvent {
        record: EventRecord {
            request_id,
            author,
            from_branch,
            to_branch,
            timestamp: formatted.display,
        },
        occurred_at: formatted.parsed,
    }
}

fn branch_or_unknown(branch: Option<&BranchRef>) -> String {
    branch
        .and_then(|branch| branch.name.clone())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn login_or_unknown(login: Option<String>) -> String {
    login.unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matched(outcome: RuleOutcome) -> EventRecord {
        match outcome {
            RuleOutcome::Matched(event) => event.record,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    fn pull_request(action: &str, merged: bool) -> Value {
        json!({
            "action": action,
            "pull_request": {
                "user": {"login": "octocat"},
                "merged_by": {"login": "hubot"},
                "merged": merged,
                "head": {"ref": "feature/login", "sha": "f00dfeed"},
                "base": {"ref": "main", "sha": "0ff1ce"},
                "created_at": "2024-06-01T09:30:00Z",
                "merged_at": "2024-06-12T17:45:00Z"
            }
        })
    }

    #[test]
    fn push_strips_branch_prefix() {
        let record = matched(normalize_push(&json!({
            "ref": "refs/heads/release/2024.06",
            "commits": [{"author": {"name": "Alice"}}],
            "head_commit": {"id": "abc123", "timestamp": "2024-06-03T14:15:00Z"}
        })));
        assert_eq!(record.to_branch, "release/2024.06");
        assert_eq!(record.from_branch, "");
        assert_eq!(record.author, "Alice");
        assert_eq!(record.request_id, "abc123");
        assert_eq!(record.timestamp, "3rd June 2024 - 02:15 PM UTC");
    }

    #[test]
    fn push_keeps_non_branch_refs() {
        let record = matched(normalize_push(&json!({"ref": "refs/tags/v1.0.0"})));
        assert_eq!(record.to_branch, "refs/tags/v1.0.0");
    }

    #[test]
    fn push_without_commits_falls_back_to_pusher() {
        let record = matched(normalize_push(&json!({
            "ref": "refs/heads/main",
            "commits": [],
            "pusher": {"name": "bob"}
        })));
        assert_eq!(record.author, "bob");
        assert_eq!(record.request_id, "");
        assert_eq!(record.timestamp, "");
    }

    #[test]
    fn push_with_nothing_uses_defaults() {
        let outcome = normalize_push(&json!({}));
        let RuleOutcome::Matched(event) = outcome else {
            panic!("empty push should still produce a record");
        };
        assert_eq!(
            event.record,
            EventRecord {
                request_id: String::new(),
                author: UNKNOWN.into(),
                from_branch: String::new(),
                to_branch: String::new(),
                timestamp: String::new(),
            }
        );
        assert!(event.occurred_at.is_none());
    }

    #[test]
    fn push_commit_without_author_is_malformed() {
        let outcome = normalize_push(&json!({
            "ref": "refs/heads/main",
            "commits": [{"id": "abc"}],
            "pusher": {"name": "bob"}
        }));
        assert!(matches!(
            outcome,
            RuleOutcome::Malformed(NormalizeError::MissingCommitAuthor)
        ));
    }

    #[test]
    fn push_with_wrong_types_is_malformed() {
        let outcome = normalize_push(&json!({"ref": 7, "commits": "none"}));
        assert!(matches!(
            outcome,
            RuleOutcome::Malformed(NormalizeError::InvalidPayload { event: "push", .. })
        ));
    }

    #[test]
    fn opened_pull_request_uses_head_sha_and_created_at() {
        let record = matched(normalize_pull_request_opened(&pull_request("opened", false)));
        assert_eq!(record.request_id, "f00dfeed");
        assert_eq!(record.author, "octocat");
        assert_eq!(record.from_branch, "feature/login");
        assert_eq!(record.to_branch, "main");
        assert_eq!(record.timestamp, "1st June 2024 - 09:30 AM UTC");
    }

    #[test]
    fn reopened_pull_request_matches() {
        assert!(matches!(
            normalize_pull_request_opened(&pull_request("reopened", false)),
            RuleOutcome::Matched(_)
        ));
    }

    #[test]
    fn opened_rule_ignores_other_actions() {
        for action in ["closed", "synchronize", "edited"] {
            assert!(matches!(
                normalize_pull_request_opened(&pull_request(action, true)),
                RuleOutcome::NotApplicable
            ));
        }
    }

    #[test]
    fn opened_pull_request_with_null_fields_uses_unknown() {
        let record = matched(normalize_pull_request_opened(&json!({
            "action": "opened",
            "pull_request": {"user": null, "head": {"ref": null}}
        })));
        assert_eq!(record.author, UNKNOWN);
        assert_eq!(record.from_branch, UNKNOWN);
        assert_eq!(record.to_branch, UNKNOWN);
        assert_eq!(record.request_id, "");
        assert_eq!(record.timestamp, "");
    }

    #[test]
    fn merged_pull_request_uses_merger_and_merged_at() {
        let record = matched(normalize_pull_request_merged(&pull_request("closed", true)));
        assert_eq!(record.author, "hubot");
        assert_eq!(record.request_id, "f00dfeed");
        assert_eq!(record.timestamp, "12th June 2024 - 05:45 PM UTC");
    }

    #[test]
    fn closed_without_merge_is_not_applicable() {
        assert!(matches!(
            normalize_pull_request_merged(&pull_request("closed", false)),
            RuleOutcome::NotApplicable
        ));
        assert!(matches!(
            normalize_pull_request_merged(&json!({"action": "closed", "pull_request": {}})),
            RuleOutcome::NotApplicable
        ));
    }

    #[test]
    fn merged_rule_requires_closed_action() {
        assert!(matches!(
            normalize_pull_request_merged(&pull_request("opened", true)),
            RuleOutcome::NotApplicable
        ));
    }

    #[test]
    fn unparseable_merge_time_is_kept_raw() {
        let mut payload = pull_request("closed", true);
        payload["pull_request"]["merged_at"] = json!("yesterday");
        let outcome = normalize_pull_request_merged(&payload);
        let RuleOutcome::Matched(event) = outcome else {
            panic!("merged pull request should match");
        };
        assert_eq!(event.record.timestamp, "yesterday");
        assert!(event.occurred_at.is_none());
    }
}
