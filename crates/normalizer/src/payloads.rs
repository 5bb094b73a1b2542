//! Webhook payload shapes as GitHub sends them.
//!
//! Every field is optional: a missing key and an explicit `null` both decode to `None`, and
//! the rules in [`crate::transform`] decide the default for each one. Keys we do not read are
//! ignored. A value of the wrong JSON type fails decoding.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub commits: Option<Vec<CommitPayload>>,
    pub pusher: Option<PusherPayload>,
    pub head_commit: Option<HeadCommitPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitPayload {
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitAuthor {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PusherPayload {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadCommitPayload {
    pub id: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestEventPayload {
    pub action: Option<String>,
    pub pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestPayload {
    pub user: Option<UserRef>,
    pub merged_by: Option<UserRef>,
    pub head: Option<BranchRef>,
    pub base: Option<BranchRef>,
    pub merged: Option<bool>,
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRef {
    pub login: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: Option<String>,
    pub sha: Option<String>,
}
