#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("invalid {event} payload: {source}")]
    InvalidPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("first commit has no author name")]
    MissingCommitAuthor,
}
