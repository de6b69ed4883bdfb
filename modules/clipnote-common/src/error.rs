use thiserror::Error;

/// Failures from the content fetcher, after its local retry policy has run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("content not found")]
    NotFound,

    #[error("rate limited by content service")]
    RateLimited,

    #[error("retries exhausted; last error: {0}")]
    Exhausted(String),

    #[error("content request timed out")]
    Timeout,

    #[error("content service error: {0}")]
    Upstream(String),
}

/// The one hard-failure path out of a dual analysis: neither provider
/// produced a usable fragment, so no Summary can be synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("both providers failed (primary: {primary}; secondary: {secondary})")]
    BothProvidersFailed { primary: String, secondary: String },
}
