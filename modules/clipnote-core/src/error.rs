use thiserror::Error;

use ai_client::ProviderError;
use clipnote_common::{FetchError, MergeError};

use crate::parse::AnalysisFailure;

/// Terminal failures of a full analysis run. Everything recoverable
/// (retries, single-leg degradation) has already been handled upstream.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("content fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("could not parse provider reply: {0}")]
    Parse(AnalysisFailure),

    #[error(transparent)]
    Merge(#[from] MergeError),
}
