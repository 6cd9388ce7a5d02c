//! Error types for the aggregation engine, the dataset refresh and the request glue

use crate::validation::ValidationErrors;
use thiserror::Error;

/// Failures raised by the engine and the result cache.
///
/// The orchestrator never translates these; they reach the caller as-is.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("cannot compute {aggregation} over an empty series in group '{group}'")]
    EmptySeries { group: String, aggregation: String },

    #[error("corrupt cache document: {0}")]
    CacheCorruption(String),

    #[error("cannot persist cache: {0}")]
    Persistence(String),

    #[error("no country data loaded")]
    MissingDataset,
}

pub type Result<T> = std::result::Result<T, AggregationError>;

/// Failures while retrieving the raw country dataset.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status code {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed country data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything that can stop a request from producing a result.
///
/// `Display` is the single message shown to the user.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Could not retrieve country data, please try again later.")]
    Fetch(#[source] FetchError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

impl From<ValidationErrors> for ProcessError {
    fn from(errors: ValidationErrors) -> Self {
        ProcessError::Validation(errors)
    }
}

impl From<FetchError> for ProcessError {
    fn from(err: FetchError) -> Self {
        ProcessError::Fetch(err)
    }
}
