//! Error types for digestline-fetch.

use thiserror::Error;

/// Failure to digest a single URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("max retries exceeded ({count} attempts): {last}")]
    MaxRetriesExceeded {
        count: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool { matches!(self, FetchError::Network(_)) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported hash algorithm: {0}")]
pub struct ParseAlgorithmError(pub String);
