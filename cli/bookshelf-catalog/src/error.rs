//! Error handling for catalog API operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Required input was missing or malformed.
///
/// These are detected before any request is issued, so a validation failure
/// guarantees no network traffic happened.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("search query must not be empty")]
    EmptyQuery,
    #[error("work id must not be empty")]
    EmptyId,
}

/// The transport failed or the catalog answered with an unexpected status.
///
/// A 404 on a work lookup is not a [NetworkError]; it is surfaced as a
/// successful `None` result instead.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("request failed with status {0}")]
    Status(StatusCode),
    #[error("failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Common error type for catalog API operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("invalid catalog configuration: {0}")]
    Config(String),
}
