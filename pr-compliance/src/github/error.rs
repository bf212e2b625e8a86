//! GitHub access error types.

use crate::retry::RetryError;
use thiserror::Error;

/// Errors from a single HTTP exchange with GitHub.
#[derive(Debug, Error)]
pub enum FetchError {
    /// GitHub answered with a non-success status.
    #[error("GitHub returned {status} for {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// The request could not be sent or the body could not be read.
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body was not the JSON shape the caller expected.
    #[error("Unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Returns the HTTP status for [`FetchError::Http`].
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced by [`GitHubClient`](super::GitHubClient) operations.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// A single request kept failing after every retry.
    #[error(transparent)]
    Request(#[from] RetryError<FetchError>),

    /// A page inside a paginated walk failed; nothing from the walk is kept.
    #[error("Failed to fetch page {page} of {path}: {source}")]
    Pagination {
        path: String,
        page: u32,
        #[source]
        source: RetryError<FetchError>,
    },

    /// A pull request in the listing lacked fields the pipeline needs.
    #[error("Unexpected pull request payload: {source}")]
    Payload {
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {message}")]
    Client { message: String },
}
