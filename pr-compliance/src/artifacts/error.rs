//! Artifact I/O error types.

use thiserror::Error;

/// Errors raised while reading or writing stage artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Filesystem failure.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failure.
    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Building the columnar batch failed.
    #[error("Failed to build columns for '{path}': {source}")]
    Arrow {
        path: String,
        #[source]
        source: arrow::error::ArrowError,
    },

    /// Writing the parquet file failed.
    #[error("Failed to write parquet '{path}': {source}")]
    Parquet {
        path: String,
        #[source]
        source: parquet::errors::ParquetError,
    },
}
