//! Transform error types.

use crate::schema::SchemaError;
use thiserror::Error;

/// Errors that stop the transform stage.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The schema was unavailable or the batch violated it.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The batch passed validation but could not be read as pull request records.
    #[error("Batch does not decode into pull request records: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}
