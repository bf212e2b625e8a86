//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while building the pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No GitHub token was supplied.
    #[error("GitHub token is required")]
    MissingToken,

    /// A required repository coordinate was empty.
    #[error("Missing required setting: {field}")]
    MissingField { field: &'static str },

    /// A setting was present but unusable.
    #[error("Invalid value for '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}
