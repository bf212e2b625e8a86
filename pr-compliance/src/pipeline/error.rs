//! Pipeline error types.

use crate::artifacts::ArtifactError;
use crate::compliance::TransformError;
use crate::config::ConfigError;
use crate::github::GitHubError;

/// Errors that fail a pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// GitHub access failed outside the per-record isolation boundary.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// Schema loading, validation or record decoding failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Reading or writing an artifact failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
