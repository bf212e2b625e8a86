//! Reading and writing stage artifacts.
//!
//! Every write lands in a temporary file next to the destination and is then
//! renamed over it, so a failed stage never leaves a truncated artifact behind.

mod columnar;
mod error;

pub use self::columnar::{compliance_schema, write_parquet};
pub use self::error::ArtifactError;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Reads a JSON artifact.
///
/// # Errors
///
/// Returns [`ArtifactError::Io`] if the file cannot be read and
/// [`ArtifactError::Json`] if it does not decode into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let value = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Json {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), "Read JSON artifact");
    Ok(value)
}

/// Writes `value` as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`ArtifactError::Json`] if `value` cannot be encoded and
/// [`ArtifactError::Io`] if the file cannot be written.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| ArtifactError::Json {
        path: path.display().to_string(),
        source,
    })?;

    let mut file = staging_file(path)?;
    file.write_all(&bytes)
        .and_then(|()| file.flush())
        .map_err(|source| io_error(path, source))?;
    persist(file, path)?;

    info!(path = %path.display(), bytes = bytes.len(), "Wrote JSON artifact");
    Ok(())
}

/// Creates a temporary file in the destination directory.
pub(crate) fn staging_file(path: &Path) -> Result<NamedTempFile, ArtifactError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|source| io_error(path, source))?;
    NamedTempFile::new_in(dir).map_err(|source| io_error(path, source))
}

/// Moves a finished temporary file onto `path`.
pub(crate) fn persist(file: NamedTempFile, path: &Path) -> Result<(), ArtifactError> {
    file.persist(path)
        .map(|_| ())
        .map_err(|e| io_error(path, e.error))
}

fn io_error(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.display().to_string(),
        source,
    }
}
