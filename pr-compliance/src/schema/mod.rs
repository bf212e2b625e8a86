//! JSON Schema validation of the extract output.

mod error;

pub use error::{SchemaError, SchemaViolation};

use serde_json::Value;
use std::path::Path;
use tracing::{error, info};

/// Reads and compiles-checks a JSON Schema document.
///
/// # Errors
///
/// Returns [`SchemaError::Unavailable`] if the file is missing or not JSON,
/// and [`SchemaError::InvalidSchema`] if it is not a valid schema.
pub fn load_schema(path: &Path) -> Result<Value, SchemaError> {
    let unavailable = |message: String| SchemaError::Unavailable {
        path: path.display().to_string(),
        message,
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| unavailable(e.to_string()))?;
    let schema: Value = serde_json::from_str(&content)
        .map_err(|e| unavailable(e.to_string()))?;

    jsonschema::validator_for(&schema).map_err(|e| SchemaError::InvalidSchema {
        message: e.to_string(),
    })?;

    info!(path = %path.display(), "Loaded schema");
    Ok(schema)
}

/// Checks `batch` against `schema`, collecting every violation.
///
/// # Errors
///
/// Returns [`SchemaError::Violation`] listing each violation, or
/// [`SchemaError::InvalidSchema`] if `schema` does not compile.
pub fn validate_batch(batch: &Value, schema: &Value) -> Result<(), SchemaError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| SchemaError::InvalidSchema {
        message: e.to_string(),
    })?;

    let violations: Vec<SchemaViolation> = validator
        .iter_errors(batch)
        .map(|e| SchemaViolation {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if violations.is_empty() {
        info!("Schema validation passed");
        return Ok(());
    }

    for violation in &violations {
        error!(path = %violation.path, message = %violation.message, "Schema violation");
    }
    Err(SchemaError::Violation { violations })
}
