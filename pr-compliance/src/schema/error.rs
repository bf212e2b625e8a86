//! Schema validation error types.

use std::fmt;
use thiserror::Error;

/// One place where a batch departs from the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer to the offending value (empty for the document root).
    pub path: String,

    /// Validator message.
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path}: {}", self.message)
    }
}

/// Errors raised while loading a schema or validating against it.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema document could not be read or parsed as JSON.
    #[error("Schema '{path}' is unavailable: {message}")]
    Unavailable { path: String, message: String },

    /// The document is JSON but not a usable JSON Schema.
    #[error("Schema is not a valid JSON Schema: {message}")]
    InvalidSchema { message: String },

    /// The batch does not conform to the schema.
    #[error("Batch failed schema validation: {}", describe(.violations))]
    Violation { violations: Vec<SchemaViolation> },
}

fn describe(violations: &[SchemaViolation]) -> String {
    match violations.first() {
        Some(first) => format!("{} violation(s), first at {first}", violations.len()),
        None => "no violations".to_string(),
    }
}
