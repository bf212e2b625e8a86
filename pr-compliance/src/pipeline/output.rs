//! Paths and figures handed from one stage to the next.

use crate::compliance::ComplianceSummary;
use serde::Serialize;
use std::path::PathBuf;

/// Result of the extract stage.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractOutput {
    /// Unmodified pull request listing.
    pub raw_path: PathBuf,

    /// Enriched records; input of the transform stage.
    pub processed_path: PathBuf,

    /// Number of records written.
    pub count: usize,
}

/// Result of the transform stage.
#[derive(Debug, Clone, Serialize)]
pub struct TransformOutput {
    /// Widened records; input of the load stage.
    pub compliance_path: PathBuf,

    /// Summary JSON.
    pub summary_path: PathBuf,

    /// Summary figures.
    pub summary: ComplianceSummary,
}

/// Result of the load stage.
#[derive(Debug, Clone, Serialize)]
pub struct LoadOutput {
    /// Parquet file written.
    pub parquet_path: PathBuf,

    /// Number of rows in the file.
    pub rows: usize,
}

/// Results of a full extract, transform and load run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Run identifier used for artifact names.
    pub run_id: String,

    /// Extract stage result.
    pub extract: ExtractOutput,

    /// Transform stage result.
    pub transform: TransformOutput,

    /// Load stage result.
    pub load: LoadOutput,
}
