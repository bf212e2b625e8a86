//! Aggregate compliance figures.

use super::record::ComplianceRecord;
use serde::{Deserialize, Serialize};

/// Compliance figures for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    /// Number of pull requests evaluated.
    pub total_prs: usize,

    /// Number of compliant pull requests.
    pub compliant_prs: usize,

    /// `compliant_prs / total_prs`, or `0.0` for an empty batch.
    pub compliance_rate: f64,
}

impl ComplianceSummary {
    /// Builds a summary from raw counts.
    #[must_use]
    pub fn new(total_prs: usize, compliant_prs: usize) -> Self {
        let compliance_rate = if total_prs == 0 {
            0.0
        } else {
            compliant_prs as f64 / total_prs as f64
        };

        Self {
            total_prs,
            compliant_prs,
            compliance_rate,
        }
    }

    /// Summarises a widened batch.
    #[must_use]
    pub fn from_records(records: &[ComplianceRecord]) -> Self {
        let compliant = records.iter().filter(|record| record.is_compliant).count();
        Self::new(records.len(), compliant)
    }
}
