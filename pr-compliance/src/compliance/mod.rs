//! Compliance evaluation of extracted pull requests.
//!
//! A pull request is compliant when its code review passed (enough approving
//! reviews) and every check run on its reference commit concluded with the
//! required conclusion.

mod error;
mod record;
mod rules;
mod summary;

pub use error::TransformError;
pub use record::{code_review_passed, status_checks_passed, ComplianceRecord};
pub use rules::{ComplianceRules, REQUIRED_CHECK_CONCLUSION};
pub use summary::ComplianceSummary;

use crate::models::PullRequestRecord;
use tracing::{info, warn};

/// Widens every record with its compliance flags and summarises the batch.
///
/// An empty batch yields an empty widened batch and a zero summary.
pub fn transform(
    batch: Vec<PullRequestRecord>,
    rules: &ComplianceRules,
) -> (Vec<ComplianceRecord>, ComplianceSummary) {
    if batch.is_empty() {
        warn!("No pull requests to transform");
        return (Vec::new(), ComplianceSummary::default());
    }

    let records: Vec<ComplianceRecord> = batch
        .into_iter()
        .map(|record| ComplianceRecord::evaluate(record, rules))
        .collect();
    let summary = ComplianceSummary::from_records(&records);

    info!(
        total_prs = summary.total_prs,
        compliant_prs = summary.compliant_prs,
        compliance_rate = summary.compliance_rate,
        "Compliance summary"
    );

    (records, summary)
}
