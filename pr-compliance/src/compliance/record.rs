//! Widened pull request rows produced by the compliance transform.

use super::rules::ComplianceRules;
use crate::models::{CheckRunResult, PullRequestRecord, ReviewState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pull request with its compliance flags, under the normalized column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    /// Pull request number.
    pub pr_number: u64,

    /// Pull request title.
    pub pr_title: String,

    /// Author login.
    pub user_login: String,

    /// Author account id.
    pub user_id: u64,

    /// Repository name.
    pub repository: String,

    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,

    /// Merge time.
    pub merged_at: Option<DateTime<Utc>>,

    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,

    /// Target branch.
    pub base_branch: String,

    /// Source branch.
    pub head_branch: String,

    /// Review outcomes.
    pub reviews: Vec<ReviewState>,

    /// Approving review count carried forward from extraction.
    pub code_review_passed: u32,

    /// Check runs of the reference commit.
    pub check_runs: Vec<CheckRunResult>,

    /// Combined commit status of the reference commit.
    pub combined_status: Option<String>,

    /// Every check run concluded with the required conclusion.
    pub status_checks_passed: bool,

    /// Review and status checks both passed.
    pub is_compliant: bool,
}

impl ComplianceRecord {
    /// Derives the compliance flags of `record`.
    pub fn evaluate(record: PullRequestRecord, rules: &ComplianceRules) -> Self {
        let status_checks_passed = status_checks_passed(&record.check_runs, rules);
        let review_passed = code_review_passed(record.approved_reviews, rules);

        Self {
            pr_number: record.number,
            pr_title: record.title,
            user_login: record.user_login,
            user_id: record.user_id,
            repository: record.repository,
            created_at: record.created_at,
            merged_at: record.merged_at,
            closed_at: record.closed_at,
            base_branch: record.base_branch,
            head_branch: record.head_branch,
            reviews: record.reviews,
            code_review_passed: record.approved_reviews,
            check_runs: record.check_runs,
            combined_status: record.combined_status,
            status_checks_passed,
            is_compliant: review_passed && status_checks_passed,
        }
    }
}

/// True when every check run has the required conclusion. Vacuously true for no runs.
pub fn status_checks_passed(check_runs: &[CheckRunResult], rules: &ComplianceRules) -> bool {
    check_runs
        .iter()
        .all(|run| run.conclusion.as_deref() == Some(rules.required_conclusion.as_str()))
}

/// True when `approved_reviews` meets the approval threshold.
pub fn code_review_passed(approved_reviews: u32, rules: &ComplianceRules) -> bool {
    approved_reviews > 0 && approved_reviews >= rules.min_approvals
}
