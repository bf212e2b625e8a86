//! Normalized pull request records written by the extract stage.

use crate::github::{RawCheckRun, RawPullRequest, RawReview};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review state counted as an approval.
pub const APPROVED_STATE: &str = "APPROVED";

/// Outcome of a single review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    /// State as reported by GitHub (`APPROVED`, `CHANGES_REQUESTED`, ...).
    pub state: String,
}

impl ReviewState {
    /// Returns true for an approving review.
    pub fn is_approval(&self) -> bool {
        self.state == APPROVED_STATE
    }
}

impl From<RawReview> for ReviewState {
    fn from(raw: RawReview) -> Self {
        Self { state: raw.state }
    }
}

/// Outcome of a single check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunResult {
    /// Check name.
    pub name: String,

    /// Conclusion, `None` until the run completes.
    pub conclusion: Option<String>,

    /// Completion time, `None` until the run completes.
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<RawCheckRun> for CheckRunResult {
    fn from(raw: RawCheckRun) -> Self {
        Self {
            name: raw.name,
            conclusion: raw.conclusion,
            completed_at: raw.completed_at,
        }
    }
}

/// One enriched pull request.
///
/// Built once per pull request by [`PullRequestRecord::new`], which derives
/// `approved_reviews` from `reviews`. The normalized names produced by the
/// compliance transform are accepted as aliases so a widened batch can be
/// read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// Pull request number, unique within the repository.
    #[serde(alias = "pr_number")]
    pub number: u64,

    /// Pull request title.
    #[serde(alias = "pr_title")]
    pub title: String,

    /// Author login.
    pub user_login: String,

    /// Author account id.
    pub user_id: u64,

    /// Repository name.
    pub repository: String,

    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,

    /// Merge time, `None` when closed without merging.
    pub merged_at: Option<DateTime<Utc>>,

    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,

    /// Target branch.
    pub base_branch: String,

    /// Source branch.
    pub head_branch: String,

    /// Review outcomes in API order.
    pub reviews: Vec<ReviewState>,

    /// Number of `reviews` whose state is [`APPROVED_STATE`].
    #[serde(alias = "code_review_passed")]
    pub approved_reviews: u32,

    /// Check runs of the reference commit.
    pub check_runs: Vec<CheckRunResult>,

    /// Combined commit status of the reference commit.
    #[serde(default)]
    pub combined_status: Option<String>,
}

impl PullRequestRecord {
    /// Assembles a record from the listing entry and its fetched details.
    pub fn new(
        raw: &RawPullRequest,
        repository: &str,
        reviews: Vec<ReviewState>,
        check_runs: Vec<CheckRunResult>,
        combined_status: Option<String>,
    ) -> Self {
        let approved_reviews = count_approvals(&reviews);
        Self {
            number: raw.number,
            title: raw.title.clone(),
            user_login: raw.user.login.clone(),
            user_id: raw.user.id,
            repository: repository.to_string(),
            created_at: raw.created_at,
            merged_at: raw.merged_at,
            closed_at: raw.closed_at,
            base_branch: raw.base.name.clone(),
            head_branch: raw.head.name.clone(),
            reviews,
            approved_reviews,
            check_runs,
            combined_status,
        }
    }
}

/// Counts approving reviews.
pub fn count_approvals(reviews: &[ReviewState]) -> u32 {
    reviews.iter().filter(|review| review.is_approval()).count() as u32
}
