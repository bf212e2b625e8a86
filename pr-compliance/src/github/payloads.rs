//! Subsets of GitHub REST payloads consumed by the pipeline.
//!
//! Only the fields the pipeline reads are declared; serde ignores the rest.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// An entry of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPullRequest {
    /// Pull request number.
    pub number: u64,

    /// Pull request title.
    pub title: String,

    /// Author of the pull request.
    pub user: RawUser,

    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Merge time, absent for unmerged pull requests.
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,

    /// Close time, absent for open pull requests.
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,

    /// Target branch.
    pub base: RawBranch,

    /// Source branch.
    pub head: RawBranch,
}

/// A GitHub account reference.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    /// Account login.
    pub login: String,

    /// Numeric account id.
    pub id: u64,
}

/// The `base` or `head` side of a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBranch {
    /// Branch name.
    #[serde(rename = "ref")]
    pub name: String,

    /// Tip commit of the branch.
    #[serde(default)]
    pub sha: Option<String>,
}

/// An entry of `GET /pulls/{number}/reviews`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReview {
    /// Review outcome, e.g. `APPROVED`.
    pub state: String,
}

/// An entry of `GET /pulls/{number}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommit {
    /// Commit SHA.
    pub sha: String,
}

/// Response of `GET /commits/{sha}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCombinedStatus {
    /// Aggregate state: `success`, `pending` or `failure`.
    #[serde(default)]
    pub state: Option<String>,
}

/// Response of `GET /commits/{sha}/check-runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCheckRuns {
    /// Check runs attached to the commit.
    #[serde(default)]
    pub check_runs: Vec<RawCheckRun>,
}

/// A single check run.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCheckRun {
    /// Check name.
    pub name: String,

    /// Outcome, absent until the run completes.
    #[serde(default)]
    pub conclusion: Option<String>,

    /// Completion time, absent until the run completes.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}
