//! Repository-scoped GitHub client.

use super::error::GitHubError;
use super::fetcher::Fetcher;
use super::payloads::{RawCheckRun, RawCheckRuns, RawCombinedStatus, RawCommit, RawReview};
use crate::config::PipelineConfig;
use crate::retry::{retry, RetryPolicy};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Pull request state requested from the listing endpoint.
pub const CLOSED_STATE: &str = "closed";

/// Combined status and check runs of one commit.
#[derive(Debug, Clone, Default)]
pub struct CommitStatus {
    /// Combined status state, `None` when unavailable.
    pub state: Option<String>,

    /// Check runs reported for the commit.
    pub check_runs: Vec<RawCheckRun>,
}

/// GitHub client bound to one repository.
///
/// Every request goes through the retry policy, and every retried attempt goes
/// through the rate-limit-aware [`Fetcher`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    fetcher: Fetcher,
    retry: RetryPolicy,
    repository_url: String,
    repository: String,
    page_size: u32,
}

impl GitHubClient {
    /// Creates a client from the pipeline configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &PipelineConfig) -> Result<Self, GitHubError> {
        let fetcher = Fetcher::new(config.token(), config.request_timeout())?;
        Ok(Self::from_parts(
            fetcher,
            config.retry(),
            config.repository_url(),
            config.repository().to_string(),
            config.page_size(),
        ))
    }

    /// Assembles a client from already-built parts.
    pub fn from_parts(
        fetcher: Fetcher,
        retry: RetryPolicy,
        repository_url: String,
        repository: String,
        page_size: u32,
    ) -> Self {
        Self {
            fetcher,
            retry,
            repository_url: repository_url.trim_end_matches('/').to_string(),
            repository,
            page_size: page_size.max(1),
        }
    }

    /// Returns the repository name recorded on every pull request.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Returns the configured page size.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub(crate) fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub(crate) fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Resolves `path` (e.g. `/pulls`) against the repository URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.repository_url, path)
    }

    /// Fetches a single, non-paginated resource.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Request`] once every retry has failed.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        let url = self.endpoint(path);
        let label = format!("GET {path}");
        let value = retry(&self.retry, &label, || self.fetcher.fetch_json(&url, &[]))
            .await?;
        Ok(value)
    }

    /// Lists every closed pull request as raw JSON, in API order.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Pagination`] if any page fails.
    pub async fn list_pull_requests(&self) -> Result<Vec<Value>, GitHubError> {
        let params = [("state".to_string(), CLOSED_STATE.to_string())];
        self.paginate("/pulls", &params).await
    }

    /// Lists every review of a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Pagination`] if any page fails.
    pub async fn list_reviews(&self, number: u64) -> Result<Vec<RawReview>, GitHubError> {
        self.paginate(&format!("/pulls/{number}/reviews"), &[]).await
    }

    /// Lists every commit of a pull request, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Pagination`] if any page fails.
    pub async fn list_commits(&self, number: u64) -> Result<Vec<RawCommit>, GitHubError> {
        self.paginate(&format!("/pulls/{number}/commits"), &[]).await
    }

    /// Fetches the combined status and check runs of `sha`.
    ///
    /// Never fails. Any error is logged and yields an empty [`CommitStatus`],
    /// so one broken lookup only affects its own pull request.
    pub async fn commit_status(&self, sha: &str) -> CommitStatus {
        match self.try_commit_status(sha).await {
            Ok(status) => status,
            Err(e) => {
                warn!(sha, error = %e, "Failed to fetch status for commit");
                CommitStatus::default()
            }
        }
    }

    async fn try_commit_status(&self, sha: &str) -> Result<CommitStatus, GitHubError> {
        let combined: RawCombinedStatus = self.get(&format!("/commits/{sha}/status")).await?;
        let runs: RawCheckRuns = self.get(&format!("/commits/{sha}/check-runs")).await?;

        Ok(CommitStatus {
            state: combined.state,
            check_runs: runs.check_runs,
        })
    }
}
