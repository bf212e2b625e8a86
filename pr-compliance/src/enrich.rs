//! Turns listing entries into enriched pull request records.

use crate::github::{CommitStatus, GitHubClient, GitHubError, RawCommit, RawPullRequest};
use crate::models::{CheckRunResult, PullRequestRecord, ReviewState};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, info_span, Instrument};

/// Picks the commit whose status is looked up: the last listed commit, else
/// the head SHA from the listing entry.
pub fn reference_sha<'a>(commits: &'a [RawCommit], raw: &'a RawPullRequest) -> Option<&'a str> {
    commits
        .last()
        .map(|commit| commit.sha.as_str())
        .or(raw.head.sha.as_deref())
        .filter(|sha| !sha.is_empty())
}

/// Fetches reviews, commits, combined status and check runs for one pull request.
///
/// Status lookups never fail the record; see [`GitHubClient::commit_status`].
///
/// # Errors
///
/// Returns [`GitHubError::Pagination`] if the review or commit listing fails.
pub async fn enrich(
    client: &GitHubClient,
    raw: &RawPullRequest,
) -> Result<PullRequestRecord, GitHubError> {
    let span = info_span!("enrich", pr_number = raw.number);

    async {
        debug!("Fetching reviews");
        let reviews: Vec<ReviewState> = client
            .list_reviews(raw.number)
            .await?
            .into_iter()
            .map(ReviewState::from)
            .collect();

        debug!("Fetching commits");
        let commits = client.list_commits(raw.number).await?;

        let status = match reference_sha(&commits, raw) {
            Some(sha) => {
                debug!(sha, "Fetching combined status and check runs");
                client.commit_status(sha).await
            }
            None => {
                debug!("No commit SHA available, skipping status lookup");
                CommitStatus::default()
            }
        };

        let check_runs = status
            .check_runs
            .into_iter()
            .map(CheckRunResult::from)
            .collect();

        let record = PullRequestRecord::new(
            raw,
            client.repository(),
            reviews,
            check_runs,
            status.state,
        );
        info!(
            approved_reviews = record.approved_reviews,
            check_runs = record.check_runs.len(),
            "Enriched pull request"
        );
        Ok(record)
    }
    .instrument(span)
    .await
}

/// Enriches every pull request, returning records in listing order.
///
/// Up to `concurrency` pull requests are in flight at once; `1` processes
/// them strictly one after another.
///
/// # Errors
///
/// Returns the first [`GitHubError`] raised by [`enrich`].
pub async fn enrich_all(
    client: &GitHubClient,
    pull_requests: &[RawPullRequest],
    concurrency: usize,
) -> Result<Vec<PullRequestRecord>, GitHubError> {
    info!(
        count = pull_requests.len(),
        concurrency,
        "Enriching pull requests"
    );

    stream::iter(pull_requests)
        .map(|raw| enrich(client, raw))
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}
