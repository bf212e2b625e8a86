//! GitHub REST API access.
//!
//! Layers, innermost first:
//! - [`Fetcher`] sends one authenticated GET and absorbs a rate limit reset.
//! - [`retry`](crate::retry::retry) re-invokes a failed fetch with backoff.
//! - [`GitHubClient::paginate`] walks numbered pages until a short page.
//! - [`GitHubClient`] exposes the repository endpoints the pipeline needs.

mod client;
mod error;
mod fetcher;
mod pagination;
mod payloads;
mod rate_limit;

pub use client::{CommitStatus, GitHubClient, CLOSED_STATE};
pub use error::{FetchError, GitHubError};
pub use fetcher::{Fetcher, GITHUB_MEDIA_TYPE};
pub use pagination::{is_last_page, page_params};
pub use payloads::{
    RawBranch, RawCheckRun, RawCheckRuns, RawCombinedStatus, RawCommit, RawPullRequest, RawReview,
    RawUser,
};
pub use rate_limit::{is_rate_limited, RateLimitGate, RateLimitInfo};
