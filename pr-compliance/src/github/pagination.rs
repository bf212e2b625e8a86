//! Page-number pagination over GitHub list endpoints.
//!
//! Every listing follows the same stop rule: the walk ends at the first page
//! that is empty or holds fewer than `per_page` items. A final page that is
//! exactly full therefore costs one extra request returning `[]`.

use super::client::GitHubClient;
use super::error::GitHubError;
use crate::retry::retry;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Builds the query for `page`, with the caller's parameters first.
///
/// Caller-supplied `page` or `per_page` entries are replaced.
pub fn page_params(params: &[(String, String)], page: u32, per_page: u32) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = params
        .iter()
        .filter(|(key, _)| key != "page" && key != "per_page")
        .cloned()
        .collect();
    merged.push(("page".to_string(), page.to_string()));
    merged.push(("per_page".to_string(), per_page.to_string()));
    merged
}

/// Returns true when a page of `len` items ends the walk.
pub fn is_last_page(len: usize, per_page: u32) -> bool {
    len == 0 || len < per_page as usize
}

impl GitHubClient {
    /// Fetches every page of `path` (relative to the repository URL) and
    /// concatenates the items in retrieval order.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Pagination`] for the first page that fails after
    /// retries. Items gathered from earlier pages are discarded.
    pub async fn paginate<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Vec<T>, GitHubError> {
        let url = self.endpoint(path);
        let per_page = self.page_size();
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let query = page_params(params, page, per_page);
            let label = format!("GET {path} page {page}");
            debug!(path, page, "Fetching page");

            let batch: Vec<T> = retry(self.retry_policy(), &label, || {
                self.fetcher().fetch_json(&url, &query)
            })
            .await
            .map_err(|source| GitHubError::Pagination {
                path: path.to_string(),
                page,
                source,
            })?;

            let fetched = batch.len();
            items.extend(batch);
            debug!(path, page, fetched, "Fetched page");

            if is_last_page(fetched, per_page) {
                break;
            }
            page += 1;
        }

        info!(
            path,
            pages = page,
            total = items.len(),
            "Pagination complete"
        );
        Ok(items)
    }
}
