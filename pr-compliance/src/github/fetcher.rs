//! Authenticated GET requests with rate limit absorption.

use super::error::{FetchError, GitHubError};
use super::rate_limit::{is_rate_limited, RateLimitGate, RateLimitInfo};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Media type of the stable GitHub REST API.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

const CLIENT_USER_AGENT: &str = concat!("pr-compliance/", env!("CARGO_PKG_VERSION"));

/// Issues authenticated GET requests against the GitHub API.
///
/// A `403` carrying `X-RateLimit-Remaining: 0` pauses every clone of the
/// fetcher until the advertised reset, after which the request is sent exactly
/// once more. Any other non-success status is returned as
/// [`FetchError::Http`] straight away.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    gate: Arc<RateLimitGate>,
}

impl Fetcher {
    /// Builds a fetcher that sends `token` as a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Client`] if the token is not a valid header value
    /// or the TLS backend cannot be initialised.
    pub fn new(token: &str, timeout: Duration) -> Result<Self, GitHubError> {
        let bearer = format!("Bearer {token}");
        let mut authorization = HeaderValue::from_str(&bearer).map_err(|_| GitHubError::Client {
            message: "token contains characters that are not valid in a header".to_string(),
        })?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GitHubError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            gate: Arc::new(RateLimitGate::new()),
        })
    }

    /// Returns the cool-down gate shared by this fetcher and its clones.
    pub fn gate(&self) -> &Arc<RateLimitGate> {
        &self.gate
    }

    /// Issues a GET and returns the body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] for a non-success status (after at most
    /// one rate limit wait) and [`FetchError::Network`] for transport failures.
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String, FetchError> {
        let mut response = self.send(url, params).await?;

        let info = RateLimitInfo::from_headers(response.headers());
        if is_rate_limited(response.status(), &info) {
            let wait = info.wait_duration(SystemTime::now());
            warn!(
                url,
                wait_secs = wait.as_secs(),
                reset = ?info.reset,
                "Rate limit exceeded, waiting for reset"
            );
            self.gate.cool_down(wait).await;
            response = self.send(url, params).await?;
        }

        let status = response.status();
        let body = response.text().await.map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        Ok(body)
    }

    /// Issues a GET and decodes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// As [`Fetcher::fetch`], plus [`FetchError::Decode`] when the body does not
    /// match `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<T, FetchError> {
        let body = self.fetch(url, params).await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn send(&self, url: &str, params: &[(String, String)]) -> Result<Response, FetchError> {
        self.gate.ready().await;
        debug!(url, ?params, "GET");

        self.client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })
    }
}
