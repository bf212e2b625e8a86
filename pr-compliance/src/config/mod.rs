//! Pipeline configuration.
//!
//! Configuration is always passed in explicitly. The library never reads the
//! process environment itself; the CLI is responsible for mapping environment
//! variables and flags onto a [`PipelineConfig`].

mod error;

pub use error::ConfigError;

use crate::compliance::ComplianceRules;
use crate::retry::RetryPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts made by the retry wrapper.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay of the retry wrapper in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// GitHub refuses `per_page` values above this.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default directory for stage artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default location of the extract-output JSON Schema.
pub const DEFAULT_SCHEMA_PATH: &str = "schema/pull-requests.schema.json";

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Repository owner (user or organization).
    owner: String,
    /// Repository name.
    repository: String,
    /// Bearer token attached to every API request.
    token: String,
    /// API root, e.g. `https://api.github.com`.
    api_url: Url,
    /// Per-request timeout.
    request_timeout: Duration,
    /// Backoff policy applied around every API request.
    retry: RetryPolicy,
    /// Items requested per page.
    page_size: u32,
    /// Maximum pull requests enriched at the same time.
    concurrency: usize,
    /// Directory receiving every artifact.
    output_dir: PathBuf,
    /// JSON Schema for the extract output.
    schema_path: PathBuf,
    /// Compliance thresholds.
    rules: ComplianceRules,
}

impl PipelineConfig {
    /// Creates a configuration with default tuning for the given repository.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] if `token` is blank and
    /// [`ConfigError::MissingField`] if the owner or repository is blank.
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let owner = owner.into();
        let repository = repository.into();
        let token = token.into();

        if token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if owner.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "owner" });
        }
        if repository.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "repository",
            });
        }

        let api_url = parse_api_url(DEFAULT_API_URL)?;
        Ok(Self {
            owner,
            repository,
            token,
            api_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry: RetryPolicy::new(
                DEFAULT_MAX_RETRIES,
                Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            ),
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: 1,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
            rules: ComplianceRules::default(),
        })
    }

    /// Points the client at a different API root (GitHub Enterprise, test servers).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `api_url` is not an absolute HTTP(S) URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(api_url)?;
        Ok(self)
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the retry policy used around API requests.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the page size for list endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] unless `1 <= page_size <= 100`.
    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, ConfigError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid {
                field: "page_size",
                message: format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
            });
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Sets how many pull requests may be enriched at once. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the artifact directory.
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    /// Sets the JSON Schema location.
    pub fn with_schema_path(mut self, schema_path: PathBuf) -> Self {
        self.schema_path = schema_path;
        self
    }

    /// Sets the compliance thresholds.
    pub fn with_rules(mut self, rules: ComplianceRules) -> Self {
        self.rules = rules;
        self
    }

    /// Returns the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Returns `owner/repository`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the API root.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Returns the base URL of the repository endpoints, without a trailing slash.
    pub fn repository_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            self.owner,
            self.repository
        )
    }

    /// Returns the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the retry policy.
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns the page size.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the enrichment concurrency.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the artifact directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the JSON Schema location.
    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    /// Returns the compliance thresholds.
    pub fn rules(&self) -> &ComplianceRules {
        &self.rules
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        field: "api_url",
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            field: "api_url",
            message: format!("unsupported scheme '{other}'"),
        }),
    }
}
