#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod artifacts;
pub mod compliance;
pub mod config;
pub mod enrich;
pub mod github;
pub mod models;
pub mod pipeline;
pub mod retry;
pub mod schema;

pub use artifacts::{read_json, write_json, write_parquet, ArtifactError};
pub use compliance::{
    transform, ComplianceRecord, ComplianceRules, ComplianceSummary, TransformError,
};
pub use config::{ConfigError, PipelineConfig};
pub use enrich::{enrich, enrich_all};
pub use github::{FetchError, Fetcher, GitHubClient, GitHubError, RateLimitInfo};
pub use models::{CheckRunResult, PullRequestRecord, ReviewState};
pub use pipeline::{
    default_run_id, ExtractOutput, LoadOutput, PipelineError, RunReport, TransformOutput,
};
pub use retry::{retry, RetryError, RetryPolicy};
pub use schema::{load_schema, validate_batch, SchemaError, SchemaViolation};
