//! The extract, transform and load stages.
//!
//! Each stage owns its output artifacts and returns their paths. A scheduler
//! (or [`run`]) forwards those paths to the next stage. A failing stage
//! returns an error and leaves no artifact for the next stage to pick up.

mod error;
mod output;

pub use error::PipelineError;
pub use output::{ExtractOutput, LoadOutput, RunReport, TransformOutput};

use crate::artifacts::{read_json, write_json, write_parquet};
use crate::compliance::{self, ComplianceRecord, TransformError};
use crate::config::PipelineConfig;
use crate::enrich::enrich_all;
use crate::github::{GitHubClient, GitHubError, RawPullRequest};
use crate::models::PullRequestRecord;
use crate::schema::{load_schema, validate_batch};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, Instrument};

/// Timestamp layout used in parquet file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Run identifier for runs not started by a scheduler.
pub fn default_run_id() -> String {
    format!("manual__{}", Utc::now().format(FILE_TIMESTAMP_FORMAT))
}

/// Path of the unmodified pull request listing.
pub fn raw_path(config: &PipelineConfig, run_id: &str) -> PathBuf {
    config
        .output_dir()
        .join(format!("raw_pull_requests_{run_id}.json"))
}

/// Path of the enriched batch.
pub fn processed_path(config: &PipelineConfig, run_id: &str) -> PathBuf {
    config
        .output_dir()
        .join(format!("processed_pull_requests_{run_id}.json"))
}

/// Path of the widened batch.
pub fn compliance_path(config: &PipelineConfig, run_id: &str) -> PathBuf {
    config
        .output_dir()
        .join(format!("compliance_{run_id}.json"))
}

/// Path of the summary.
pub fn summary_path(config: &PipelineConfig, run_id: &str) -> PathBuf {
    config.output_dir().join(format!("summary_{run_id}.json"))
}

/// Path of the parquet file for a load at `loaded_at`.
pub fn parquet_path(config: &PipelineConfig, loaded_at: DateTime<Utc>) -> PathBuf {
    config.output_dir().join(format!(
        "pull_requests_{}.parquet",
        loaded_at.format(FILE_TIMESTAMP_FORMAT)
    ))
}

/// Lists closed pull requests, enriches each one and writes the batch.
///
/// # Errors
///
/// Returns [`PipelineError::GitHub`] if a listing fails (per-commit status
/// failures are absorbed) and [`PipelineError::Artifact`] if writing fails.
/// The processed artifact is only written once every record is enriched.
pub async fn extract(
    config: &PipelineConfig,
    run_id: &str,
) -> Result<ExtractOutput, PipelineError> {
    let span = info_span!("extract", run_id, repo = %config.full_name());

    async {
        let client = GitHubClient::new(config)?;

        info!("Listing closed pull requests");
        let listing = client.list_pull_requests().await?;
        info!(count = listing.len(), "Found closed pull requests");

        let raw_path = raw_path(config, run_id);
        write_json(&raw_path, &listing)?;

        let pull_requests = listing
            .into_iter()
            .map(serde_json::from_value::<RawPullRequest>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| GitHubError::Payload { source })?;

        let concurrency = config.concurrency();
        let records = enrich_all(&client, &pull_requests, concurrency).await?;

        let processed_path = processed_path(config, run_id);
        write_json(&processed_path, &records)?;
        info!(path = %processed_path.display(), count = records.len(), "Extract complete");

        Ok(ExtractOutput {
            raw_path,
            processed_path,
            count: records.len(),
        })
    }
    .instrument(span)
    .await
}

/// Validates the extract output and computes compliance.
///
/// # Errors
///
/// Returns [`PipelineError::Transform`] if the schema is missing, the batch
/// violates it or it cannot be decoded, and [`PipelineError::Artifact`] for
/// read/write failures. Invalid data is never passed on.
pub fn transform(
    config: &PipelineConfig,
    run_id: &str,
    processed_path: &Path,
) -> Result<TransformOutput, PipelineError> {
    let _span = info_span!("transform", run_id).entered();

    let schema_path = config.schema_path();
    let schema = load_schema(schema_path).map_err(TransformError::from)?;
    let data: Value = read_json(processed_path)?;
    validate_batch(&data, &schema).map_err(TransformError::from)?;

    let batch: Vec<PullRequestRecord> = serde_json::from_value(data)
        .map_err(|source| TransformError::Decode { source })?;
    let (records, summary) = compliance::transform(batch, config.rules());

    let compliance_path = compliance_path(config, run_id);
    write_json(&compliance_path, &records)?;
    let summary_path = summary_path(config, run_id);
    write_json(&summary_path, &summary)?;

    info!(path = %compliance_path.display(), "Transform complete");
    Ok(TransformOutput {
        compliance_path,
        summary_path,
        summary,
    })
}

/// Writes the widened batch to a timestamped parquet file.
///
/// # Errors
///
/// Returns [`PipelineError::Artifact`] if the input cannot be read or the
/// parquet file cannot be written.
pub fn load(config: &PipelineConfig, compliance_path: &Path) -> Result<LoadOutput, PipelineError> {
    load_at(config, compliance_path, Utc::now())
}

/// [`load`] with an explicit load time.
///
/// # Errors
///
/// As [`load`].
pub fn load_at(
    config: &PipelineConfig,
    compliance_path: &Path,
    loaded_at: DateTime<Utc>,
) -> Result<LoadOutput, PipelineError> {
    let _span = info_span!("load").entered();

    let records: Vec<ComplianceRecord> = read_json(compliance_path)?;
    let parquet_path = parquet_path(config, loaded_at);
    write_parquet(&parquet_path, &records, loaded_at)?;

    info!(path = %parquet_path.display(), rows = records.len(), "Load complete");
    Ok(LoadOutput {
        parquet_path,
        rows: records.len(),
    })
}

/// Runs extract, transform and load in order, forwarding artifact paths.
///
/// # Errors
///
/// Returns the first stage error; later stages do not run.
pub async fn run(config: &PipelineConfig, run_id: &str) -> Result<RunReport, PipelineError> {
    let extract = extract(config, run_id).await?;
    let transform = transform(config, run_id, &extract.processed_path)?;
    let load = load(config, &transform.compliance_path)?;

    Ok(RunReport {
        run_id: run_id.to_string(),
        extract,
        transform,
        load,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> PipelineConfig {
        PipelineConfig::new("octo", "widgets", "secret")
            .unwrap()
            .with_output_dir(PathBuf::from("out"))
    }

    #[test]
    fn names_artifacts_after_run() {
        let config = config();
        assert_eq!(
            processed_path(&config, "scheduled__1"),
            Path::new("out/processed_pull_requests_scheduled__1.json")
        );
        assert_eq!(
            summary_path(&config, "scheduled__1"),
            Path::new("out/summary_scheduled__1.json")
        );
    }

    #[test]
    fn parquet_name_carries_utc_timestamp() {
        let loaded_at = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(
            parquet_path(&config(), loaded_at),
            Path::new("out/pull_requests_20250203T040506Z.parquet")
        );
    }

    #[test]
    fn default_run_id_is_manual() {
        let run_id = default_run_id();
        assert!(run_id.starts_with("manual__"));
        assert!(run_id.ends_with('Z'));
    }
}
