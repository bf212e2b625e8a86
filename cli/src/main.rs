//! CLI for the pull request compliance pipeline.
//!
//! Each subcommand runs one stage, so a scheduler can chain them by passing
//! the artifact path printed by one stage to the next. `run` chains all three.

use clap::{Args as ClapArgs, Parser, Subcommand};
use pr_compliance::config::{
    DEFAULT_API_URL, DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_DIR, DEFAULT_PAGE_SIZE,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_DELAY_SECS, DEFAULT_SCHEMA_PATH,
};
use pr_compliance::pipeline::{self, compliance_path, processed_path};
use pr_compliance::{
    default_run_id, ComplianceRules, ComplianceSummary, ConfigError, PipelineConfig,
    PipelineError, RetryPolicy,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Audit closed pull requests of a GitHub repository for review and CI compliance.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

/// Connection and tuning settings shared by every stage.
#[derive(ClapArgs, Debug)]
struct Settings {
    /// GitHub token used as a bearer credential.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Repository owner.
    #[arg(long, env = "GITHUB_REPO_OWNER")]
    owner: String,

    /// Repository name.
    #[arg(long = "repo", env = "GITHUB_REPO_NAME")]
    repository: String,

    /// API root.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Per-request timeout in seconds.
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    /// Attempts per API request.
    #[arg(long, env = "MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Base backoff delay in seconds, doubled after every failed attempt.
    #[arg(
        long,
        env = "RETRY_DELAY_SECS",
        default_value_t = DEFAULT_RETRY_DELAY_SECS
    )]
    retry_delay_secs: u64,

    /// Items requested per page (1-100).
    #[arg(long, env = "PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Pull requests enriched at the same time.
    #[arg(long, env = "ENRICH_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Approving reviews needed for the code review to pass.
    #[arg(long, env = "MIN_APPROVALS", default_value_t = 1)]
    min_approvals: u32,

    /// Directory receiving every artifact.
    #[arg(long, env = "OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// JSON Schema for the extract output.
    #[arg(long, env = "SCHEMA_PATH", default_value = DEFAULT_SCHEMA_PATH)]
    schema_path: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and enrich closed pull requests.
    Extract {
        /// Run identifier used in artifact names.
        #[arg(long)]
        run_id: Option<String>,
    },
    /// Validate the extract output and compute compliance.
    Transform {
        /// Run identifier used in artifact names.
        #[arg(long)]
        run_id: String,

        /// Extract output; defaults to the processed artifact of `run_id`.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Write the transform output to a parquet file.
    Load {
        /// Run identifier whose compliance artifact is loaded.
        #[arg(long, required_unless_present = "input")]
        run_id: Option<String>,

        /// Transform output; defaults to the compliance artifact of `run_id`.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Run extract, transform and load in order.
    Run {
        /// Run identifier used in artifact names.
        #[arg(long)]
        run_id: Option<String>,
    },
}

impl Settings {
    fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        let rules = ComplianceRules {
            min_approvals: self.min_approvals,
            ..ComplianceRules::default()
        };

        Ok(PipelineConfig::new(self.owner, self.repository, self.token)?
            .with_api_url(&self.api_url)?
            .with_page_size(self.page_size)?
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_retry(RetryPolicy::new(
                self.max_retries,
                Duration::from_secs(self.retry_delay_secs),
            ))
            .with_concurrency(self.concurrency)
            .with_output_dir(self.output_dir)
            .with_schema_path(self.schema_path)
            .with_rules(rules))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    let config = match args.settings.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    match execute(&config, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Stage failed");
            ExitCode::from(1)
        }
    }
}

/// Initializes tracing with a compact formatter filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn execute(config: &PipelineConfig, command: Command) -> Result<(), PipelineError> {
    match command {
        Command::Extract { run_id } => {
            let run_id = run_id.unwrap_or_else(default_run_id);
            let output = pipeline::extract(config, &run_id).await?;
            println!("Run: {run_id}");
            println!("  Pull requests: {}", output.count);
            println!("  Raw: {}", output.raw_path.display());
            println!("  Processed: {}", output.processed_path.display());
        }
        Command::Transform { run_id, input } => {
            let input = input.unwrap_or_else(|| processed_path(config, &run_id));
            let output = pipeline::transform(config, &run_id, &input)?;
            println!("Compliance: {}", output.compliance_path.display());
            print_summary(&output.summary);
        }
        Command::Load { run_id, input } => {
            let input = load_input(config, run_id.as_deref(), input)?;
            let output = pipeline::load(config, &input)?;
            println!(
                "Parquet: {} ({} rows)",
                output.parquet_path.display(),
                output.rows
            );
        }
        Command::Run { run_id } => {
            let run_id = run_id.unwrap_or_else(default_run_id);
            let report = pipeline::run(config, &run_id).await?;
            println!("Run: {}", report.run_id);
            println!("  Processed: {}", report.extract.processed_path.display());
            println!(
                "  Compliance: {}",
                report.transform.compliance_path.display()
            );
            println!(
                "  Parquet: {} ({} rows)",
                report.load.parquet_path.display(),
                report.load.rows
            );
            print_summary(&report.transform.summary);
        }
    }
    Ok(())
}

/// Resolves the load input: an explicit path wins over the run's compliance artifact.
fn load_input(
    config: &PipelineConfig,
    run_id: Option<&str>,
    input: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    match (input, run_id) {
        (Some(input), _) => Ok(input),
        (None, Some(run_id)) => Ok(compliance_path(config, run_id)),
        (None, None) => Err(ConfigError::MissingField { field: "run_id" }),
    }
}

fn print_summary(summary: &ComplianceSummary) {
    println!("\nSummary:");
    println!("  Pull requests: {}", summary.total_prs);
    println!("  Compliant: {}", summary.compliant_prs);
    println!("  Compliance rate: {:.1}%", summary.compliance_rate * 100.0);
}
