mod common;

use common::{
    config, mount_enrichment, mount_pull_requests, mount_reviews, pull_request, repo_path,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pr_compliance::pipeline::{self, processed_path};
use pr_compliance::{
    read_json, write_json, ComplianceRecord, ComplianceSummary, PipelineError, PullRequestRecord,
    SchemaError, TransformError,
};
use serde_json::{json, Value};
use std::fs::File;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn run_produces_summary_and_parquet() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let config = config(&server, temp.path());

    mount_pull_requests(
        &server,
        vec![pull_request(1, "head1"), pull_request(2, "head2")],
    )
    .await;
    mount_enrichment(
        &server,
        1,
        &["APPROVED"],
        &["c1a", "c1b"],
        "c1b",
        &["success", "success"],
    )
    .await;
    mount_enrichment(&server, 2, &["COMMENTED"], &["c2"], "c2", &["success"]).await;

    let report = pipeline::run(&config, "scheduled__test").await.unwrap();

    assert_eq!(report.extract.count, 2);
    assert_eq!(report.transform.summary, ComplianceSummary::new(2, 1));
    assert_eq!(report.transform.summary.compliance_rate, 0.5);

    let summary: Value = read_json(&report.transform.summary_path).unwrap();
    assert_eq!(
        summary,
        json!({ "total_prs": 2, "compliant_prs": 1, "compliance_rate": 0.5 })
    );

    let records: Vec<ComplianceRecord> = read_json(&report.transform.compliance_path).unwrap();
    assert_eq!(records[0].pr_number, 1);
    assert!(records[0].is_compliant);
    assert_eq!(records[0].check_runs.len(), 2);
    assert_eq!(records[0].combined_status.as_deref(), Some("success"));
    assert!(!records[1].is_compliant);

    assert_eq!(report.load.rows, 2);
    let file = File::open(&report.load.parquet_path).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let rows: usize = reader.map(|batch| batch.unwrap().num_rows()).sum();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn status_failure_is_isolated_to_its_pull_request() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let config = config(&server, temp.path());

    mount_pull_requests(&server, vec![pull_request(6, "h6"), pull_request(7, "h7")]).await;
    mount_enrichment(&server, 6, &["APPROVED"], &["c6"], "c6", &["success"]).await;
    mount_reviews(&server, 7, &["APPROVED"]).await;
    common::mount_commits(&server, 7, &["c7"]).await;
    Mock::given(method("GET"))
        .and(path(repo_path("/commits/c7/status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "failure" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(repo_path("/commits/c7/check-runs")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let output = pipeline::extract(&config, "iso").await.unwrap();
    assert_eq!(output.count, 2);

    let records: Vec<PullRequestRecord> = read_json(&output.processed_path).unwrap();
    assert_eq!(records[0].number, 6);
    assert_eq!(records[0].check_runs.len(), 1);
    assert_eq!(records[1].number, 7);
    assert!(records[1].check_runs.is_empty());
    assert_eq!(records[1].combined_status, None);
    assert_eq!(records[1].approved_reviews, 1);
}

#[tokio::test]
async fn failed_extract_leaves_no_processed_artifact() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let config = config(&server, temp.path());

    mount_pull_requests(&server, vec![pull_request(3, "h3")]).await;
    Mock::given(method("GET"))
        .and(path(repo_path("/pulls/3/reviews")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = pipeline::extract(&config, "broken").await.unwrap_err();

    assert!(
        matches!(err, PipelineError::GitHub(_)),
        "unexpected error: {err}"
    );
    assert!(!processed_path(&config, "broken").exists());
}

#[tokio::test]
async fn empty_listing_flows_through_every_stage() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let config = config(&server, temp.path());

    mount_pull_requests(&server, Vec::new()).await;

    let report = pipeline::run(&config, "empty").await.unwrap();

    assert_eq!(report.extract.count, 0);
    assert_eq!(report.transform.summary, ComplianceSummary::default());
    assert_eq!(report.load.rows, 0);
}

#[test]
fn transform_rejects_batch_violating_schema() {
    let temp = TempDir::new().unwrap();
    let config = pr_compliance::PipelineConfig::new("octo", "widgets", "token")
        .unwrap()
        .with_output_dir(temp.path().to_path_buf())
        .with_schema_path(common::schema_path());

    let input = temp.path().join("processed.json");
    write_json(
        &input,
        &json!([{
            "title": "No number",
            "user_login": "dev",
            "user_id": 1,
            "repository": "widgets",
            "created_at": null,
            "merged_at": null,
            "closed_at": null,
            "base_branch": "main",
            "head_branch": "topic",
            "reviews": [],
            "approved_reviews": 0,
            "check_runs": []
        }]),
    )
    .unwrap();

    let err = pipeline::transform(&config, "bad", &input).unwrap_err();

    match err {
        PipelineError::Transform(TransformError::Schema(SchemaError::Violation { violations })) => {
            assert_eq!(violations.len(), 1);
            assert!(violations[0].message.contains("number"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!pipeline::compliance_path(&config, "bad").exists());
    assert!(!pipeline::summary_path(&config, "bad").exists());
}

#[test]
fn transform_requires_the_schema_file() {
    let temp = TempDir::new().unwrap();
    let config = pr_compliance::PipelineConfig::new("octo", "widgets", "token")
        .unwrap()
        .with_output_dir(temp.path().to_path_buf())
        .with_schema_path(temp.path().join("missing.schema.json"));

    let input = temp.path().join("processed.json");
    write_json(&input, &json!([])).unwrap();

    let err = pipeline::transform(&config, "noschema", &input).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Transform(TransformError::Schema(SchemaError::Unavailable { .. }))
    ));
}
