#![allow(dead_code)]

use pr_compliance::{PipelineConfig, RetryPolicy};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "octo";
pub const REPO: &str = "widgets";

pub fn repo_path(suffix: &str) -> String {
    format!("/repos/{OWNER}/{REPO}{suffix}")
}

pub fn schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../schema/pull-requests.schema.json")
}

/// Configuration pointed at `server`, with millisecond retry delays.
pub fn config(server: &MockServer, output_dir: &Path) -> PipelineConfig {
    PipelineConfig::new(OWNER, REPO, "test-token")
        .unwrap()
        .with_api_url(&server.uri())
        .unwrap()
        .with_retry(RetryPolicy::new(3, Duration::from_millis(10)))
        .with_request_timeout(Duration::from_secs(5))
        .with_output_dir(output_dir.to_path_buf())
        .with_schema_path(schema_path())
}

pub fn pull_request(number: u64, head_sha: &str) -> Value {
    json!({
        "number": number,
        "title": format!("Change #{number}"),
        "state": "closed",
        "user": { "login": format!("dev{number}"), "id": 1000 + number },
        "created_at": "2025-01-01T09:00:00Z",
        "merged_at": "2025-01-02T09:00:00Z",
        "closed_at": "2025-01-02T09:00:00Z",
        "base": { "ref": "main", "sha": "base000" },
        "head": { "ref": format!("topic-{number}"), "sha": head_sha }
    })
}

pub async fn mount_pull_requests(server: &MockServer, pulls: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(repo_path("/pulls")))
        .and(query_param("state", "closed"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(pulls)))
        .mount(server)
        .await;
}

pub async fn mount_reviews(server: &MockServer, number: u64, states: &[&str]) {
    let reviews: Vec<Value> = states.iter().map(|state| json!({ "state": state })).collect();
    Mock::given(method("GET"))
        .and(path(repo_path(&format!("/pulls/{number}/reviews"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviews))
        .mount(server)
        .await;
}

pub async fn mount_commits(server: &MockServer, number: u64, shas: &[&str]) {
    let commits: Vec<Value> = shas.iter().map(|sha| json!({ "sha": sha })).collect();
    Mock::given(method("GET"))
        .and(path(repo_path(&format!("/pulls/{number}/commits"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(commits))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, sha: &str, state: &str, conclusions: &[&str]) {
    Mock::given(method("GET"))
        .and(path(repo_path(&format!("/commits/{sha}/status"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": state })))
        .mount(server)
        .await;

    let runs: Vec<Value> = conclusions
        .iter()
        .enumerate()
        .map(|(i, conclusion)| {
            json!({
                "name": format!("check-{i}"),
                "status": "completed",
                "conclusion": conclusion,
                "completed_at": "2025-01-02T08:00:00Z"
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path(repo_path(&format!("/commits/{sha}/check-runs"))))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "total_count": runs.len(), "check_runs": runs })),
        )
        .mount(server)
        .await;
}

/// Mounts everything needed to enrich one pull request.
pub async fn mount_enrichment(
    server: &MockServer,
    number: u64,
    reviews: &[&str],
    commits: &[&str],
    status_sha: &str,
    conclusions: &[&str],
) {
    mount_reviews(server, number, reviews).await;
    mount_commits(server, number, commits).await;
    mount_status(server, status_sha, "success", conclusions).await;
}
