mod common;

use common::{config, mount_commits, mount_status, pull_request, repo_path};
use pr_compliance::github::RawPullRequest;
use pr_compliance::{enrich_all, GitHubClient};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn concurrent_enrichment_keeps_listing_order() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let config = config(&server, temp.path()).with_concurrency(4);
    let client = GitHubClient::new(&config).unwrap();

    let mut pull_requests = Vec::new();
    for number in 1..=6u64 {
        let sha = format!("sha{number}");
        // Earlier pull requests answer slower, so they finish last.
        Mock::given(method("GET"))
            .and(path(repo_path(&format!("/pulls/{number}/reviews"))))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "state": "APPROVED" }]))
                    .set_delay(Duration::from_millis((7 - number) * 60)),
            )
            .mount(&server)
            .await;
        mount_commits(&server, number, &[sha.as_str()]).await;
        mount_status(&server, &sha, "success", &["success"]).await;

        let raw: RawPullRequest = serde_json::from_value(pull_request(number, &sha)).unwrap();
        pull_requests.push(raw);
    }

    let records = enrich_all(&client, &pull_requests, config.concurrency())
        .await
        .unwrap();

    let numbers: Vec<u64> = records.iter().map(|record| record.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    assert!(records.iter().all(|record| record.approved_reviews == 1));
}

#[tokio::test]
async fn failed_enrichment_fails_the_batch() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let config = config(&server, temp.path()).with_concurrency(2);
    let client = GitHubClient::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path(repo_path("/pulls/1/reviews")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let raw: RawPullRequest = serde_json::from_value(pull_request(1, "sha1")).unwrap();

    assert!(enrich_all(&client, &[raw], 2).await.is_err());
}
