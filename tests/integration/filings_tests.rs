//! Integration tests for the filing fetcher
//!
//! A wiremock server stands in for the submissions and compensation APIs.

use job_harvest::config::{parse_config, CompanyEntry};
use job_harvest::filings::{Endpoint, FilingClient, FilingError};
use job_harvest::page::HttpPageSource;
use job_harvest::pipeline::{run_filings, run_harvest, RunOptions};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPENSATION: &str = r#"[
    {"name": "Timothy D. Cook", "position": "CEO", "year": 2022, "salary": 3000000,
     "bonus": 0, "stockAwards": 82994164, "total": 99420097},
    {"name": "Luca Maestri", "position": "Senior Vice President, CFO", "year": 2022,
     "salary": 1000000, "bonus": 0, "stockAwards": 21657687, "total": 27151798}
]"#;

fn client(server: &MockServer, token: Option<&str>) -> FilingClient {
    FilingClient::new(
        reqwest::Client::new(),
        format!("{}/submissions/CIK{{cik10}}.json", server.uri()),
        format!("{}/compensation/{{cik}}?token={{token}}", server.uri()),
        token.map(str::to_string),
    )
}

fn company(name: &str, cik: u64) -> CompanyEntry {
    CompanyEntry {
        name: name.to_string(),
        cik,
    }
}

#[tokio::test]
async fn test_compensation_table() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compensation/320193"))
        .and(query_param("token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPENSATION))
        .expect(1)
        .mount(&server)
        .await;

    let table = client(&server, Some("test-token"))
        .fetch_compensation(320193)
        .await
        .expect("Compensation fetch should succeed");

    assert_eq!(table.len(), 2);
    assert_eq!(
        table.columns,
        vec!["name", "position", "year", "salary", "bonus", "stockAwards", "total"]
    );
    assert_eq!(table.rows[1][1], "Senior Vice President, CFO");
}

#[tokio::test]
async fn test_unknown_cik_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compensation/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/compensation/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/compensation/3"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client(&server, Some("test-token"));
    for cik in [1, 2, 3] {
        let error = client.fetch_compensation(cik).await.unwrap_err();
        assert!(
            matches!(error, FilingError::NotFound { cik: c } if c == cik),
            "CIK {} gave {:?}",
            cik,
            error
        );
    }
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compensation/320193"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token"))
        .mount(&server)
        .await;

    let error = client(&server, Some("wrong"))
        .fetch_compensation(320193)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        FilingError::Unauthorized {
            cik: 320193,
            status: 401
        }
    ));
}

#[tokio::test]
async fn test_unexpected_shape_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compensation/320193"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#""rate limited""#))
        .mount(&server)
        .await;

    let error = client(&server, Some("t"))
        .fetch_compensation(320193)
        .await
        .unwrap_err();
    assert!(matches!(error, FilingError::MalformedShape { cik: 320193, .. }));
}

#[tokio::test]
async fn test_submission_is_raw_text() {
    let server = MockServer::start().await;
    let body = r#"{"cik":"320193","name":"Apple Inc.","filings":{"recent":{"form":["10-K"]}}}"#;

    Mock::given(method("GET"))
        .and(path("/submissions/CIK0000320193.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let text = client(&server, None).fetch_submission(320193).await.unwrap();
    assert_eq!(text, body);
}

#[tokio::test]
async fn test_run_filings_writes_files_and_continues_past_failures() {
    let server = MockServer::start().await;
    let submission = r#"{"cik":"320193","name":"Apple Inc."}"#;

    Mock::given(method("GET"))
        .and(path("/submissions/CIK0000320193.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(submission))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/compensation/320193"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPENSATION))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/submissions/CIK0000000042.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/compensation/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let companies = vec![company("Initech  Corp", 42), company("Apple Inc", 320193)];
    let report = run_filings(
        &client(&server, Some("t")),
        &companies,
        &[Endpoint::Submissions, Endpoint::Compensation],
        dir.path(),
    )
    .await;

    assert_eq!(report.written.len(), 2);
    assert_eq!(report.not_found, vec!["Initech  Corp (compensation)"]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].starts_with("Initech  Corp (submissions)"));

    let saved = std::fs::read_to_string(dir.path().join("apple_inc_submissions.json")).unwrap();
    assert_eq!(saved, submission);

    let csv = std::fs::read_to_string(dir.path().join("apple_inc.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "name,position,year,salary,bonus,stockAwards,total");
    assert_eq!(
        lines[2],
        "Luca Maestri,\"Senior Vice President, CFO\",2022,1000000,0,21657687,27151798"
    );

    assert!(!dir.path().join("initech_corp.csv").exists());
}

#[tokio::test]
async fn test_harvest_reads_token_from_environment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/compensation/320193"))
        .and(query_param("token", "from-env"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPENSATION))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let content = format!(
        r#"
[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
directory = "{}"

[filings]
token-env = "JOB_HARVEST_TEST_TOKEN"
compensation-url = "{}/compensation/{{cik}}?token={{token}}"
endpoints = ["compensation"]

[[filings.company]]
name = "Apple Inc"
cik = 320193
"#,
        dir.path().display(),
        server.uri()
    );
    let config = parse_config(&content).expect("Test config should be valid");

    std::env::set_var("JOB_HARVEST_TEST_TOKEN", "from-env");

    let options = RunOptions {
        jobs: false,
        ..RunOptions::default()
    };
    let pages = Arc::new(HttpPageSource::from_config(&config.user_agent).unwrap());
    let summary = run_harvest(&config, "hash", pages, &options).await.unwrap();

    let filings = summary.filings.expect("Filings should have run");
    assert_eq!(filings.written, vec![dir.path().join("apple_inc.csv")]);
    assert!(summary.sources.is_empty());
}

#[tokio::test]
async fn test_missing_token_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        r#"
[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
directory = "{}"

[filings]
token-env = "JOB_HARVEST_TEST_TOKEN_UNSET"

[[filings.company]]
name = "Apple Inc"
cik = 320193
"#,
        dir.path().display()
    );
    let config = parse_config(&content).unwrap();

    let options = RunOptions {
        jobs: false,
        ..RunOptions::default()
    };
    let pages = Arc::new(HttpPageSource::from_config(&config.user_agent).unwrap());
    let result = run_harvest(&config, "hash", pages, &options).await;

    assert!(matches!(
        result,
        Err(job_harvest::HarvestError::Config(
            job_harvest::ConfigError::MissingToken { .. }
        ))
    ));
}
