//! Integration tests for the job pipeline
//!
//! These tests use wiremock to serve results and posting pages and run the
//! full listing -> detail -> document cycle end-to-end.

use job_harvest::config::{hash_config_content, parse_config, Config};
use job_harvest::output::{checkpoint_path, read_job_document, RecordAggregator};
use job_harvest::page::{HttpPageSource, PageRequest, PageSource, WaitPolicy};
use job_harvest::pipeline::{run_harvest, RunOptions};
use job_harvest::{HarvestError, JobRecord};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a one-source configuration pointed at the mock server
fn source_config(dir: &Path, name: &str, site: &str, search_url: &str, extra: &str) -> String {
    format!(
        r#"
[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
directory = "{}"

[[source]]
name = "{}"
site = "{}"
search-url = "{}"
keyword = "Data Scientist"
max-wait-ms = 500
poll-interval-ms = 50
delay-between-pages-ms = 0
{}
"#,
        dir.display(),
        name,
        site,
        search_url,
        extra
    )
}

fn load(content: &str) -> (Config, String) {
    let config = parse_config(content).expect("Test config should be valid");
    (config, hash_config_content(content))
}

fn pages(config: &Config) -> Arc<HttpPageSource> {
    Arc::new(HttpPageSource::from_config(&config.user_agent).expect("Failed to build client"))
}

fn jobs_only() -> RunOptions {
    RunOptions {
        filings: false,
        ..RunOptions::default()
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn linkedin_results(base_url: &str) -> String {
    format!(
        r#"<html><body><ul class="jobs-search__results-list">
        <li><div class="base-card"><a href="{0}/jobs/view/1"></a><h3>Data Scientist</h3></div></li>
        <li><div class="base-card"><a href="{0}/jobs/view/2"></a><h3>Marketing Manager</h3></div></li>
        <li><div class="base-card"><a href="{0}/jobs/view/3"></a><h3>Lead Data Scientist</h3></div></li>
        </ul></body></html>"#,
        base_url
    )
}

fn linkedin_posting(title: &str, location: &str) -> String {
    format!(
        r#"<html><body>
        <h2 class="top-card-layout__title">{}</h2>
        <span class="topcard__flavor">Acme Corp</span>
        <span class="topcard__flavor topcard__flavor--bullet">{}</span>
        <div class="description__text description__text--rich">
          <p>We are hiring.</p><ul><li>Python</li><li>Statistics</li></ul>
        </div>
        <ul>
          <li class="description__job-criteria-item">
            <h3 class="description__job-criteria-subheader">Employment type</h3>
            <span class="description__job-criteria-text">Full-time</span>
          </li>
        </ul>
        </body></html>"#,
        title, location
    )
}

async fn mount_linkedin(server: &MockServer) {
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/jobs/search"))
        .respond_with(html(linkedin_results(&base_url)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/view/1"))
        .respond_with(html(linkedin_posting("Data Scientist", "München, Germany")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/view/3"))
        .respond_with(html(linkedin_posting("Lead Data Scientist", "Remote")))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_linkedin_end_to_end() {
    let server = MockServer::start().await;
    mount_linkedin(&server).await;

    // The non-matching posting must never be requested
    Mock::given(method("GET"))
        .and(path("/jobs/view/2"))
        .respond_with(html(linkedin_posting("Marketing Manager", "Paris")))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let search_url = format!("{}/jobs/search", server.uri());
    let (config, hash) = load(&source_config(
        dir.path(),
        "LinkedIn",
        "linkedin",
        &search_url,
        "max-concurrent-pages = 2",
    ));

    let summary = run_harvest(&config, &hash, pages(&config), &jobs_only())
        .await
        .expect("Harvest should succeed");

    assert_eq!(summary.total_records(), 2);
    assert_eq!(summary.total_failures(), 0);

    let document = dir.path().join("LinkedIn_job_description_data.json");
    let records = read_job_document(&document).unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].link, format!("{}/jobs/view/1", server.uri()));
    assert_eq!(records[0].title.as_deref(), Some("Data Scientist"));
    assert_eq!(records[0].company.as_deref(), Some("Acme Corp"));
    assert_eq!(records[0].location.as_deref(), Some("München, Germany"));
    assert_eq!(records[0].employment_type(), Some("Full-time"));
    assert_eq!(records[0].paragraphs, vec!["We are hiring."]);
    assert_eq!(records[0].bullets, vec!["Python", "Statistics"]);
    assert_eq!(records[1].link, format!("{}/jobs/view/3", server.uri()));

    let text = std::fs::read_to_string(&document).unwrap();
    assert!(text.contains("München"));
    assert!(text.contains("\n        \"job_description\": \"Data Scientist\""));
    assert!(!text.contains("\"salary\""));

    assert!(!checkpoint_path(dir.path(), "LinkedIn").exists());
}

#[tokio::test]
async fn test_indeed_pagination_and_null_salary() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/q-data-scientist-jobs.html"))
        .respond_with(html(format!(
            r#"<html><body><div class="jobsearch-LeftPane">
            <div class="job_seen_beacon">
              <h2><a href="/viewjob?jk=111"><span>Data Scientist</span></a></h2>
              <span class="companyName">Acme Corp</span>
              <div class="companyLocation">Remote</div>
              <div class="metadataContainer salaryOnly">
                <div class="metadata salary-snippet-container">$120,000 a year</div>
                <div class="metadata">Contract</div>
              </div>
            </div>
            </div>
            <a data-testid="pagination-page-2" href="{}/jobs?q=data&amp;start=10">2</a>
            </body></html>"#,
            base_url
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("start", "10"))
        .respond_with(html(
            r#"<html><body><div class="jobsearch-LeftPane">
            <div class="job_seen_beacon">
              <h2><a href="/viewjob?jk=222"><span>Junior Data Scientist</span></a></h2>
              <span class="companyName">Initech</span>
              <div class="companyLocation">Austin, TX</div>
            </div>
            </div></body></html>"#
                .to_string(),
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/viewjob"))
        .and(query_param("jk", "111"))
        .respond_with(html(
            r#"<html><body><div id="jobDescriptionText"><p>Contract role.</p></div></body></html>"#
                .to_string(),
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/viewjob"))
        .and(query_param("jk", "222"))
        .respond_with(html(
            r#"<html><body>
            <div class="jobsearch-JobDescriptionSection-sectionItem"><div>Job type</div><div>Part-time</div></div>
            <div id="jobDescriptionText"><p>Entry level.</p><ul><li>SQL</li></ul></div>
            </body></html>"#
                .to_string(),
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let search_url = format!("{}/q-data-scientist-jobs.html", base_url);
    let (config, hash) = load(&source_config(
        dir.path(),
        "Indeed",
        "indeed",
        &search_url,
        "max-pages = 3",
    ));

    let summary = run_harvest(&config, &hash, pages(&config), &jobs_only())
        .await
        .expect("Harvest should succeed");
    assert_eq!(summary.sources[0].listed, 2);

    let document = dir.path().join("Indeed_job_description_data.json");
    let records = read_job_document(&document).unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].salary, Some(Some("$120,000 a year".to_string())));
    assert_eq!(records[0].employment_type(), Some("Contract"));
    assert_eq!(records[0].location.as_deref(), Some("Remote"));

    assert_eq!(records[1].company.as_deref(), Some("Initech"));
    assert_eq!(records[1].salary, Some(None));
    assert_eq!(records[1].employment_type(), Some("Part-time"));
    assert_eq!(records[1].bullets, vec!["SQL"]);

    let text = std::fs::read_to_string(&document).unwrap();
    assert!(text.contains("\"salary\": null"));
}

#[tokio::test]
async fn test_empty_listing_writes_empty_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/search"))
        .respond_with(html(
            r#"<html><body><ul class="jobs-search__results-list"></ul></body></html>"#.to_string(),
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let search_url = format!("{}/jobs/search", server.uri());
    let (config, hash) = load(&source_config(dir.path(), "LinkedIn", "linkedin", &search_url, ""));

    run_harvest(&config, &hash, pages(&config), &jobs_only())
        .await
        .unwrap();

    let text = std::fs::read_to_string(dir.path().join("LinkedIn_job_description_data.json"))
        .unwrap();
    assert_eq!(text, "[]");
}

#[tokio::test]
async fn test_resume_skips_checkpointed_postings() {
    let server = MockServer::start().await;
    mount_linkedin(&server).await;

    let dir = TempDir::new().unwrap();
    let search_url = format!("{}/jobs/search", server.uri());
    let content = source_config(dir.path(), "LinkedIn", "linkedin", &search_url, "");
    let (config, hash) = load(&content);

    // Simulate an interrupted run that already extracted posting 3
    let mut previous = RecordAggregator::open(dir.path(), "LinkedIn", &hash, false).unwrap();
    let mut recovered = JobRecord::new(format!("{}/jobs/view/3", server.uri()));
    recovered.title = Some("Recovered".to_string());
    previous.push(recovered).unwrap();
    drop(previous);

    let summary = run_harvest(&config, &hash, pages(&config), &jobs_only())
        .await
        .unwrap();
    assert_eq!(summary.sources[0].resumed, 1);

    let records =
        read_job_document(&dir.path().join("LinkedIn_job_description_data.json")).unwrap();
    let titles: Vec<Option<&str>> = records.iter().map(|r| r.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("Data Scientist"), Some("Recovered")]);

    let requests = server.received_requests().await.unwrap();
    assert!(!requests.iter().any(|r| r.url.path() == "/jobs/view/3"));
}

#[tokio::test]
async fn test_fresh_run_ignores_checkpoint() {
    let server = MockServer::start().await;
    mount_linkedin(&server).await;

    let dir = TempDir::new().unwrap();
    let search_url = format!("{}/jobs/search", server.uri());
    let (config, hash) = load(&source_config(dir.path(), "LinkedIn", "linkedin", &search_url, ""));

    let mut previous = RecordAggregator::open(dir.path(), "LinkedIn", &hash, false).unwrap();
    previous
        .push(JobRecord::new(format!("{}/jobs/view/3", server.uri())))
        .unwrap();
    drop(previous);

    let options = RunOptions {
        fresh: true,
        ..jobs_only()
    };
    let summary = run_harvest(&config, &hash, pages(&config), &options)
        .await
        .unwrap();
    assert_eq!(summary.sources[0].resumed, 0);

    let records =
        read_job_document(&dir.path().join("LinkedIn_job_description_data.json")).unwrap();
    assert_eq!(records[1].title.as_deref(), Some("Lead Data Scientist"));
}

#[tokio::test]
async fn test_failed_posting_does_not_stop_source() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/jobs/search"))
        .respond_with(html(linkedin_results(&base_url)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/view/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/view/3"))
        .respond_with(html(linkedin_posting("Lead Data Scientist", "Remote")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let search_url = format!("{}/jobs/search", base_url);
    let (config, hash) = load(&source_config(dir.path(), "LinkedIn", "linkedin", &search_url, ""));

    let summary = run_harvest(&config, &hash, pages(&config), &jobs_only())
        .await
        .unwrap();

    let report = &summary.sources[0];
    assert_eq!(report.records, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].contains("/jobs/view/1"));
}

#[tokio::test]
async fn test_readiness_polls_until_selector_appears() {
    let server = MockServer::start().await;

    // First two loads are still a loading shell
    Mock::given(method("GET"))
        .and(path("/jobs/view/7"))
        .respond_with(html("<html><body>Loading...</body></html>".to_string()))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/view/7"))
        .respond_with(html(linkedin_posting("Data Scientist", "Remote")))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let source = HttpPageSource::new(client);
    let url = url::Url::parse(&format!("{}/jobs/view/7", server.uri())).unwrap();
    let request = PageRequest {
        url: &url,
        ready_selector: "div.description__text--rich",
        expand_selector: None,
        wait: WaitPolicy {
            max_wait: Duration::from_secs(2),
            poll_interval: Duration::from_millis(20),
        },
    };

    let page = source.load(&request).await.expect("Page should become ready");
    assert!(page.html.contains("description__text--rich"));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_readiness_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/view/8"))
        .respond_with(html("<html><body>Loading...</body></html>".to_string()))
        .mount(&server)
        .await;

    let source = HttpPageSource::new(reqwest::Client::new());
    let url = url::Url::parse(&format!("{}/jobs/view/8", server.uri())).unwrap();
    let request = PageRequest {
        url: &url,
        ready_selector: "div.description__text--rich",
        expand_selector: None,
        wait: WaitPolicy {
            max_wait: Duration::from_millis(200),
            poll_interval: Duration::from_millis(50),
        },
    };

    match source.load(&request).await {
        Err(HarvestError::Timeout { url: timed_out, waited_ms }) => {
            assert!(timed_out.ends_with("/jobs/view/8"));
            assert!(waited_ms >= 200);
        }
        other => panic!("Expected a timeout, got {:?}", other.map(|p| p.url)),
    }
}

#[tokio::test]
async fn test_slow_response_times_out_within_wait() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/view/9"))
        .respond_with(
            html(linkedin_posting("Data Scientist", "Remote")).set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let source = HttpPageSource::new(reqwest::Client::new());
    let url = url::Url::parse(&format!("{}/jobs/view/9", server.uri())).unwrap();
    let request = PageRequest {
        url: &url,
        ready_selector: "div.description__text--rich",
        expand_selector: None,
        wait: WaitPolicy {
            max_wait: Duration::from_millis(200),
            poll_interval: Duration::from_millis(50),
        },
    };

    let started = std::time::Instant::now();
    let result = source.load(&request).await;

    assert!(
        matches!(result, Err(HarvestError::Timeout { .. })),
        "Expected a timeout, got {:?}",
        result.map(|p| p.url)
    );
    assert!(started.elapsed() < Duration::from_secs(2));
}
