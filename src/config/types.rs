use crate::extract::{KeywordFilter, Site};
use crate::filings::Endpoint;
use crate::page::WaitPolicy;
use crate::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for job-harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub filings: Option<FilingsConfig>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the harvester
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the harvester
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the harvester
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for contact (the SEC rejects requests without one)
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving JSON documents, CSV tables and checkpoints
    pub directory: String,
}

impl OutputConfig {
    pub fn directory(&self) -> &Path {
        Path::new(&self.directory)
    }
}

/// One job board search to harvest
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Source name, used in the output file name (`{name}_job_description_data.json`)
    pub name: String,

    /// Which board layout the search page uses
    pub site: Site,

    /// First results page
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Case-sensitive substring a posting title must contain
    #[serde(default)]
    pub keyword: Option<String>,

    /// Regular expression a posting title must match (alternative to `keyword`)
    #[serde(default, rename = "keyword-pattern")]
    pub keyword_pattern: Option<String>,

    /// Number of results pages to follow
    #[serde(default = "default_max_pages", rename = "max-pages")]
    pub max_pages: u32,

    /// Upper bound on waiting for a page to become ready (milliseconds)
    #[serde(default = "default_max_wait_ms", rename = "max-wait-ms")]
    pub max_wait_ms: u64,

    /// Interval between readiness checks (milliseconds)
    #[serde(default = "default_poll_interval_ms", rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Pause after each page load (milliseconds)
    #[serde(default = "default_delay_ms", rename = "delay-between-pages-ms")]
    pub delay_between_pages_ms: u64,

    /// Number of postings extracted concurrently
    #[serde(
        default = "default_max_concurrent_pages",
        rename = "max-concurrent-pages"
    )]
    pub max_concurrent_pages: u32,
}

impl SourceConfig {
    /// Builds the title filter from `keyword` or `keyword-pattern`
    pub fn keyword_filter(&self) -> Result<KeywordFilter, ConfigError> {
        match (&self.keyword, &self.keyword_pattern) {
            (Some(keyword), None) => Ok(KeywordFilter::substring(keyword.clone())),
            (None, Some(pattern)) => KeywordFilter::pattern(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e))),
            (Some(_), Some(_)) => Err(ConfigError::Validation(format!(
                "Source '{}' sets both keyword and keyword-pattern",
                self.name
            ))),
            (None, None) => Err(ConfigError::Validation(format!(
                "Source '{}' needs a keyword or keyword-pattern",
                self.name
            ))),
        }
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            max_wait: Duration::from_millis(self.max_wait_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_pages_ms)
    }
}

/// Filing API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilingsConfig {
    /// Name of the environment variable holding the API token
    #[serde(default = "default_token_env", rename = "token-env")]
    pub token_env: String,

    /// Submissions endpoint template (`{cik}`, `{cik10}`, `{token}` are substituted)
    #[serde(default = "default_submissions_url", rename = "submissions-url")]
    pub submissions_url: String,

    /// Compensation endpoint template
    #[serde(default = "default_compensation_url", rename = "compensation-url")]
    pub compensation_url: String,

    /// Endpoints queried for every company
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<Endpoint>,

    #[serde(default, rename = "company")]
    pub companies: Vec<CompanyEntry>,
}

impl FilingsConfig {
    /// Reads the API token if any configured endpoint template needs one
    pub fn resolve_token(&self) -> Result<Option<String>, ConfigError> {
        let needs_token = self
            .endpoints
            .iter()
            .any(|endpoint| self.template(*endpoint).contains("{token}"));

        if !needs_token {
            return Ok(None);
        }

        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(Some)
            .ok_or_else(|| ConfigError::MissingToken {
                var: self.token_env.clone(),
            })
    }

    pub fn template(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Submissions => &self.submissions_url,
            Endpoint::Compensation => &self.compensation_url,
        }
    }
}

/// A company to fetch filings for
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyEntry {
    pub name: String,

    /// Central Index Key
    pub cik: u64,
}

impl CompanyEntry {
    /// Output file stem: lowercased name with whitespace runs replaced by `_`
    pub fn slug(&self) -> String {
        self.name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn csv_path(&self, directory: &Path) -> PathBuf {
        directory.join(format!("{}.csv", self.slug()))
    }

    pub fn submissions_path(&self, directory: &Path) -> PathBuf {
        directory.join(format!("{}_submissions.json", self.slug()))
    }
}

fn default_max_pages() -> u32 {
    1
}

fn default_max_wait_ms() -> u64 {
    10_000
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_delay_ms() -> u64 {
    1_000
}

fn default_max_concurrent_pages() -> u32 {
    1
}

fn default_token_env() -> String {
    "SEC_API_TOKEN".to_string()
}

fn default_submissions_url() -> String {
    "https://data.sec.gov/submissions/CIK{cik10}.json".to_string()
}

fn default_compensation_url() -> String {
    "https://api.sec-api.io/compensation/{cik}?token={token}".to_string()
}

fn default_endpoints() -> Vec<Endpoint> {
    vec![Endpoint::Submissions, Endpoint::Compensation]
}
