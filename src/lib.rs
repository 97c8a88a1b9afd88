//! job-harvest: job-board listing scraper and SEC filing exporter
//!
//! This crate collects job postings from LinkedIn and Indeed search pages,
//! extracts a fixed set of fields from every matching posting, and writes
//! them as one JSON document per source. A second, independent pipeline
//! fetches submission and compensation data for a list of companies and
//! writes it as JSON and CSV.

pub mod config;
pub mod extract;
pub mod filings;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod record;

use thiserror::Error;

/// Main error type for job-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction failed for {url}: {source}")]
    Extract { url: String, source: ExtractError },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Timed out after {waited_ms}ms waiting for {url} to become ready")]
    Timeout { url: String, waited_ms: u64 },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Filing error: {0}")]
    Filing(#[from] filings::FilingError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl HarvestError {
    /// Wraps an extraction error with the URL of the page it came from
    pub fn extract(url: &url::Url, source: ExtractError) -> Self {
        Self::Extract {
            url: url.to_string(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid keyword pattern: {0}")]
    InvalidPattern(String),

    #[error("Environment variable {var} is not set")]
    MissingToken { var: String },
}

/// DOM extraction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A required locator matched no element, usually because the site changed its markup
    #[error("No element matched `{selector}`")]
    FieldNotFound { selector: String },

    #[error("Invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for job-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{JobBoard, KeywordFilter, ListingCard, Site};
pub use record::JobRecord;
