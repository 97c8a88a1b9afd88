//! HTTP page source
//!
//! This module handles plain HTTP page loads, including:
//! - Building HTTP clients with an identifying user agent string
//! - GET requests with status classification
//! - Readiness polling against a selector, bounded by a timeout

use super::{LoadedPage, PageRequest, PageSource};
use crate::config::UserAgentConfig;
use crate::extract::dom::selector;
use crate::{ExtractResult, HarvestError};
use reqwest::Client;
use scraper::Html;
use std::time::{Duration, Instant};
use url::Url;

/// Formats the user agent: `Name/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use job_harvest::config::UserAgentConfig;
/// use job_harvest::page::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "job-harvest".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "ops@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its final URL and body
///
/// Non-2xx responses become [`HarvestError::Status`]; transport failures
/// become [`HarvestError::Http`].
pub async fn fetch_text(client: &Client, url: &Url) -> Result<(Url, String), HarvestError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let body = response.text().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok((final_url, body))
}

/// Loads pages over plain HTTP
///
/// Markup behind "show more" controls is already in the served HTML, so the
/// expand control is never clicked; readiness is re-checked by re-fetching.
/// Every fetch shares the `max_wait` budget, so a slow response times out too.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &UserAgentConfig) -> Result<Self, HarvestError> {
        Ok(Self::new(build_http_client(config)?))
    }
}

impl PageSource for HttpPageSource {
    async fn load(&self, request: &PageRequest<'_>) -> Result<LoadedPage, HarvestError> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let remaining = request.wait.max_wait.saturating_sub(started.elapsed());
            let fetched = tokio::time::timeout(remaining, fetch_text(&self.client, request.url))
                .await
                .map_err(|_| HarvestError::Timeout {
                    url: request.url.to_string(),
                    waited_ms: started.elapsed().as_millis() as u64,
                })?;
            let (final_url, html) = fetched?;

            let ready = is_ready(&html, request.ready_selector)
                .map_err(|e| HarvestError::extract(request.url, e))?;
            if ready {
                tracing::debug!(
                    "{} ready after {} attempt(s) in {:?}",
                    request.url,
                    attempts,
                    started.elapsed()
                );
                return Ok(LoadedPage {
                    url: final_url,
                    html,
                });
            }

            let waited = started.elapsed();
            if waited >= request.wait.max_wait {
                return Err(HarvestError::Timeout {
                    url: request.url.to_string(),
                    waited_ms: waited.as_millis() as u64,
                });
            }

            tracing::trace!(
                "{} not ready (`{}` missing), polling again",
                request.url,
                request.ready_selector
            );
            let remaining = request.wait.max_wait - waited;
            tokio::time::sleep(request.wait.poll_interval.min(remaining)).await;
        }
    }
}

/// Returns true if the ready selector matches anywhere in `html`
fn is_ready(html: &str, ready_selector: &str) -> ExtractResult<bool> {
    let ready = selector(ready_selector)?;
    let document = Html::parse_document(html);
    let found = document.select(&ready).next().is_some();
    Ok(found)
}
