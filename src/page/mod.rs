//! Page loading
//!
//! A [`PageSource`] turns a URL into rendered HTML once the page is ready,
//! where "ready" means a board-specific selector matches. Waiting is bounded:
//! a page that never becomes ready fails with [`HarvestError::Timeout`]
//! instead of being read half-rendered.
//!
//! - [`HttpPageSource`]: plain HTTP, re-fetching until the selector appears
//! - `ChromePageSource` (feature `browser`): headless Chrome rendering

#[cfg(feature = "browser")]
mod chrome;
mod http;

#[cfg(feature = "browser")]
pub use chrome::ChromePageSource;
pub use http::{build_http_client, fetch_text, user_agent_string, HttpPageSource};

use crate::HarvestError;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Bounds on waiting for a page to become ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Give up after this long
    pub max_wait: Duration,

    /// Check readiness this often
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// What to load and how to tell it is ready
#[derive(Debug, Clone)]
pub struct PageRequest<'a> {
    pub url: &'a Url,

    /// Selector that must match before the page is returned
    pub ready_selector: &'a str,

    /// Control to click once ready (e.g. "show more"), if present on the page
    pub expand_selector: Option<&'a str>,

    pub wait: WaitPolicy,
}

/// A loaded, ready page
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// Final URL after redirects
    pub url: Url,

    /// Rendered HTML
    pub html: String,
}

/// Loads pages for the job pipeline
pub trait PageSource: Send + Sync + 'static {
    /// Loads `request.url` and returns its HTML once `request.ready_selector` matches
    fn load(
        &self,
        request: &PageRequest<'_>,
    ) -> impl Future<Output = Result<LoadedPage, HarvestError>> + Send;
}
