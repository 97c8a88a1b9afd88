//! Headless Chrome page source
//!
//! Renders pages whose content is built by JavaScript. `headless_chrome` is a
//! blocking API, so every load runs on tokio's blocking pool in its own tab.

use super::{LoadedPage, PageRequest, PageSource, WaitPolicy};
use crate::HarvestError;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Loads pages through a shared headless Chrome instance
#[derive(Clone)]
pub struct ChromePageSource {
    browser: Browser,
}

impl ChromePageSource {
    /// Launches Chrome; `headless = false` shows the window, which helps when selectors break
    pub fn launch(headless: bool) -> Result<Self, HarvestError> {
        let options = LaunchOptionsBuilder::default()
            .headless(headless)
            .build()
            .map_err(|e| HarvestError::Browser(e.to_string()))?;
        let browser = Browser::new(options).map_err(browser_error)?;
        Ok(Self { browser })
    }
}

impl PageSource for ChromePageSource {
    async fn load(&self, request: &PageRequest<'_>) -> Result<LoadedPage, HarvestError> {
        let browser = self.browser.clone();
        let url = request.url.clone();
        let ready = request.ready_selector.to_string();
        let expand = request.expand_selector.map(str::to_string);
        let wait = request.wait;

        tokio::task::spawn_blocking(move || render(&browser, &url, &ready, expand.as_deref(), wait))
            .await?
    }
}

fn render(
    browser: &Browser,
    url: &Url,
    ready_selector: &str,
    expand_selector: Option<&str>,
    wait: WaitPolicy,
) -> Result<LoadedPage, HarvestError> {
    let started = Instant::now();
    let tab = TabGuard(browser.new_tab().map_err(browser_error)?);

    tab.navigate_to(url.as_str())
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(browser_error)?;

    let remaining = wait.max_wait.saturating_sub(started.elapsed());
    if tab
        .wait_for_element_with_custom_timeout(ready_selector, remaining)
        .is_err()
    {
        return Err(HarvestError::Timeout {
            url: url.to_string(),
            waited_ms: started.elapsed().as_millis() as u64,
        });
    }

    if let Some(expand) = expand_selector {
        match tab.find_element(expand) {
            Ok(control) => {
                control.click().map_err(browser_error)?;
                std::thread::sleep(wait.poll_interval);
            }
            Err(_) => tracing::debug!("No expand control on {}", url),
        }
    }

    let html = tab.get_content().map_err(browser_error)?;
    let final_url = Url::parse(&tab.get_url()).unwrap_or_else(|_| url.clone());

    Ok(LoadedPage {
        url: final_url,
        html,
    })
}

fn browser_error(error: impl std::fmt::Display) -> HarvestError {
    HarvestError::Browser(error.to_string())
}

/// A tab that can be closed
trait CloseTab {
    fn close_tab(&self) -> Result<(), String>;
}

impl CloseTab for Tab {
    fn close_tab(&self) -> Result<(), String> {
        self.close(true).map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Closes its tab on every exit from [`render`], early returns included
struct TabGuard<T: CloseTab = Tab>(Arc<T>);

impl<T: CloseTab> Deref for TabGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: CloseTab> Drop for TabGuard<T> {
    fn drop(&mut self) {
        if let Err(e) = self.0.close_tab() {
            tracing::warn!("Failed to close browser tab: {}", e);
        }
    }
}
