//! Field extraction for job board pages
//!
//! This module turns rendered HTML into listing cards and job records:
//! - Selector helpers that make a missing required element a typed error
//! - Title keyword filtering for results pages
//! - One [`JobBoard`] implementation per supported site

pub mod dom;
mod filter;
mod indeed;
mod linkedin;

pub use filter::KeywordFilter;
pub use indeed::Indeed;
pub use linkedin::LinkedIn;

use crate::record::JobRecord;
use crate::ExtractResult;
use scraper::Html;
use serde::Deserialize;
use std::fmt;
use url::Url;

/// A results-page card that passed the keyword filter
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    /// Absolute posting URL
    pub link: Url,

    /// Card title the filter matched against
    pub title: String,

    /// Fields already visible on the card; the detail page completes them
    pub seed: JobRecord,
}

impl ListingCard {
    pub fn new(link: Url, title: String) -> Self {
        let seed = JobRecord::new(link.as_str());
        Self { link, title, seed }
    }
}

/// DOM knowledge for one job board
///
/// Implementations only read documents; fetching and waiting belong to
/// [`crate::page::PageSource`].
pub trait JobBoard: Send + Sync {
    /// Human-readable board name
    fn name(&self) -> &'static str;

    /// Selector whose presence means a results page has rendered
    fn listing_ready_selector(&self) -> &'static str;

    /// Selector whose presence means a posting page has rendered
    fn detail_ready_selector(&self) -> &'static str;

    /// "Show more" control to click before reading a posting, if the board has one
    fn expand_control_selector(&self) -> Option<&'static str> {
        None
    }

    /// Extracts the cards whose title passes `filter`, in page order
    fn collect_listing(
        &self,
        document: &Html,
        page_url: &Url,
        filter: &KeywordFilter,
    ) -> ExtractResult<Vec<ListingCard>>;

    /// URL of results page `page_number`, if the current page links to it
    fn next_page_url(
        &self,
        _document: &Html,
        _page_url: &Url,
        _page_number: u32,
    ) -> ExtractResult<Option<Url>> {
        Ok(None)
    }

    /// Completes the card's seed record from the posting page
    fn extract_detail(&self, document: &Html, card: ListingCard) -> ExtractResult<JobRecord>;
}

/// Supported job boards, as named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    LinkedIn,
    Indeed,
}

impl Site {
    pub fn board(&self) -> &'static dyn JobBoard {
        match self {
            Self::LinkedIn => &LinkedIn,
            Self::Indeed => &Indeed,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.board().name())
    }
}
