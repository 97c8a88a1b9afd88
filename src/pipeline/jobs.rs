//! Job pipeline for one source
//!
//! Results pages are loaded one after another (following pagination up to
//! `max-pages`), then postings are extracted on a bounded worker pool. HTML
//! is parsed inside synchronous helpers only; a parsed document never lives
//! across an `.await`.

use crate::config::SourceConfig;
use crate::extract::{JobBoard, KeywordFilter, ListingCard};
use crate::output::{RecordAggregator, SourceReport};
use crate::page::{LoadedPage, PageRequest, PageSource, WaitPolicy};
use crate::record::JobRecord;
use crate::{HarvestError, Result};
use scraper::Html;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Cards collected from the results pages of one source
#[derive(Debug, Default)]
pub struct Listing {
    /// Unique cards in listing order
    pub cards: Vec<ListingCard>,

    /// Results pages after the first that failed to load
    pub failures: Vec<String>,
}

/// Harvests one configured source
pub struct JobPipeline<S: PageSource> {
    source: SourceConfig,
    board: &'static dyn JobBoard,
    filter: KeywordFilter,
    pages: Arc<S>,
}

impl<S: PageSource> JobPipeline<S> {
    pub fn new(source: SourceConfig, pages: Arc<S>) -> Result<Self> {
        let filter = source.keyword_filter()?;
        Ok(Self {
            board: source.site.board(),
            filter,
            source,
            pages,
        })
    }

    /// Collects matching cards from the results pages
    ///
    /// A failure on the first page fails the source. Later pages only end
    /// pagination early, keeping the cards already collected.
    pub async fn collect_listing(&self) -> Result<Listing> {
        let mut listing = Listing::default();
        let mut seen = HashSet::new();
        let mut url = Url::parse(&self.source.search_url)?;
        let wait = self.source.wait_policy();

        for page_number in 1..=self.source.max_pages {
            let request = PageRequest {
                url: &url,
                ready_selector: self.board.listing_ready_selector(),
                expand_selector: None,
                wait,
            };

            let page = match self.pages.load(&request).await {
                Ok(page) => page,
                Err(e) if page_number > 1 => {
                    tracing::warn!(
                        "{}: results page {} failed, stopping pagination: {}",
                        self.source.name,
                        page_number,
                        e
                    );
                    listing.failures.push(format!("{}: {}", url, e));
                    break;
                }
                Err(e) => return Err(e),
            };

            let (cards, next) = read_results_page(self.board, &page, &self.filter, page_number)?;
            tracing::info!(
                "{}: results page {} has {} matching postings",
                self.source.name,
                page_number,
                cards.len()
            );

            for card in cards {
                if seen.insert(card.link.to_string()) {
                    listing.cards.push(card);
                } else {
                    tracing::debug!("Skipping duplicate posting {}", card.link);
                }
            }

            match next {
                Some(next) if page_number < self.source.max_pages => {
                    tokio::time::sleep(self.source.page_delay()).await;
                    url = next;
                }
                _ => break,
            }
        }

        Ok(listing)
    }

    /// Runs the source end to end and writes its document under `directory`
    pub async fn run(&self, directory: &Path, config_hash: &str, fresh: bool) -> Result<SourceReport> {
        let mut report = SourceReport::new(&self.source.name);

        let listing = self.collect_listing().await?;
        report.listed = listing.cards.len();
        report.failures = listing.failures;

        let order: Vec<String> = listing.cards.iter().map(|c| c.link.to_string()).collect();
        let mut aggregator =
            RecordAggregator::open(directory, &self.source.name, config_hash, fresh)?;

        let (done, pending): (Vec<ListingCard>, Vec<ListingCard>) = listing
            .cards
            .into_iter()
            .partition(|card| aggregator.contains(card.link.as_str()));
        report.resumed = done.len();

        if report.resumed > 0 {
            tracing::info!(
                "{}: {} postings already extracted, {} to go",
                self.source.name,
                report.resumed,
                pending.len()
            );
        }

        let semaphore = Arc::new(Semaphore::new(self.source.max_concurrent_pages as usize));
        let mut tasks = JoinSet::new();

        for card in pending {
            let semaphore = semaphore.clone();
            let pages = self.pages.clone();
            let board = self.board;
            let wait = self.source.wait_policy();
            let delay = self.source.page_delay();

            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                let link = card.link.to_string();
                let result = extract_posting(pages.as_ref(), board, card, wait, delay).await;
                (link, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(record))) => {
                    tracing::debug!("Extracted {}", record.link);
                    aggregator.push(record)?;
                }
                Ok((link, Err(e))) => {
                    tracing::warn!("{}: skipping {}: {}", self.source.name, link, e);
                    report.failures.push(format!("{}: {}", link, e));
                }
                Err(e) => {
                    tracing::error!("{}: extraction task failed: {}", self.source.name, e);
                    report.failures.push(HarvestError::from(e).to_string());
                }
            }
        }

        let (path, written) = aggregator.finish(&order)?;
        tracing::info!(
            "{}: wrote {} records to {}",
            self.source.name,
            written,
            path.display()
        );

        report.records = written;
        report.output = Some(path);
        Ok(report)
    }
}

async fn extract_posting<S: PageSource>(
    pages: &S,
    board: &'static dyn JobBoard,
    card: ListingCard,
    wait: WaitPolicy,
    delay: Duration,
) -> Result<JobRecord> {
    let link = card.link.clone();
    let request = PageRequest {
        url: &link,
        ready_selector: board.detail_ready_selector(),
        expand_selector: board.expand_control_selector(),
        wait,
    };

    let page = pages.load(&request).await?;
    let record = read_posting_page(board, &page, card)?;

    tokio::time::sleep(delay).await;
    Ok(record)
}

fn read_results_page(
    board: &dyn JobBoard,
    page: &LoadedPage,
    filter: &KeywordFilter,
    page_number: u32,
) -> Result<(Vec<ListingCard>, Option<Url>)> {
    let document = Html::parse_document(&page.html);
    let cards = board
        .collect_listing(&document, &page.url, filter)
        .map_err(|e| HarvestError::extract(&page.url, e))?;
    let next = board
        .next_page_url(&document, &page.url, page_number + 1)
        .map_err(|e| HarvestError::extract(&page.url, e))?;
    Ok((cards, next))
}

fn read_posting_page(
    board: &dyn JobBoard,
    page: &LoadedPage,
    card: ListingCard,
) -> Result<JobRecord> {
    let document = Html::parse_document(&page.html);
    board
        .extract_detail(&document, card)
        .map_err(|e| HarvestError::extract(&page.url, e))
}
