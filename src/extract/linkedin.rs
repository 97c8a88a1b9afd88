//! LinkedIn public job search
//!
//! Results are `div.base-card` entries inside `ul.jobs-search__results-list`;
//! a posting page has a top card (title, company, location), a criteria list
//! and a rich-text description collapsed behind a "show more" button.

use super::dom::{
    element_text, find_all, find_first, find_optional, optional_text, paragraphs_and_bullets,
    resolve_href, text_lines,
};
use super::{JobBoard, KeywordFilter, ListingCard};
use crate::record::JobRecord;
use crate::ExtractResult;
use scraper::{ElementRef, Html};
use url::Url;

const RESULTS_LIST: &str = "ul.jobs-search__results-list";
const RESULT_CARD: &str = "div.base-card";
const CARD_TITLE: &str = "h3";
const CARD_LINK: &str = "a[href]";

const EXPAND_CONTROL: &str = "button.show-more-less-html__button--more";
const TITLE: &str = "h2";
const COMPANY: &str = "span.topcard__flavor:not(.topcard__flavor--bullet)";
const LOCATION: &str = "span.topcard__flavor--bullet";
const CRITERIA_ITEM: &str = "li.description__job-criteria-item";
const CRITERIA_LABEL: &str = ".description__job-criteria-subheader";
const CRITERIA_VALUE: &str = ".description__job-criteria-text";
const DESCRIPTION: &str = "div.description__text--rich";

/// LinkedIn job board
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedIn;

impl JobBoard for LinkedIn {
    fn name(&self) -> &'static str {
        "LinkedIn"
    }

    fn listing_ready_selector(&self) -> &'static str {
        RESULTS_LIST
    }

    fn detail_ready_selector(&self) -> &'static str {
        DESCRIPTION
    }

    fn expand_control_selector(&self) -> Option<&'static str> {
        Some(EXPAND_CONTROL)
    }

    fn collect_listing(
        &self,
        document: &Html,
        page_url: &Url,
        filter: &KeywordFilter,
    ) -> ExtractResult<Vec<ListingCard>> {
        let results = find_first(document.root_element(), RESULTS_LIST)?;
        let mut cards = Vec::new();

        for card in find_all(results, RESULT_CARD)? {
            let Some(title) = find_optional(card, CARD_TITLE)?.map(element_text) else {
                tracing::debug!("Skipping result card without a title");
                continue;
            };
            if !filter.matches(&title) {
                continue;
            }

            let link = find_optional(card, CARD_LINK)?
                .and_then(|anchor| anchor.value().attr("href"))
                .and_then(|href| resolve_href(href, page_url));
            let Some(link) = link else {
                tracing::debug!("Skipping result card '{}' without a link", title);
                continue;
            };

            cards.push(ListingCard::new(link, title));
        }

        Ok(cards)
    }

    fn extract_detail(&self, document: &Html, card: ListingCard) -> ExtractResult<JobRecord> {
        let root = document.root_element();
        let description = find_first(root, DESCRIPTION)?;

        let mut record = card.seed;
        record.title = optional_text(root, TITLE, "job_description")?;
        record.company = optional_text(root, COMPANY, "company")?;
        record.location = optional_text(root, LOCATION, "location")?;

        for item in find_all(root, CRITERIA_ITEM)? {
            if let Some((label, value)) = criterion(item)? {
                record.set_criterion(label, Some(value));
            }
        }

        let (paragraphs, bullets) = paragraphs_and_bullets(description)?;
        record.paragraphs = paragraphs;
        record.bullets = bullets;

        Ok(record)
    }
}

/// Reads one criteria entry as (label, value)
///
/// The label and value carry their own classes. Items without them fall back
/// to the first two text lines, a best-effort guess that mis-maps if LinkedIn
/// reorders the item's children.
fn criterion(item: ElementRef<'_>) -> ExtractResult<Option<(String, String)>> {
    let label = find_optional(item, CRITERIA_LABEL)?.map(element_text);
    let value = find_optional(item, CRITERIA_VALUE)?.map(element_text);

    if let (Some(label), Some(value)) = (label, value) {
        if !label.is_empty() && !value.is_empty() {
            return Ok(Some((label, value)));
        }
    }

    let mut lines = text_lines(item).into_iter();
    match (lines.next(), lines.next()) {
        (Some(label), Some(value)) => {
            tracing::debug!("Criterion '{}' read by line position", label);
            Ok(Some((label, value)))
        }
        _ => {
            tracing::debug!("Skipping criteria item without a label and value");
            Ok(None)
        }
    }
}
