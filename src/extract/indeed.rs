//! Indeed job search
//!
//! Indeed shows most of a posting on its results card (company, salary,
//! employment type, location), so cards seed the record and the posting page
//! only adds the description and, when the card lacked it, the employment type.

use super::dom::{
    element_text, find_all, find_first, find_optional, optional_text, paragraphs_and_bullets,
    resolve_href, text_lines,
};
use super::{JobBoard, KeywordFilter, ListingCard};
use crate::record::{JobRecord, EMPLOYMENT_TYPE};
use crate::ExtractResult;
use scraper::{ElementRef, Html};
use url::Url;

const LEFT_PANE: &str = "div.jobsearch-LeftPane";
const RESULT_CARD: &str = "div.job_seen_beacon";
const CARD_LINK: &str = "a[href]";
const CARD_TITLE: &str = "span";
const COMPANY: &str = "span.companyName";
const SALARY_ONLY_BLOCK: &str = "div.metadataContainer.salaryOnly";
const SALARY: &str = "div.salary-snippet-container";
const METADATA: &str = "div.metadata:not(.salary-snippet-container)";
const LOCATION: &str = "div.companyLocation";

const SECTION_ITEM: &str = "div.jobsearch-JobDescriptionSection-sectionItem";
const DESCRIPTION: &str = "div#jobDescriptionText";

/// Section labels that introduce the employment type on a posting page
const EMPLOYMENT_TYPE_LABELS: [&str; 3] = ["job type", "employment type", "job types"];

/// Indeed job board
#[derive(Debug, Default, Clone, Copy)]
pub struct Indeed;

impl JobBoard for Indeed {
    fn name(&self) -> &'static str {
        "Indeed"
    }

    fn listing_ready_selector(&self) -> &'static str {
        LEFT_PANE
    }

    fn detail_ready_selector(&self) -> &'static str {
        DESCRIPTION
    }

    fn collect_listing(
        &self,
        document: &Html,
        page_url: &Url,
        filter: &KeywordFilter,
    ) -> ExtractResult<Vec<ListingCard>> {
        let pane = find_first(document.root_element(), LEFT_PANE)?;
        let mut cards = Vec::new();

        for card in find_all(pane, RESULT_CARD)? {
            let Some(anchor) = find_optional(card, CARD_LINK)? else {
                tracing::debug!("Skipping result card without a link");
                continue;
            };
            let Some(title) = find_optional(anchor, CARD_TITLE)?.map(element_text) else {
                tracing::debug!("Skipping result card without a title");
                continue;
            };
            if !filter.matches(&title) {
                continue;
            }

            let link = anchor
                .value()
                .attr("href")
                .and_then(|href| resolve_href(href, page_url));
            let Some(link) = link else {
                tracing::debug!("Skipping result card '{}' with an unusable link", title);
                continue;
            };

            let mut listing = ListingCard::new(link, title.clone());
            seed_from_card(card, &title, &mut listing.seed)?;
            cards.push(listing);
        }

        Ok(cards)
    }

    fn next_page_url(
        &self,
        document: &Html,
        page_url: &Url,
        page_number: u32,
    ) -> ExtractResult<Option<Url>> {
        let pagination = format!("a[data-testid=\"pagination-page-{}\"]", page_number);
        let next = find_optional(document.root_element(), &pagination)?
            .and_then(|anchor| anchor.value().attr("href"))
            .and_then(|href| resolve_href(href, page_url));
        Ok(next)
    }

    fn extract_detail(&self, document: &Html, card: ListingCard) -> ExtractResult<JobRecord> {
        let root = document.root_element();
        let description = find_first(root, DESCRIPTION)?;

        let mut record = card.seed;
        if !record.has_employment_type() {
            let sections = find_all(root, SECTION_ITEM)?;
            record.set_criterion(EMPLOYMENT_TYPE, employment_type(&sections));
        }

        let (paragraphs, bullets) = paragraphs_and_bullets(description)?;
        record.paragraphs = paragraphs;
        record.bullets = bullets;

        Ok(record)
    }
}

/// Fills the listing-level fields shown on a results card
fn seed_from_card(card: ElementRef<'_>, title: &str, seed: &mut JobRecord) -> ExtractResult<()> {
    seed.title = Some(title.to_string());
    seed.company = optional_text(card, COMPANY, "company")?;

    // Salary is recorded for every Indeed card, as null when the card has none
    seed.salary = Some(None);
    if find_optional(card, SALARY_ONLY_BLOCK)?.is_some() {
        seed.salary = Some(optional_text(card, SALARY, "salary")?);
        if let Some(employment) = optional_text(card, METADATA, "employment type")? {
            seed.set_criterion(EMPLOYMENT_TYPE, Some(employment));
        }
    }

    seed.location = find_optional(card, LOCATION)?
        .and_then(|location| text_lines(location).into_iter().next());

    Ok(())
}

/// Employment type from the posting's job-details sections
///
/// Prefers the section labelled "Job type". Without a label the value is
/// taken by position: the second line of the only section, or of the second
/// section when there are several. That positional read is a best-effort
/// heuristic and mis-maps when Indeed changes the section order.
fn employment_type(sections: &[ElementRef<'_>]) -> Option<String> {
    let lines: Vec<Vec<String>> = sections.iter().map(|s| text_lines(*s)).collect();

    let labelled = lines.iter().find(|section| {
        section.first().is_some_and(|label| {
            let label = label.trim_end_matches(':').trim().to_lowercase();
            EMPLOYMENT_TYPE_LABELS.contains(&label.as_str())
        })
    });
    if let Some(section) = labelled {
        return section.get(1).cloned();
    }

    let positional = match lines.len() {
        0 => None,
        1 => lines[0].get(1).cloned(),
        _ => lines[1].get(1).cloned(),
    };
    if let Some(value) = &positional {
        tracing::debug!("Employment type '{}' read by section position", value);
    }
    positional
}
