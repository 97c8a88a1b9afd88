//! Locator helpers over `scraper` documents
//!
//! Required fields go through [`find_first`], which turns an empty match into
//! [`ExtractError::FieldNotFound`]. Optional fields go through
//! [`optional_text`], which logs the miss and yields `None`.

use crate::{ExtractError, ExtractResult};
use scraper::{ElementRef, Selector};
use url::Url;

/// Compiles a CSS selector
pub fn selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Returns the first descendant of `scope` matching `css`, or `FieldNotFound`
pub fn find_first<'a>(scope: ElementRef<'a>, css: &str) -> ExtractResult<ElementRef<'a>> {
    find_optional(scope, css)?.ok_or_else(|| ExtractError::FieldNotFound {
        selector: css.to_string(),
    })
}

/// Returns the first descendant of `scope` matching `css`, if any
pub fn find_optional<'a>(
    scope: ElementRef<'a>,
    css: &str,
) -> ExtractResult<Option<ElementRef<'a>>> {
    let selector = selector(css)?;
    let found = scope.select(&selector).next();
    Ok(found)
}

/// Returns every descendant of `scope` matching `css`, in document order
pub fn find_all<'a>(scope: ElementRef<'a>, css: &str) -> ExtractResult<Vec<ElementRef<'a>>> {
    let selector = selector(css)?;
    let found = scope.select(&selector).collect();
    Ok(found)
}

/// Text of an optional field, `None` when the locator misses or the text is empty
pub fn optional_text(scope: ElementRef<'_>, css: &str, field: &str) -> ExtractResult<Option<String>> {
    let text = find_optional(scope, css)?
        .map(element_text)
        .filter(|text| !text.is_empty());

    if text.is_none() {
        tracing::debug!("Optional field '{}' absent (selector `{}`)", field, css);
    }

    Ok(text)
}

/// Text content of an element with whitespace runs collapsed to single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Non-empty text lines of an element
///
/// Every text node contributes its own lines, so `<h3>Label</h3><span>Value</span>`
/// yields `["Label", "Value"]`, which is how a browser renders block children.
pub fn text_lines(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .flat_map(str::lines)
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Paragraph and bullet texts of a description block, empty entries dropped
pub fn paragraphs_and_bullets(
    description: ElementRef<'_>,
) -> ExtractResult<(Vec<String>, Vec<String>)> {
    let collect = |css: &str| -> ExtractResult<Vec<String>> {
        Ok(find_all(description, css)?
            .into_iter()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect())
    };

    Ok((collect("p")?, collect("li")?))
}

/// Resolves an href against the page it was found on
///
/// Returns None for empty, fragment-only and non-HTTP(S) links.
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
