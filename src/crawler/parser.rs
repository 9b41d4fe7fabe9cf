//! HTML parser for extracting crawl candidates
//!
//! This module scans the body of a fetched document for:
//! - `<a href>` links
//! - `<form>` submissions (action, method and visible input names)
//!
//! Parsing is permissive: malformed markup never fails, and a document
//! without a `<body>` (for example a frameset page) yields no candidates.

use crate::crawler::validator::{Candidate, LinkValidator, Verdict};
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Input types that are never filled from the payload pool
const SKIPPED_INPUT_TYPES: &[&str] = &["submit", "hidden"];

/// Extracts raw link and form candidates from a document
///
/// # Arguments
///
/// * `document` - Raw response body (decoded lossily as UTF-8)
/// * `origin` - URL the document was fetched from; used as the action of
///   forms that omit one
///
/// # Returns
///
/// Candidates in document order, anchors first, then forms
pub fn extract_candidates(document: &[u8], origin: &Url) -> Vec<Candidate> {
    let html = String::from_utf8_lossy(document);
    let document = Html::parse_document(&html);

    let Some(body) = select_body(&document) else {
        return Vec::new();
    };

    let mut candidates = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in body.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                candidates.push(Candidate::Link {
                    href: href.to_string(),
                });
            }
        }
    }

    if let Ok(form_selector) = Selector::parse("form") {
        for form in body.select(&form_selector) {
            candidates.push(form_candidate(form, origin));
        }
    }

    candidates
}

/// Extracts candidates and keeps only those the validator admits
///
/// Each admitted target is already recorded in the validator's visited set.
/// Fails only when a form needs payload values and the pool is empty.
pub fn extract(
    document: &[u8],
    origin: &Url,
    validator: &LinkValidator,
) -> Result<Vec<crate::state::Target>, CrawlError> {
    let mut targets = Vec::new();

    for candidate in extract_candidates(document, origin) {
        match validator.validate(&candidate)? {
            Verdict::Accepted(target) => {
                tracing::debug!("Discovered {} {}", target.method, target.url);
                targets.push(target);
            }
            Verdict::Rejected(reason) => {
                tracing::trace!("Skipping {:?}: {}", candidate, reason);
            }
        }
    }

    Ok(targets)
}

fn select_body(document: &Html) -> Option<ElementRef<'_>> {
    let body_selector = Selector::parse("body").ok()?;
    document.select(&body_selector).next()
}

fn form_candidate(form: ElementRef<'_>, origin: &Url) -> Candidate {
    let action = form
        .value()
        .attr("action")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| origin.to_string());

    let method = form.value().attr("method").map(str::to_string);

    let mut fields = Vec::new();
    if let Ok(input_selector) = Selector::parse("input[name]") {
        for input in form.select(&input_selector) {
            let input_type = input
                .value()
                .attr("type")
                .unwrap_or("text")
                .trim()
                .to_ascii_lowercase();
            if SKIPPED_INPUT_TYPES.contains(&input_type.as_str()) {
                continue;
            }
            if let Some(name) = input.value().attr("name").filter(|n| !n.is_empty()) {
                fields.push(name.to_string());
            }
        }
    }

    Candidate::Form {
        action,
        method,
        fields,
    }
}
