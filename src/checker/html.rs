// src/checker/html.rs
// =============================================================================
// This module extracts anchor targets from an HTML document.
//
// The HTML handed to us is the DOM *after* the page's scripts ran (see
// src/render/), so links injected at runtime are already in it.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to resolve relative hrefs against the page
// URL, or against the document's <base href> when it declares one.
// =============================================================================

use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

// Extracts every network-fetchable anchor target from the document
//
// Parameters:
//   html: the rendered document (borrowed as &str)
//   page_url: the URL the document was loaded from
//
// Returns: the set of absolute URL strings, duplicates removed
//
// Skipped before resolving:
//   href=""              (points at the page itself)
//   href="#section"      (in-page fragment)
//   href="javascript:.." (script, not a link)
pub fn extract_anchor_targets(html: &str, page_url: &Url) -> BTreeSet<String> {
    let document = Html::parse_document(html);

    // Both selectors are constants and known to be valid
    let anchors = Selector::parse("a[href]").expect("valid selector");
    let base_tag = Selector::parse("base[href]").expect("valid selector");

    let base = document
        .select(&base_tag)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone());

    document
        .select(&anchors)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_fetchable_href(href))
        .filter_map(|href| base.join(href).ok())
        .map(|url| url.to_string())
        .collect()
}

fn is_fetchable_href(href: &str) -> bool {
    !href.is_empty()
        && !href.starts_with('#')
        && !href.to_ascii_lowercase().starts_with("javascript:")
}
