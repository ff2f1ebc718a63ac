// src/crawl/html.rs
// =============================================================================
// This module extracts same-site links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Resolution and domain comparison go through `crate::url_utils`, so the
// homepage crawler and the inner-page expansion filter links identically.
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;

use crate::url_utils::{is_same_domain, resolve_url};

// Extracts every same-domain link from an HTML document
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL the HTML was served from (for resolving relative links)
//   site_url: the root of the site being scanned (for the same-domain check)
//
// Returns: absolute URLs in document order, duplicates removed
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='https://other.com'>X</a>"
//   page_url = site_url = "https://example.com"
//   result = ["https://example.com/docs"]
pub fn extract_same_domain_links(html: &str, page_url: &str, site_url: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let document = Html::parse_document(html);

    // The selector is a constant, but we still refuse to panic on it
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Invalid anchor selector: {:?}", e);
            return links;
        }
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if is_skippable_href(href) {
            continue;
        }

        let Some(absolute_url) = resolve_url(page_url, href) else {
            continue;
        };

        if !is_same_domain(site_url, &absolute_url) {
            continue;
        }

        // HashSet::insert returns false if the value was already present
        if seen.insert(absolute_url.clone()) {
            links.push(absolute_url);
        }
    }

    links
}

// Hrefs that never point at another page
fn is_skippable_href(href: &str) -> bool {
    let href = href.trim();
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
}
