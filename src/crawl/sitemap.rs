// src/crawl/sitemap.rs
// =============================================================================
// This module fetches and parses XML sitemaps.
//
// Two document shapes exist:
//
//   <urlset>                         <sitemapindex>
//     <url><loc>PAGE</loc></url>       <sitemap><loc>SITEMAP</loc></sitemap>
//   </urlset>                        </sitemapindex>
//
// A urlset lists pages directly. A sitemap index lists *other sitemaps*,
// which may themselves be indexes, so expansion is recursive.
//
// We use `quick-xml`, a streaming (pull) parser: instead of building a tree
// it hands us one event at a time (start tag, text, end tag, ...). We keep
// only the <loc> values, never a document tree. The response body itself is
// still downloaded in full before parsing starts.
//
// Failures (network, bad status, malformed XML) never propagate: they are
// logged and that sitemap simply contributes no URLs.
// =============================================================================

use anyhow::{anyhow, Result};
use futures::future::{BoxFuture, FutureExt};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use std::collections::HashSet;

use super::fetch::fetch_page;
use super::MAX_URLS_PER_SITE;
use crate::url_utils::is_valid_url;

// What a parsed sitemap document turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// A <sitemapindex>: the locations of child sitemaps
    Index(Vec<String>),
    /// A <urlset>: the locations of pages
    UrlSet(Vec<String>),
}

// Fetches a sitemap (or sitemap index) and returns up to MAX_URLS_PER_SITE
// page URLs, in document order
//
// Child sitemaps of an index are fetched one after another, first to last.
// Once the cap is reached no further child sitemaps are requested.
pub async fn fetch_sitemap(client: &Client, sitemap_url: &str) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut urls = expand_sitemap(client, sitemap_url.to_string(), MAX_URLS_PER_SITE, &mut visited).await;
    urls.truncate(MAX_URLS_PER_SITE);

    tracing::debug!("Sitemap {} yielded {} URL(s)", sitemap_url, urls.len());
    urls
}

// Recursive worker behind fetch_sitemap
//
// `budget` is how many more URLs the caller can still use.
// `visited` stops an index that (directly or indirectly) lists itself
// from being fetched forever.
//
// Recursive async functions need to return a boxed future, because the
// compiler can't size a future that contains itself.
fn expand_sitemap<'a>(
    client: &'a Client,
    sitemap_url: String,
    budget: usize,
    visited: &'a mut HashSet<String>,
) -> BoxFuture<'a, Vec<String>> {
    async move {
        if budget == 0 || !visited.insert(sitemap_url.clone()) {
            return Vec::new();
        }

        let xml = match fetch_page(client, &sitemap_url).await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::warn!("Could not fetch sitemap {}: {}", sitemap_url, e);
                return Vec::new();
            }
        };

        let document = match parse_sitemap(&xml) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Could not parse sitemap {}: {}", sitemap_url, e);
                return Vec::new();
            }
        };

        match document {
            SitemapDocument::UrlSet(mut urls) => {
                urls.retain(|url| is_valid_url(url));
                urls.truncate(budget);
                urls
            }
            SitemapDocument::Index(children) => {
                tracing::info!(
                    "Sitemap index {} lists {} child sitemap(s)",
                    sitemap_url,
                    children.len()
                );

                let mut urls = Vec::new();
                for child in children {
                    if urls.len() >= budget {
                        break;
                    }
                    if !is_valid_url(&child) {
                        tracing::debug!("Skipping invalid child sitemap {:?}", child);
                        continue;
                    }
                    let remaining = budget - urls.len();
                    urls.extend(expand_sitemap(client, child, remaining, &mut *visited).await);
                }
                urls
            }
        }
    }
    .boxed()
}

// Parses a sitemap or sitemap-index document
//
// Element names are matched on their local part, so both
// `<urlset xmlns="...">` and prefixed forms like `<sm:loc>` work.
// A <loc> only counts when it sits directly inside <url> or <sitemap>,
// which skips things like <image:loc> inside <image:image>.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    // Local names of the currently open elements
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut root: Option<Vec<u8>> = None;

    let mut current_loc: Option<String> = None;
    let mut locs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_ascii_lowercase();
                if root.is_none() {
                    root = Some(name.clone());
                }
                if name == b"loc" && is_entry_parent(stack.last()) {
                    current_loc = Some(String::new());
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                // e.g. an empty `<urlset/>`
                if root.is_none() {
                    root = Some(e.local_name().as_ref().to_ascii_lowercase());
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(loc) = current_loc.as_mut() {
                    let text = t.unescape().map_err(|e| anyhow!("bad text in <loc>: {}", e))?;
                    loc.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let name = stack.pop();
                if name.as_deref() == Some(b"loc".as_slice()) {
                    if let Some(loc) = current_loc.take() {
                        let loc = loc.trim();
                        if !loc.is_empty() {
                            locs.push(loc.to_string());
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow!(
                    "xml error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    match root.as_deref() {
        Some(b"sitemapindex") => Ok(SitemapDocument::Index(locs)),
        Some(b"urlset") => Ok(SitemapDocument::UrlSet(locs)),
        Some(other) => Err(anyhow!(
            "unexpected root element <{}>",
            String::from_utf8_lossy(other)
        )),
        None => Err(anyhow!("empty document")),
    }
}

fn is_entry_parent(parent: Option<&Vec<u8>>) -> bool {
    matches!(parent.map(Vec::as_slice), Some(b"url") | Some(b"sitemap"))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is BoxFuture?
//    - An `async fn` that calls itself would need a future type that
//      contains itself, which has infinite size
//    - Boxing the future (putting it on the heap) gives it a fixed size
//    - `.boxed()` from futures::FutureExt does the boxing and pinning
//
// 2. Why does the budget shrink as we recurse?
//    - Children are expanded in order, so stopping once the cap is full
//      keeps exactly the URLs a "fetch everything, then truncate" approach
//      would keep, without downloading sitemaps we'd throw away
//
// 3. What is `local_name()`?
//    - For `<sm:loc>` the full name is "sm:loc" and the local name is "loc"
//    - Matching on the local name ignores namespace prefixes
// -----------------------------------------------------------------------------
