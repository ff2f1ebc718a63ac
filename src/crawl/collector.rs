// src/crawl/collector.rs
// =============================================================================
// Decides which URLs of a website get checked.
//
// Policy, in order:
// 1. Seeds come from /sitemap.xml, or /sitemap_index.xml if that is empty
// 2. No sitemap at all? Seeds come from the homepage's links instead
// 3. Every seed page is fetched once and its internal links are added
//    (one level only, never recursive)
// 4. The result is deduplicated and capped at MAX_URLS_PER_SITE
// =============================================================================

use reqwest::Client;
use std::collections::HashSet;

use super::homepage::{extract_internal_links, fetch_homepage_links};
use super::sitemap::fetch_sitemap;
use super::MAX_URLS_PER_SITE;
use crate::url_utils::resolve_url;

const SITEMAP_PATHS: [&str; 2] = ["/sitemap.xml", "/sitemap_index.xml"];

// Collects the URLs to check for one website
//
// Returns: unique absolute URLs, at most MAX_URLS_PER_SITE of them,
// seeds first and expansion results after them.
pub async fn collect_links(client: &Client, website_url: &str) -> Vec<String> {
    let seeds = discover_seeds(client, website_url).await;
    tracing::info!("Found {} seed URL(s) for {}", seeds.len(), website_url);

    let mut links = seeds.clone();

    // Pages already expanded in this collection pass. This is separate from
    // the checker's checked set: a page being crawled here still needs its
    // own status check later.
    let mut visited: HashSet<String> = HashSet::new();

    for seed in &seeds {
        if links.len() >= MAX_URLS_PER_SITE {
            tracing::debug!("Reached {} URLs, stopping expansion", MAX_URLS_PER_SITE);
            break;
        }

        visited.insert(seed.clone());
        let inner = extract_internal_links(client, seed, website_url, &visited).await;
        links.extend(inner);
    }

    let links = dedupe_and_cap(links, MAX_URLS_PER_SITE);
    tracing::info!("Collected {} unique URL(s) for {}", links.len(), website_url);
    links
}

// Sitemaps first, homepage crawl as the fallback
async fn discover_seeds(client: &Client, website_url: &str) -> Vec<String> {
    for path in SITEMAP_PATHS {
        let Some(sitemap_url) = resolve_url(website_url, path) else {
            continue;
        };

        let urls = fetch_sitemap(client, &sitemap_url).await;
        if !urls.is_empty() {
            tracing::info!("Using sitemap {} ({} URLs)", sitemap_url, urls.len());
            return urls;
        }
    }

    tracing::info!("No usable sitemap for {}, crawling the homepage", website_url);
    fetch_homepage_links(client, website_url).await
}

// Removes duplicates (keeping the first occurrence) and truncates to `cap`
fn dedupe_and_cap(links: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .take(cap)
        .collect()
}
