// src/crawl/homepage.rs
// =============================================================================
// Link discovery by reading pages instead of sitemaps.
//
// - fetch_homepage_links: the fallback seed set when a site has no sitemap
// - extract_internal_links: the one-level expansion run on every seed page
//
// Both fetch a single page, pull out its anchors and keep only links on the
// same host as the site being scanned. A page that can't be fetched yields
// no links; that is logged and never treated as fatal.
// =============================================================================

use reqwest::Client;
use std::collections::HashSet;

use super::fetch::fetch_page;
use super::html::extract_same_domain_links;
use super::MAX_URLS_PER_SITE;

// Fetches the site's homepage and returns its same-domain links
//
// Returns at most MAX_URLS_PER_SITE unique absolute URLs, in the order
// they first appear on the page.
pub async fn fetch_homepage_links(client: &Client, base_url: &str) -> Vec<String> {
    let html = match fetch_page(client, base_url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Could not fetch homepage {}: {}", base_url, e);
            return Vec::new();
        }
    };

    let mut links = extract_same_domain_links(&html, base_url, base_url);
    links.truncate(MAX_URLS_PER_SITE);

    tracing::info!("Homepage {} links to {} internal page(s)", base_url, links.len());
    links
}

// Fetches one page and returns the same-domain links on it that are not
// in `already_checked`
//
// Relative hrefs are resolved against the page itself, the domain check
// is made against the site root.
pub async fn extract_internal_links(
    client: &Client,
    page_url: &str,
    website_url: &str,
    already_checked: &HashSet<String>,
) -> Vec<String> {
    let html = match fetch_page(client, page_url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Could not fetch {} for link extraction: {}", page_url, e);
            return Vec::new();
        }
    };

    let links: Vec<String> = extract_same_domain_links(&html, page_url, website_url)
        .into_iter()
        .filter(|link| !already_checked.contains(link))
        .collect();

    tracing::debug!("{} new internal link(s) on {}", links.len(), page_url);
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetch::build_client;

    #[tokio::test]
    async fn test_homepage_links_deduplicated_and_same_domain() {
        let mut server = mockito::Server::new_async().await;
        let base = format!("{}/", server.url());

        let html = format!(
            r#"<html><body>
                <a href="/about">About</a>
                <a href="{}/about">About (absolute)</a>
                <a href="/blog">Blog</a>
                <a href="/contact">Contact</a>
                <a href="https://external.example.org/">External</a>
            </body></html>"#,
            server.url()
        );
        let _mock = server.mock("GET", "/").with_body(html).create_async().await;

        let client = build_client().unwrap();
        let links = fetch_homepage_links(&client, &base).await;

        assert_eq!(
            links,
            vec![
                format!("{}/about", server.url()),
                format!("{}/blog", server.url()),
                format!("{}/contact", server.url()),
            ]
        );
    }

    #[tokio::test]
    async fn test_homepage_unreachable_is_empty() {
        let client = build_client().unwrap();
        let links = fetch_homepage_links(&client, "http://127.0.0.1:1/").await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_internal_links_exclude_already_checked() {
        let mut server = mockito::Server::new_async().await;
        let html = r#"<a href="/a">A</a><a href="/b">B</a><a href="c">C</a>"#;
        let _mock = server.mock("GET", "/docs/").with_body(html).create_async().await;

        let page = format!("{}/docs/", server.url());
        let mut checked = HashSet::new();
        checked.insert(format!("{}/a", server.url()));

        let client = build_client().unwrap();
        let links = extract_internal_links(&client, &page, &server.url(), &checked).await;

        assert_eq!(
            links,
            vec![
                format!("{}/b", server.url()),
                format!("{}/docs/c", server.url()),
            ]
        );
    }
}
