// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes one GET request per URL (no retries)
// - Classifies the outcome: healthy, bad status, unreachable, invalid URL
// - Runs checks in fixed-size concurrent batches with a delay per check,
//   so we never hammer the site we're scanning
//
// Results are accumulated into collections owned by the caller: the list of
// broken links and the set of URLs already checked during this run.
// =============================================================================

use futures::future::join_all;
use reqwest::Client;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{CONCURRENT_REQUESTS, GENERIC_SOURCE, REQUEST_DELAY};
use crate::url_utils::is_valid_url;

/// URLs already dispatched for checking during one run of one site
///
/// A BTreeSet keeps the report's "checked URLs" listing sorted.
pub type CheckedUrls = BTreeSet<String>;

// Why a link counts as broken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// The server answered, but with a status outside 200..400
    Http(u16),
    /// The string isn't an absolute URL; no request was made
    InvalidUrl,
    /// No response at all (DNS failure, refused connection, timeout)
    Unreachable,
}

// Renders the status the way it appears in reports:
// "404", "Invalid URL" or "Unreachable"
impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Http(code) => write!(f, "{}", code),
            LinkStatus::InvalidUrl => f.write_str("Invalid URL"),
            LinkStatus::Unreachable => f.write_str("Unreachable"),
        }
    }
}

// Numeric codes serialize as numbers, the two sentinels as their labels
impl Serialize for LinkStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LinkStatus::Http(code) => serializer.serialize_u16(*code),
            other => serializer.collect_str(other),
        }
    }
}

// One broken link found during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    /// The URL that failed
    pub url: String,
    /// How it failed
    pub status: LinkStatus,
    /// Where the link was found
    pub source: String,
}

impl BrokenLink {
    fn new(url: &str, status: LinkStatus) -> Self {
        BrokenLink {
            url: url.to_string(),
            status,
            source: GENERIC_SOURCE.to_string(),
        }
    }
}

// Checks every URL in `urls`, appending failures to `broken_links`
//
// Parameters:
//   client: shared HTTP client (carries the per-request timeout)
//   urls: URLs to check, in order
//   website_url: the site being scanned (only used for logging)
//   broken_links: receives one BrokenLink per failing URL
//   checked_urls: URLs already checked; updated as we go
//
// URLs already in `checked_urls` are skipped. Invalid URLs are recorded
// without making a request.
//
// Batches of CONCURRENT_REQUESTS run one after another. Inside a batch the
// checks race, and each one waits REQUEST_DELAY after finishing before its
// slot counts as done.
pub async fn check_all_links(
    client: &Client,
    urls: &[String],
    website_url: &str,
    broken_links: &mut Vec<BrokenLink>,
    checked_urls: &mut CheckedUrls,
) {
    let total = urls.len();
    let processed = AtomicUsize::new(0);

    tracing::info!("Checking {} URL(s) for {}", total, website_url);

    for batch in urls.chunks(CONCURRENT_REQUESTS) {
        let mut to_request = Vec::with_capacity(batch.len());

        for url in batch {
            // insert returns false if the URL was already there
            if !checked_urls.insert(url.clone()) {
                processed.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            if !is_valid_url(url) {
                tracing::debug!("Invalid URL: {:?}", url);
                broken_links.push(BrokenLink::new(url, LinkStatus::InvalidUrl));
                processed.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            to_request.push(url.as_str());
        }

        let processed = &processed;
        let checks = to_request.into_iter().map(|url| async move {
            let status = check_single_link(client, url).await;

            tokio::time::sleep(REQUEST_DELAY).await;

            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::info!(
                "Progress: {:.1}% ({}/{})",
                done as f64 * 100.0 / total as f64,
                done,
                total
            );

            (url, status)
        });

        for (url, status) in join_all(checks).await {
            if let Some(status) = status {
                tracing::warn!("Broken link: {} ({})", url, status);
                broken_links.push(BrokenLink::new(url, status));
            }
        }
    }

    tracing::info!(
        "Finished checking {}: {} broken out of {} checked",
        website_url,
        broken_links.len(),
        checked_urls.len()
    );
}

// Checks a single link
//
// Returns: None if the link is healthy, Some(status) if it's broken
async fn check_single_link(client: &Client, url: &str) -> Option<LinkStatus> {
    match client.get(url).send().await {
        Ok(response) => classify_status(response.status().as_u16()),
        Err(e) => {
            tracing::debug!("Request to {} failed: {}", url, e);
            // Some errors still carry the response status
            match e.status() {
                Some(status) => classify_status(status.as_u16()),
                None => Some(LinkStatus::Unreachable),
            }
        }
    }
}

// HTTP status codes:
// - 200-299: Success
// - 300-399: Redirect (still a working link)
// - anything else: broken
fn classify_status(code: u16) -> Option<LinkStatus> {
    if (200..400).contains(&code) {
        None
    } else {
        Some(LinkStatus::Http(code))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why batches instead of buffer_unordered?
//    - buffer_unordered(N) starts a new request as soon as any slot frees up
//    - Here a whole batch must finish before the next one starts, which makes
//      the request rate easy to reason about: at most 10 requests in flight,
//      and every slot also waits REQUEST_DELAY
//    - join_all runs the futures of one batch concurrently and waits for all
//
// 2. Why an AtomicUsize for the progress counter?
//    - The checks in a batch all borrow the same counter
//    - A plain `&mut usize` can only be borrowed by one of them at a time
//    - AtomicUsize can be updated through a shared `&` reference
//
// 3. Why does check_all_links take `&mut` collections instead of returning?
//    - The caller owns the broken-link list and the checked set for the
//      whole run of one site; we only add to them
//    - Nothing global or static is involved, so two sites can never mix
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::build_client;

    async fn check(urls: &[String]) -> (Vec<BrokenLink>, CheckedUrls) {
        let client = build_client().unwrap();
        let mut broken = Vec::new();
        let mut checked = CheckedUrls::new();
        check_all_links(&client, urls, "https://example.com", &mut broken, &mut checked).await;
        (broken, checked)
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(200), None);
        assert_eq!(classify_status(204), None);
        assert_eq!(classify_status(301), None);
        assert_eq!(classify_status(399), None);
        assert_eq!(classify_status(400), Some(LinkStatus::Http(400)));
        assert_eq!(classify_status(404), Some(LinkStatus::Http(404)));
        assert_eq!(classify_status(500), Some(LinkStatus::Http(500)));
        assert_eq!(classify_status(199), Some(LinkStatus::Http(199)));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(LinkStatus::Http(404).to_string(), "404");
        assert_eq!(LinkStatus::InvalidUrl.to_string(), "Invalid URL");
        assert_eq!(LinkStatus::Unreachable.to_string(), "Unreachable");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&LinkStatus::Http(404)).unwrap(), "404");
        assert_eq!(
            serde_json::to_string(&LinkStatus::Unreachable).unwrap(),
            "\"Unreachable\""
        );
    }

    #[tokio::test]
    async fn test_not_found_is_broken() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/gone").with_status(404).create_async().await;

        let url = format!("{}/gone", server.url());
        let (broken, checked) = check(&[url.clone()]).await;

        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].url, url);
        assert_eq!(broken[0].status, LinkStatus::Http(404));
        assert_eq!(broken[0].source, GENERIC_SOURCE);
        assert!(checked.contains(&url));
    }

    #[tokio::test]
    async fn test_healthy_link_not_recorded() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/ok").with_status(200).create_async().await;

        let (broken, checked) = check(&[format!("{}/ok", server.url())]).await;
        assert!(broken.is_empty());
        assert_eq!(checked.len(), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let (broken, _) = check(&["http://127.0.0.1:1/".to_string()]).await;
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].status, LinkStatus::Unreachable);
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", mockito::Matcher::Any).expect(0).create_async().await;

        let (broken, _) = check(&["not a url".to_string()]).await;
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].url, "not a url");
        assert_eq!(broken[0].status, LinkStatus::InvalidUrl);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_duplicates_checked_once() {
        let mut server = mockito::Server::new_async().await;
        let url = format!("{}/dup", server.url());
        let mock = server
            .mock("GET", "/dup")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let (broken, checked) = check(&[url.clone(), url.clone()]).await;
        assert_eq!(broken.len(), 1);
        assert_eq!(checked.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_already_checked_urls_skipped() {
        let mut server = mockito::Server::new_async().await;
        let url = format!("{}/seen", server.url());
        let mock = server.mock("GET", "/seen").expect(0).create_async().await;

        let client = build_client().unwrap();
        let mut broken = Vec::new();
        let mut checked = CheckedUrls::new();
        checked.insert(url.clone());

        check_all_links(&client, &[url], "https://example.com", &mut broken, &mut checked).await;
        assert!(broken.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_repeat_runs_classify_the_same() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", mockito::Matcher::Regex(r"^/ok/\d+$".to_string()))
            .with_status(200)
            .create_async()
            .await;
        let _bad = server.mock("GET", "/bad").with_status(503).create_async().await;

        // More URLs than one batch, so several batches run
        let mut urls = Vec::new();
        for i in 0..CONCURRENT_REQUESTS {
            urls.push(format!("{}/ok/{}", server.url(), i));
        }
        urls.push(format!("{}/bad", server.url()));
        urls.push("::invalid::".to_string());

        let (first, _) = check(&urls).await;
        let (second, _) = check(&urls).await;

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_batches_run_one_after_another() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Regex(r"^/page/\d+$".to_string()))
            .with_status(200)
            .expect(2 * CONCURRENT_REQUESTS + 1)
            .create_async()
            .await;

        // Two full batches plus one URL in a third
        let urls: Vec<String> = (0..2 * CONCURRENT_REQUESTS + 1)
            .map(|i| format!("{}/page/{}", server.url(), i))
            .collect();

        let started = std::time::Instant::now();
        let (broken, checked) = check(&urls).await;
        let elapsed = started.elapsed();

        // Each batch waits for its slowest check, which includes the delay
        assert!(elapsed >= REQUEST_DELAY * 3, "three batches took only {:?}", elapsed);
        assert!(broken.is_empty());
        assert_eq!(checked.len(), urls.len());
        mock.assert_async().await;
    }
}
