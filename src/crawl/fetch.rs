// src/crawl/fetch.rs
// =============================================================================
// The shared HTTP plumbing used by every part of the crawl.
//
// One `reqwest::Client` is built per run and cloned into every fetcher and
// into the link checker. Cloning is cheap (it's an Arc internally) and lets
// all requests share one connection pool.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use super::REQUEST_TIMEOUT;

// Builds the HTTP client used for the whole run
//
// Every request made with it gives up after REQUEST_TIMEOUT.
// There are no retries and no custom headers.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}

// Fetches a document and returns its body as text
//
// Non-2xx responses are treated as errors, the same as network failures:
// callers only ever want the body of a page that actually exists.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP {}", response.status()));
    }

    let body = response.text().await?;
    Ok(body)
}
