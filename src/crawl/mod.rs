// src/crawl/mod.rs
// =============================================================================
// This module discovers the pages of a website.
//
// Submodules:
// - fetch: the shared HTTP client and "GET a page as text" helper
// - html: same-domain anchor extraction from HTML
// - sitemap: sitemap / sitemap-index fetching with recursive expansion
// - homepage: homepage crawl fallback and per-page link extraction
// - collector: the policy tying the above together for one site
//
// The crawl is deliberately bounded: one site, one level of expansion, and
// never more than MAX_URLS_PER_SITE URLs.
// =============================================================================

use std::time::Duration;

mod collector;
mod fetch;
mod homepage;
mod html;
mod sitemap;

pub use collector::collect_links;
pub use fetch::build_client;

/// Upper bound on URLs collected (and so checked) for one site
pub const MAX_URLS_PER_SITE: usize = 500;

/// Timeout applied to every single HTTP request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
