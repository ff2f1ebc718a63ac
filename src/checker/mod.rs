// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - http: Makes HTTP requests to check if links are alive and records the
//   broken ones
//
// This file (mod.rs) is the module root - it holds the tuning constants and
// exports the public API that other parts of our application can use.
// =============================================================================

use std::time::Duration;

mod http;

// Re-export public items from submodules
// This lets users write `checker::check_all_links()` instead of
// `checker::http::check_all_links()`
pub use http::{check_all_links, BrokenLink, CheckedUrls, LinkStatus};

/// How many checks run at once inside one batch
pub const CONCURRENT_REQUESTS: usize = 10;

/// Pause after each finished check before its batch slot is released
pub const REQUEST_DELAY: Duration = Duration::from_millis(200);

/// Source label for links found via a sitemap or page expansion
pub const GENERIC_SOURCE: &str = "Sitemap or Inner Page";
