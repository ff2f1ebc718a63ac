// src/analyze.rs
// =============================================================================
// The end-to-end pipeline for each configured website:
//
//   collect links -> check them -> build the report -> log it -> email it
//
// Websites are processed strictly one after another, in configured order.
// Each site runs in its own task so a panic inside one site's pipeline is
// captured as that site's error instead of taking the whole batch down.
// Nothing is shared between sites: every run starts with a fresh broken-link
// list and a fresh checked set.
// =============================================================================

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::checker::{check_all_links, BrokenLink, CheckedUrls};
use crate::crawl::collect_links;
use crate::mailer::Mailer;
use crate::report::generate_report;
use crate::url_utils::is_valid_url;

/// What one site's run produced
#[derive(Debug, Clone, Serialize)]
pub struct SiteSummary {
    pub website_url: String,
    /// Number of URLs checked
    pub checked: usize,
    pub broken_links: Vec<BrokenLink>,
    /// Set when the report could not be delivered; the scan itself still counts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_error: Option<String>,
}

/// Why a site produced no summary at all
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("invalid website URL {0:?}")]
    InvalidWebsite(String),

    #[error("analysis of {site} aborted: {message}")]
    Aborted { site: String, message: String },
}

pub type SiteOutcome = Result<SiteSummary, SiteError>;

#[derive(Clone)]
pub struct Analyzer {
    client: Client,
    mailer: Arc<dyn Mailer>,
}

impl Analyzer {
    pub fn new(client: Client, mailer: Arc<dyn Mailer>) -> Self {
        Self { client, mailer }
    }

    // Runs the whole pipeline for one website
    //
    // Per-URL and per-page problems never make this fail: they end up as
    // broken-link records or log lines. A mail failure is logged and kept
    // in the summary.
    pub async fn analyze_website(&self, website_url: &str) -> SiteOutcome {
        if !is_valid_url(website_url) {
            return Err(SiteError::InvalidWebsite(website_url.to_string()));
        }

        tracing::info!("Analyzing {}", website_url);

        let links = collect_links(&self.client, website_url).await;

        let mut broken_links = Vec::new();
        let mut checked_urls = CheckedUrls::new();
        check_all_links(
            &self.client,
            &links,
            website_url,
            &mut broken_links,
            &mut checked_urls,
        )
        .await;

        let report = generate_report(website_url, &broken_links, &checked_urls, Utc::now());
        tracing::info!("Report for {}:\n{}", website_url, report.text);

        let mail_error = match self.mailer.send_report(website_url, &report).await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("Failed to send report for {}: {:#}", website_url, e);
                Some(format!("{:#}", e))
            }
        };

        Ok(SiteSummary {
            website_url: website_url.to_string(),
            checked: checked_urls.len(),
            broken_links,
            mail_error,
        })
    }

    // Analyzes every website in order, one at a time
    //
    // Returns one outcome per website, in the same order. A failed site is
    // logged and the batch moves on to the next one.
    pub async fn analyze_websites(&self, websites: &[String]) -> Vec<SiteOutcome> {
        tracing::info!("Starting analysis of {} website(s)", websites.len());

        let mut outcomes = Vec::with_capacity(websites.len());

        for website_url in websites {
            let analyzer = self.clone();
            let site = website_url.clone();

            let outcome = match tokio::spawn(async move { analyzer.analyze_website(&site).await }).await {
                Ok(outcome) => outcome,
                Err(e) => Err(SiteError::Aborted {
                    site: website_url.clone(),
                    message: e.to_string(),
                }),
            };

            match &outcome {
                Ok(summary) => tracing::info!(
                    "Finished {}: {} checked, {} broken",
                    summary.website_url,
                    summary.checked,
                    summary.broken_links.len()
                ),
                Err(e) => tracing::error!("{}", e),
            }

            outcomes.push(outcome);
        }

        let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();
        tracing::info!(
            "Analysis complete: {} website(s), {} failed",
            outcomes.len(),
            failed
        );

        outcomes
    }
}
