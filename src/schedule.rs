// src/schedule.rs
// =============================================================================
// Scheduled jobs, using tokio-cron-scheduler.
//
// - Scan job: runs the full analysis of every configured website
// - Ping job: requests our own public URL so the hosting platform doesn't
//   put the process to sleep (only when BACKEND_URL is set)
//
// A job that fails logs the error and waits for its next tick; it never
// takes the scheduler down.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::analyze::Analyzer;
use crate::config::Config;

/// Start all scheduled jobs
pub async fn start_scheduler(config: &Config, analyzer: Analyzer, client: Client) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .context("failed to create job scheduler")?;

    let websites = Arc::new(config.websites.clone());
    let scan_job = Job::new_async(config.scan_schedule.as_str(), move |_uuid, _lock| {
        let analyzer = analyzer.clone();
        let websites = websites.clone();
        Box::pin(async move {
            tracing::info!("Scheduled scan starting");
            analyzer.analyze_websites(&websites).await;
        })
    })
    .with_context(|| format!("invalid SCAN_SCHEDULE {:?}", config.scan_schedule))?;
    scheduler.add(scan_job).await?;

    match &config.backend_url {
        Some(backend_url) => {
            let backend_url = backend_url.clone();
            let ping_job = Job::new_async(config.ping_schedule.as_str(), move |_uuid, _lock| {
                let client = client.clone();
                let backend_url = backend_url.clone();
                Box::pin(async move {
                    if let Err(e) = ping(&client, &backend_url).await {
                        tracing::error!("Self-ping failed: {:#}", e);
                    }
                })
            })
            .with_context(|| format!("invalid PING_SCHEDULE {:?}", config.ping_schedule))?;
            scheduler.add(ping_job).await?;
        }
        None => tracing::info!("BACKEND_URL not set, self-ping disabled"),
    }

    scheduler.start().await.context("failed to start job scheduler")?;

    tracing::info!(
        "Scheduled tasks started (scan: {:?}, ping: {:?})",
        config.scan_schedule,
        config.backend_url.as_ref().map(|_| config.ping_schedule.as_str())
    );
    Ok(scheduler)
}

// Requests the backend once and logs the answer
pub async fn ping(client: &Client, backend_url: &str) -> Result<u16> {
    let response = client
        .get(backend_url)
        .send()
        .await
        .with_context(|| format!("GET {}", backend_url))?;

    let status = response.status().as_u16();
    tracing::info!("Self-ping {} -> {}", backend_url, status);
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::build_client;
    use crate::mailer::LogMailer;

    fn config(scan_schedule: &str) -> Config {
        Config {
            websites: vec!["https://example.com".to_string()],
            port: 0,
            scan_schedule: scan_schedule.to_string(),
            ping_schedule: "0 */14 * * * *".to_string(),
            backend_url: None,
        }
    }

    #[tokio::test]
    async fn test_ping_reports_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/").with_status(200).create_async().await;

        let client = build_client().unwrap();
        let status = ping(&client, &format!("{}/", server.url())).await.unwrap();

        assert_eq!(status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ping_unreachable_is_error() {
        let client = build_client().unwrap();
        assert!(ping(&client, "http://127.0.0.1:1/").await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_schedule_rejected() {
        let client = build_client().unwrap();
        let analyzer = Analyzer::new(client.clone(), Arc::new(LogMailer));
        let result = start_scheduler(&config("every day please"), analyzer, client).await;
        assert!(result.is_err());
    }
}
