// src/main.rs
// =============================================================================
// This is the entry point of site-sentinel.
//
// What happens here:
// 1. Set up logging to stderr (RUST_LOG controls verbosity)
// 2. Parse command-line arguments using clap
// 3. Load configuration; missing mail credentials stop us right here
// 4. Dispatch to `scan` (one batch, then exit) or `serve` (scheduler + health)
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

mod analyze;
mod checker;
mod cli;
mod config;
mod crawl;
mod health;
mod mailer;
mod report;
mod schedule;
mod url_utils;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analyze::{Analyzer, SiteOutcome};
use cli::{Cli, Commands};
use config::{Config, MailConfig};
use mailer::{LogMailer, Mailer, SmtpMailer};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,site_sentinel=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links (or the server shut down cleanly)
//   Ok(1) = broken links found
//   Ok(2) = at least one site could not be analyzed
//   Err = startup or runtime error
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Scan { sites, dry_run, json } => handle_scan(config, sites, dry_run, json).await,
        Commands::Serve { port } => handle_serve(config, port).await,
    }
}

async fn handle_scan(config: Config, sites: Vec<String>, dry_run: bool, json: bool) -> Result<i32> {
    let websites = if sites.is_empty() {
        config.websites
    } else {
        sites
    };

    if websites.is_empty() {
        return Err(anyhow!("no websites to scan: set WEBSITES or pass them as arguments"));
    }

    let mailer: Arc<dyn Mailer> = if dry_run {
        Arc::new(LogMailer)
    } else {
        Arc::new(SmtpMailer::new(&MailConfig::from_env()?)?)
    };

    let analyzer = Analyzer::new(crawl::build_client()?, mailer);
    let outcomes = analyzer.analyze_websites(&websites).await;

    if json {
        let json_output = serde_json::to_string_pretty(&outcomes_json(&outcomes))?;
        println!("{}", json_output);
    }

    Ok(exit_code(&outcomes))
}

// One JSON object per site: its summary, or the error that stopped it
fn outcomes_json(outcomes: &[SiteOutcome]) -> serde_json::Value {
    outcomes
        .iter()
        .map(|outcome| match outcome {
            Ok(summary) => serde_json::json!(summary),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        })
        .collect()
}

async fn handle_serve(config: Config, port: Option<u16>) -> Result<i32> {
    if config.websites.is_empty() {
        return Err(anyhow!("no websites configured: set WEBSITES"));
    }

    let mail_config = MailConfig::from_env()?;
    tracing::info!("Reports will be sent to {}", mail_config.recipient);

    let client = crawl::build_client()?;
    let analyzer = Analyzer::new(client.clone(), Arc::new(SmtpMailer::new(&mail_config)?));

    let mut scheduler = schedule::start_scheduler(&config, analyzer, client).await?;
    let port = port.unwrap_or(config.port);

    tokio::select! {
        result = health::serve(port) => result?,
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            tracing::info!("Shutting down");
        }
    }

    scheduler
        .shutdown()
        .await
        .context("failed to stop job scheduler")?;
    Ok(0)
}

fn exit_code(outcomes: &[SiteOutcome]) -> i32 {
    if outcomes.iter().any(|outcome| outcome.is_err()) {
        2
    } else if outcomes
        .iter()
        .flatten()
        .any(|summary| !summary.broken_links.is_empty())
    {
        1
    } else {
        0
    }
}
