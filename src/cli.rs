// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Two modes:
// - scan: run the whole batch once, right now, and exit
// - serve: long-running process with the cron jobs and the health server
// =============================================================================

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "site-sentinel",
    version,
    about = "Scans websites for broken links and emails a report",
    long_about = "site-sentinel discovers the pages of each configured website (sitemap first, \
                  homepage crawl as a fallback), checks every link and emails a broken-link report. \
                  Configuration comes from environment variables or a .env file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan websites once and exit
    ///
    /// Example: site-sentinel scan https://example.com --dry-run
    Scan {
        /// Website root URLs to scan (defaults to the WEBSITES variable)
        sites: Vec<String>,

        /// Log the reports instead of emailing them
        ///
        /// No mail credentials are needed in this mode.
        #[arg(long)]
        dry_run: bool,

        /// Print the per-site results as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Run the scheduled scan and self-ping jobs plus the health server
    Serve {
        /// Port for the health server (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}
