// src/config.rs
// =============================================================================
// Configuration loaded from environment variables (and a .env file during
// development, via dotenvy).
//
// Two groups:
// - Config: what to scan and when (all optional, with defaults; the site
//   list falls back to DEFAULT_WEBSITES)
// - MailConfig: SMTP credentials, required whenever a report is emailed.
//   A missing value is a startup error; we never run half-configured.
//
// Both are parsed through a lookup function so tests don't have to touch
// the real process environment.
// =============================================================================

use anyhow::{anyhow, Context, Result};

use crate::url_utils::is_valid_url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Websites scanned when WEBSITES is not set
pub const DEFAULT_WEBSITES: &[&str] = &["https://www.rust-lang.org", "https://blog.rust-lang.org"];

/// Every day at 09:00 (UTC)
pub const DEFAULT_SCAN_SCHEDULE: &str = "0 0 9 * * *";

/// Every 14 minutes, inside the idle timeout of typical free hosting tiers
pub const DEFAULT_PING_SCHEDULE: &str = "0 */14 * * * *";

/// Scan and schedule settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root URLs of the websites to scan, in scan order
    pub websites: Vec<String>,
    /// Port for the health check server
    pub port: u16,
    /// Cron expression (with seconds) for the full scan
    pub scan_schedule: String,
    /// Cron expression (with seconds) for the self-ping
    pub ping_schedule: String,
    /// URL the self-ping job requests; no ping job when unset
    pub backend_url: Option<String>,
}

/// Credentials for sending the report email
#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub smtp_host: String,
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

// Hand-written so the password never ends up in a log line
impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("sender", &self.sender)
            .field("password", &"***")
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let websites = match lookup("WEBSITES") {
            Some(raw) => parse_websites(&raw)?,
            None => DEFAULT_WEBSITES.iter().map(|site| site.to_string()).collect(),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            websites,
            port,
            scan_schedule: lookup("SCAN_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_SCAN_SCHEDULE.to_string()),
            ping_schedule: lookup("PING_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_PING_SCHEDULE.to_string()),
            backend_url: lookup("BACKEND_URL").filter(|url| !url.trim().is_empty()),
        })
    }
}

impl MailConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("{} must be set", key))
        };

        Ok(Self {
            smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            sender: required("EMAIL_USER")?,
            password: required("EMAIL_PASS")?,
            recipient: required("RECIPIENT_EMAIL")?,
        })
    }
}

// Parses a comma-separated list of root URLs, rejecting anything that
// isn't an absolute URL
pub fn parse_websites(raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|site| !site.is_empty())
        .map(|site| {
            if is_valid_url(site) {
                Ok(site.to_string())
            } else {
                Err(anyhow!("invalid website URL {:?}", site))
            }
        })
        .collect()
}
