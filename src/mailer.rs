// src/mailer.rs
// =============================================================================
// Delivery of finished reports.
//
// The orchestrator only knows about the `Mailer` trait, so the delivery
// mechanism can be swapped:
// - SmtpMailer: real delivery over SMTP (STARTTLS) using lettre
// - LogMailer: writes the report to the log instead (used by --dry-run)
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::report::{report_subject, Report};

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one site's report
    async fn send_report(&self, website_url: &str, report: &Report) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from: Mailbox = config
            .sender
            .parse()
            .with_context(|| format!("EMAIL_USER is not a valid address: {}", config.sender))?;
        let to: Mailbox = config
            .recipient
            .parse()
            .with_context(|| format!("RECIPIENT_EMAIL is not a valid address: {}", config.recipient))?;

        let credentials = Credentials::new(config.sender.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .with_context(|| format!("invalid SMTP host {}", config.smtp_host))?
            .credentials(credentials)
            .build();

        Ok(Self { transport, from, to })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_report(&self, website_url: &str, report: &Report) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(report_subject(website_url))
            .multipart(MultiPart::alternative_plain_html(
                report.text.clone(),
                report.html.clone(),
            ))
            .context("failed to build report email")?;

        self.transport
            .send(email)
            .await
            .context("SMTP delivery failed")?;

        tracing::info!("Report for {} emailed to {}", website_url, self.to);
        Ok(())
    }
}

// Logs reports instead of sending them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_report(&self, website_url: &str, report: &Report) -> Result<()> {
        tracing::info!("{}", dry_run_line(website_url, report));
        Ok(())
    }
}

// Subject only: the analyzer has already logged the report text
fn dry_run_line(website_url: &str, report: &Report) -> String {
    format!(
        "[dry run] would send {:?} ({} bytes of HTML)",
        report_subject(website_url),
        report.html.len()
    )
}
