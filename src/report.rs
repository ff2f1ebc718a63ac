// src/report.rs
// =============================================================================
// Turns the results of one site's scan into an email-ready report.
//
// Two renderings of the same content are produced:
// - html: a styled table for mail clients that show HTML
// - text: a plain-text fallback (also what we write to the log)
//
// Both contain the site, when the report was generated, the summary counts,
// every broken link (url / status / source), and every URL that was checked.
// =============================================================================

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::checker::{BrokenLink, CheckedUrls};

/// Shown instead of an empty table when nothing is broken
pub const NO_BROKEN_LINKS: &str = "No broken links were found.";

// The rendered report for one website
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub html: String,
    pub text: String,
}

// Email subject line for a site's report
pub fn report_subject(website_url: &str) -> String {
    format!("Broken Links Report for {}", website_url)
}

// Renders the report
//
// The output depends only on the arguments, so passing the same
// `generated_at` always gives the same report.
pub fn generate_report(
    website_url: &str,
    broken_links: &[BrokenLink],
    checked_urls: &CheckedUrls,
    generated_at: DateTime<Utc>,
) -> Report {
    let timestamp = generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();

    Report {
        html: render_html(website_url, broken_links, checked_urls, &timestamp),
        text: render_text(website_url, broken_links, checked_urls, &timestamp),
    }
}

// `write!` into a String can't fail, so its Result is ignored throughout
fn render_html(
    website_url: &str,
    broken_links: &[BrokenLink],
    checked_urls: &CheckedUrls,
    timestamp: &str,
) -> String {
    let mut html = String::new();
    let site = escape_html(website_url);

    let _ = write!(
        html,
        "<html><body style=\"font-family: Arial, sans-serif;\">\
         <h2>Broken Links Report for {site}</h2>\
         <p><strong>Generated:</strong> {timestamp}</p>\
         <p><strong>Total URLs checked:</strong> {checked}<br>\
         <strong>Broken links found:</strong> {broken}</p>",
        site = site,
        timestamp = timestamp,
        checked = checked_urls.len(),
        broken = broken_links.len(),
    );

    if broken_links.is_empty() {
        let _ = write!(html, "<p style=\"color: green;\">{}</p>", NO_BROKEN_LINKS);
    } else {
        html.push_str(
            "<table border=\"1\" cellpadding=\"6\" cellspacing=\"0\" style=\"border-collapse: collapse;\">\
             <tr style=\"background-color: #f2f2f2;\"><th>URL</th><th>Status</th><th>Found On</th></tr>",
        );
        for link in broken_links {
            let url = escape_html(&link.url);
            let _ = write!(
                html,
                "<tr><td><a href=\"{url}\">{url}</a></td><td style=\"color: red;\">{status}</td><td>{source}</td></tr>",
                url = url,
                status = link.status,
                source = escape_html(&link.source),
            );
        }
        html.push_str("</table>");
    }

    let _ = write!(html, "<h3>All Checked URLs ({})</h3><ul>", checked_urls.len());
    for url in checked_urls {
        let _ = write!(html, "<li>{}</li>", escape_html(url));
    }
    html.push_str("</ul></body></html>");

    html
}

fn render_text(
    website_url: &str,
    broken_links: &[BrokenLink],
    checked_urls: &CheckedUrls,
    timestamp: &str,
) -> String {
    let mut text = String::new();

    let _ = writeln!(text, "Broken Links Report for {}", website_url);
    let _ = writeln!(text, "Generated: {}", timestamp);
    let _ = writeln!(text);
    let _ = writeln!(text, "Total URLs checked: {}", checked_urls.len());
    let _ = writeln!(text, "Broken links found: {}", broken_links.len());
    let _ = writeln!(text);

    if broken_links.is_empty() {
        let _ = writeln!(text, "{}", NO_BROKEN_LINKS);
    } else {
        let _ = writeln!(text, "Broken links:");
        for (i, link) in broken_links.iter().enumerate() {
            let _ = writeln!(text, "{}. {}", i + 1, link.url);
            let _ = writeln!(text, "   Status: {}", link.status);
            let _ = writeln!(text, "   Found on: {}", link.source);
        }
    }

    let _ = writeln!(text);
    let _ = writeln!(text, "All checked URLs ({}):", checked_urls.len());
    for url in checked_urls {
        let _ = writeln!(text, "- {}", url);
    }

    text
}

// Minimal escaping for text placed inside HTML elements and attributes
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{LinkStatus, GENERIC_SOURCE};
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn checked(urls: &[&str]) -> CheckedUrls {
        urls.iter().map(|u| u.to_string()).collect()
    }

    fn broken(url: &str, status: LinkStatus) -> BrokenLink {
        BrokenLink {
            url: url.to_string(),
            status,
            source: GENERIC_SOURCE.to_string(),
        }
    }

    #[test]
    fn test_no_broken_links_message() {
        let report = generate_report(
            "https://example.com",
            &[],
            &checked(&["https://example.com/a"]),
            fixed_time(),
        );

        assert!(report.html.contains("No broken links were found."));
        assert!(!report.html.contains("<table"));
        assert!(report.text.contains("No broken links were found."));
    }

    #[test]
    fn test_broken_links_listed() {
        let links = vec![
            broken("https://example.com/missing", LinkStatus::Http(404)),
            broken("https://example.com/down", LinkStatus::Unreachable),
            broken("bad url", LinkStatus::InvalidUrl),
        ];
        let report = generate_report(
            "https://example.com",
            &links,
            &checked(&["https://example.com/missing", "https://example.com/down", "bad url"]),
            fixed_time(),
        );

        assert!(report.html.contains("<table"));
        assert!(report.html.contains(">404<"));
        assert!(report.html.contains(">Unreachable<"));
        assert!(report.html.contains(">Invalid URL<"));
        assert!(!report.html.contains(NO_BROKEN_LINKS));

        assert!(report.text.contains("1. https://example.com/missing"));
        assert!(report.text.contains("   Status: 404"));
        assert!(report.text.contains("   Status: Unreachable"));
        assert!(report.text.contains("   Found on: Sitemap or Inner Page"));
        assert!(report.text.contains("Broken links found: 3"));
    }

    #[test]
    fn test_header_and_checked_listing() {
        let report = generate_report(
            "https://example.com",
            &[],
            &checked(&["https://example.com/b", "https://example.com/a"]),
            fixed_time(),
        );

        assert!(report.text.starts_with("Broken Links Report for https://example.com\n"));
        assert!(report.text.contains("Generated: 2024-05-01 09:30:00 UTC"));
        assert!(report.text.contains("Total URLs checked: 2"));

        // Listing is sorted
        let a = report.text.find("- https://example.com/a").unwrap();
        let b = report.text.find("- https://example.com/b").unwrap();
        assert!(a < b);

        assert!(report.html.contains("<li>https://example.com/a</li>"));
    }

    #[test]
    fn test_deterministic() {
        let urls = checked(&["https://example.com/"]);
        let first = generate_report("https://example.com", &[], &urls, fixed_time());
        let second = generate_report("https://example.com", &[], &urls, fixed_time());
        assert_eq!(first, second);
    }

    #[test]
    fn test_html_escaped() {
        let links = vec![broken("https://example.com/?a=<b>&c", LinkStatus::Http(500))];
        let report = generate_report("https://example.com", &links, &CheckedUrls::new(), fixed_time());
        assert!(report.html.contains("https://example.com/?a=&lt;b&gt;&amp;c"));
        assert!(!report.html.contains("<b>&c"));
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            report_subject("https://example.com"),
            "Broken Links Report for https://example.com"
        );
    }
}
