// src/url_utils.rs
// =============================================================================
// Small, pure helpers for working with URLs.
//
// Every other module goes through these three functions instead of calling
// the `url` crate directly, so "what counts as a valid link" and "what counts
// as the same site" are decided in exactly one place.
//
// None of these functions do any I/O and none of them return errors:
// failures are logged and turned into `false` / `None`.
// =============================================================================

use url::Url;

// Returns true if `s` parses as an absolute URL with a host
//
// Examples:
//   "https://example.com/page" -> true
//   "/relative/path"           -> false (no scheme)
//   "mailto:me@example.com"    -> false (no host / authority)
pub fn is_valid_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => url.host_str().map_or(false, |host| !host.is_empty()),
        Err(_) => false,
    }
}

// Resolves `relative` against `base` the same way a browser would
//
// If `relative` is already absolute, it is returned (normalized) as-is.
// Returns None when either side cannot be parsed.
//
// Example:
//   resolve_url("https://a.com/x", "/y") -> Some("https://a.com/y")
pub fn resolve_url(base: &str, relative: &str) -> Option<String> {
    let base_url = match Url::parse(base) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Cannot resolve {:?}: invalid base {:?}: {}", relative, base, e);
            return None;
        }
    };

    match base_url.join(relative.trim()) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            tracing::debug!("Cannot resolve {:?} against {}: {}", relative, base, e);
            None
        }
    }
}

// Returns true if both URLs parse and have exactly the same hostname
//
// No normalization happens: "www.a.com" and "a.com" are different sites,
// and so are "a.com" and "blog.a.com". The port and scheme are ignored.
pub fn is_same_domain(base_url: &str, link_url: &str) -> bool {
    let (base, link) = match (Url::parse(base_url), Url::parse(link_url)) {
        (Ok(base), Ok(link)) => (base, link),
        _ => return false,
    };

    match (base.host_str(), link.host_str()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
