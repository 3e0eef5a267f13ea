//! URL handling module for webgrab
//!
//! This module provides seed URL validation, the canonical form used for
//! visit deduplication, and the site identity used to namespace output.

mod domain;
mod normalize;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, SiteIdentity};
pub use normalize::{canonicalize, is_http_scheme};

/// Parses and validates a seed URL
///
/// The seed must be a non-empty absolute HTTP(S) URL with a host. Surrounding
/// whitespace is ignored, the same way a front-end input field would trim it.
///
/// # Arguments
///
/// * `input` - The raw seed URL as entered by the user
///
/// # Returns
///
/// * `Ok(Url)` - The parsed seed
/// * `Err(UrlError)` - The seed is empty, malformed, not HTTP(S), or has no host
///
/// # Examples
///
/// ```
/// use webgrab::url::parse_seed_url;
///
/// let seed = parse_seed_url("  https://example.com/ ").unwrap();
/// assert_eq!(seed.as_str(), "https://example.com/");
///
/// assert!(parse_seed_url("").is_err());
/// assert!(parse_seed_url("ftp://example.com/").is_err());
/// ```
pub fn parse_seed_url(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url =
        Url::parse(trimmed).map_err(|e| UrlError::Parse(format!("'{}': {}", trimmed, e)))?;

    if !is_http_scheme(&url) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
