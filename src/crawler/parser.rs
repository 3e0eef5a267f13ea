//! HTML link extraction
//!
//! This module collects the URLs a mirrored page depends on or links to:
//! - `<a href>` anchors
//! - `<link rel="stylesheet" href>` stylesheets
//! - `<script src>` scripts
//! - `<img src>` images

use crate::url::is_http_scheme;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts the absolute URLs referenced by an HTML document
///
/// Parsing is permissive: malformed markup yields whatever elements the
/// parser recovered, never an error. Attribute values are resolved against
/// `page_url` with standard URL joining, so relative, fragment-only and
/// protocol-relative references all work. Results whose scheme is not HTTP(S)
/// (`mailto:`, `javascript:`, `data:`, ...) are dropped.
///
/// # Arguments
///
/// * `html` - The raw document bytes (decoded as UTF-8, lossily)
/// * `page_url` - The URL the document was fetched from
///
/// # Returns
///
/// The set of absolute URLs found, empty if there are none
///
/// # Example
///
/// ```
/// use url::Url;
/// use webgrab::crawler::extract_links;
///
/// let html = br#"<a href="/about">About</a><img src="logo.png">"#;
/// let page = Url::parse("https://example.com/index.html").unwrap();
/// let links = extract_links(html, &page);
///
/// assert!(links.contains(&Url::parse("https://example.com/about").unwrap()));
/// assert!(links.contains(&Url::parse("https://example.com/logo.png").unwrap()));
/// ```
pub fn extract_links(html: &[u8], page_url: &Url) -> BTreeSet<Url> {
    let text = String::from_utf8_lossy(html);
    let document = Html::parse_document(&text);
    let mut links = BTreeSet::new();

    collect(&document, "a[href]", "href", page_url, &mut links, |_| true);
    collect(
        &document,
        "link[href]",
        "href",
        page_url,
        &mut links,
        is_stylesheet,
    );
    collect(&document, "script[src]", "src", page_url, &mut links, |_| true);
    collect(&document, "img[src]", "src", page_url, &mut links, |_| true);

    links
}

/// Resolves `attr` of every element matching `selector` that passes `filter`
fn collect(
    document: &Html,
    selector: &str,
    attr: &str,
    page_url: &Url,
    links: &mut BTreeSet<Url>,
    filter: impl Fn(&ElementRef) -> bool,
) {
    let Ok(selector) = Selector::parse(selector) else {
        return;
    };

    for element in document.select(&selector).filter(|e| filter(e)) {
        if let Some(url) = element
            .value()
            .attr(attr)
            .and_then(|value| resolve_link(value, page_url))
        {
            links.insert(url);
        }
    }
}

/// Returns true if the element's `rel` token list contains `stylesheet`
fn is_stylesheet(element: &ElementRef) -> bool {
    element
        .value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
        .unwrap_or(false)
}

/// Resolves an attribute value to an absolute HTTP(S) URL
///
/// Returns None for empty values, values that fail to join, and non-HTTP(S)
/// results.
fn resolve_link(value: &str, page_url: &Url) -> Option<Url> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    page_url
        .join(value)
        .ok()
        .filter(|absolute| is_http_scheme(absolute))
}
