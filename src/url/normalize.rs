use url::Url;

/// Returns the canonical form of a URL used for visit deduplication
///
/// Parsing already lowercases the scheme and host, drops default ports and
/// resolves dot segments. On top of that the fragment is removed, since
/// `page#intro` and `page#usage` name the same document on the server.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webgrab::url::canonicalize;
///
/// let url = Url::parse("HTTPS://Example.com:443/a/../b#top").unwrap();
/// assert_eq!(canonicalize(&url).as_str(), "https://example.com/b");
/// ```
pub fn canonicalize(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_fragment(None);
    canonical
}

/// Returns true if the URL uses the http or https scheme
pub fn is_http_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
