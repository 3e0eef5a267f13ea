use std::fmt;
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webgrab::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Name of the directory a crawl run writes into
///
/// Derived from the seed URL's host with a leading `www.` removed. A
/// non-default port stays part of the identity so that two servers on the
/// same host do not share a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteIdentity(String);

impl SiteIdentity {
    /// Derives the site identity of a URL
    ///
    /// Returns None if the URL has no host.
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use webgrab::url::SiteIdentity;
    ///
    /// let url = Url::parse("https://www.example.com/about").unwrap();
    /// let site = SiteIdentity::from_url(&url).unwrap();
    /// assert_eq!(site.as_str(), "example.com");
    /// ```
    pub fn from_url(url: &Url) -> Option<Self> {
        let domain = extract_domain(url)?;
        let host = domain
            .strip_prefix("www.")
            .map(str::to_string)
            .unwrap_or(domain);

        // Url::port() is None for the scheme's default port
        let identity = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        };

        Some(Self(identity))
    }

    /// Returns the identity as a path component
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
