//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the grabber:
//! - Building an HTTP client with the configured user agent and timeout
//! - Single-attempt GET requests
//! - Classifying every failure into a human-readable reason

use crate::config::CrawlConfig;
use reqwest::Client;
use std::time::Duration;

/// Connection establishment is bounded separately from the whole request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered with a 2xx status
    Body {
        /// Raw response body
        content: Vec<u8>,
        /// Content-Type header value, if the server sent one
        content_type: Option<String>,
    },

    /// Network, DNS, TLS, timeout or non-2xx outcome
    Failed {
        /// Error description
        reason: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The run configuration (user agent and request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use webgrab::config::CrawlConfig;
/// use webgrab::crawler::build_http_client;
///
/// let config = CrawlConfig::new("https://example.com/", "mirror").unwrap();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(config.request_timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once
///
/// Redirects are followed by the client. Any outcome other than a 2xx
/// response with a readable body becomes [`FetchResult::Failed`]; this
/// function never returns an error to the caller and never retries.
///
/// | Condition | Reason |
/// |-----------|--------|
/// | HTTP 4xx/5xx | `HTTP 404 Not Found` |
/// | Timeout | `Request timeout` |
/// | Connect/DNS/TLS error | `Connection failed: ...` |
/// | Body read error | the error text |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::Failed {
            reason: format!("HTTP {}", status),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match response.bytes().await {
        Ok(body) => FetchResult::Body {
            content: body.to_vec(),
            content_type,
        },
        Err(e) => classify_error(&e),
    }
}

fn classify_error(error: &reqwest::Error) -> FetchResult {
    let reason = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    FetchResult::Failed { reason }
}
