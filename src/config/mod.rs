//! Configuration module for webgrab
//!
//! Settings come from an optional TOML file with every key defaulted. A
//! [`CrawlConfig`] is then built from the settings and a seed URL, and stays
//! immutable for the whole run.
//!
//! # Example
//!
//! ```no_run
//! use webgrab::config::{load_settings, CrawlConfig};
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("webgrab.toml")).unwrap();
//! let config = CrawlConfig::from_settings("https://example.com/", &settings).unwrap();
//! println!("Grabber will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlerSettings, OutputSettings, Settings, UserAgentSettings,
    DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_MAX_DEPTH, DEFAULT_OUTPUT_DIRECTORY,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_settings, parse_settings};
