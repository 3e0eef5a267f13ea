//! Crawler module for fetching and expanding pages
//!
//! This module contains the core crawling logic, including:
//! - Single-attempt HTTP fetching
//! - HTML link extraction
//! - The visited registry guarding exactly-once admission
//! - Depth-bounded frontier scheduling
//! - The bounded worker pool and run lifecycle

mod coordinator;
mod fetcher;
mod parser;
mod registry;
mod scheduler;

pub use coordinator::Grabber;
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use parser::extract_links;
pub use registry::VisitedRegistry;
pub use scheduler::{CrawlTask, Rejection, Scheduler};
