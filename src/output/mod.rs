//! Output module for everything a crawl reports outward
//!
//! This module handles:
//! - The status stream consumed by the front-end
//! - Per-run statistics and their printed summary

pub mod stats;
mod status;

pub use stats::{print_statistics, CrawlStatistics, RunStatistics};
pub use status::{status_channel, StatusEvent, StatusReceiver, StatusSender};
