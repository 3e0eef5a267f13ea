//! Per-run statistics
//!
//! Workers bump atomic counters while the run is active; the front-end reads
//! a [`CrawlStatistics`] snapshot at any time.

use crate::state::CrawlState;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Live counters of a crawl run
#[derive(Debug)]
pub struct RunStatistics {
    started_at: DateTime<Utc>,
    finished_at: Mutex<Option<DateTime<Utc>>>,
    pages_grabbed: AtomicU64,
    pages_failed: AtomicU64,
    bytes_written: AtomicU64,
    links_discovered: AtomicU64,
}

impl RunStatistics {
    /// Starts counting from now
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: Mutex::new(None),
            pages_grabbed: AtomicU64::new(0),
            pages_failed: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            links_discovered: AtomicU64::new(0),
        }
    }

    /// Records a persisted page of `bytes` bytes
    pub fn record_grabbed(&self, bytes: usize) {
        self.pages_grabbed.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Records a failed fetch
    pub fn record_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records links extracted from a page
    pub fn record_links(&self, count: usize) {
        self.links_discovered.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Stamps the finish time
    pub fn mark_finished(&self) {
        let mut finished = self.finished_at.lock().unwrap_or_else(PoisonError::into_inner);
        finished.get_or_insert_with(Utc::now);
    }

    /// Takes a snapshot of the counters
    pub fn snapshot(&self, state: CrawlState, pages_admitted: usize) -> CrawlStatistics {
        CrawlStatistics {
            state,
            started_at: self.started_at,
            finished_at: *self.finished_at.lock().unwrap_or_else(PoisonError::into_inner),
            pages_admitted: pages_admitted as u64,
            pages_grabbed: self.pages_grabbed.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
        }
    }
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Phase of the run when the snapshot was taken
    pub state: CrawlState,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run ended, if it has
    pub finished_at: Option<DateTime<Utc>>,

    /// URLs admitted into the run
    pub pages_admitted: u64,

    /// Pages fetched and persisted
    pub pages_grabbed: u64,

    /// Fetches that failed
    pub pages_failed: u64,

    /// Total bytes written to disk
    pub bytes_written: u64,

    /// Links extracted from HTML pages (before deduplication)
    pub links_discovered: u64,
}

impl CrawlStatistics {
    /// Wall-clock duration of the run, if it has finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Grab Statistics ===\n");

    println!("Run:");
    println!("  State: {}", stats.state);
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("Pages:");
    println!("  Admitted: {}", stats.pages_admitted);
    println!("  Grabbed: {}", stats.pages_grabbed);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Links found: {}", stats.links_discovered);
    println!("  Bytes written: {}", stats.bytes_written);
    println!();

    let attempted = stats.pages_grabbed + stats.pages_failed;
    let success_rate = if attempted > 0 {
        (stats.pages_grabbed as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} fetches succeeded)",
        success_rate, stats.pages_grabbed, attempted
    );
}
