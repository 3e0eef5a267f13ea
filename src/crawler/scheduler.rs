//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - Depth bounding of discovered URLs
//! - Admission through the visited registry
//! - The FIFO frontier of admitted tasks waiting for a worker slot
//! - The concurrency ceiling of the worker pool

use crate::crawler::registry::VisitedRegistry;
use crate::url::canonicalize;
use std::collections::VecDeque;
use std::sync::Arc;
use url::Url;

/// A URL admitted into the crawl, waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The URL to fetch (canonical form)
    pub url: Url,

    /// The seed URL of the run
    pub base_url: Url,

    /// Number of link hops from the seed
    pub depth: u32,
}

/// Why an offered URL did not become a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The URL is deeper than the configured maximum
    TooDeep,

    /// The URL was already admitted in this run
    AlreadyVisited,
}

/// Scheduler owns the frontier of a single run
///
/// Admission happens when a URL is offered, so a URL sits in the frontier
/// or in flight at most once per run.
pub struct Scheduler {
    /// Admitted URLs of this run
    registry: Arc<VisitedRegistry>,

    /// Tasks waiting for a worker, oldest first
    frontier: VecDeque<CrawlTask>,

    /// Tasks deeper than this are discarded
    max_depth: u32,

    /// Worker slots
    max_concurrent_fetches: usize,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `registry` - The run's visited registry
    /// * `max_depth` - Deepest depth that is still fetched
    /// * `max_concurrent_fetches` - Size of the worker pool (at least 1)
    pub fn new(
        registry: Arc<VisitedRegistry>,
        max_depth: u32,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            registry,
            frontier: VecDeque::new(),
            max_depth,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
        }
    }

    /// Offers a URL to the frontier
    ///
    /// The depth bound is checked before admission, so a URL first seen too
    /// deep can still be admitted later from a shallower page.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The URL was admitted and queued
    /// * `Err(Rejection)` - The URL was discarded
    pub fn offer(&mut self, url: &Url, base_url: &Url, depth: u32) -> Result<(), Rejection> {
        if depth > self.max_depth {
            tracing::trace!("Discarding {} at depth {} (max {})", url, depth, self.max_depth);
            return Err(Rejection::TooDeep);
        }

        if !self.registry.try_admit(url) {
            return Err(Rejection::AlreadyVisited);
        }

        tracing::debug!("Admitted {} at depth {}", url, depth);
        self.frontier.push_back(CrawlTask {
            url: canonicalize(url),
            base_url: base_url.clone(),
            depth,
        });
        Ok(())
    }

    /// Takes the next task if a worker slot is free
    ///
    /// # Arguments
    ///
    /// * `in_flight` - Number of workers currently running
    pub fn next_task(&mut self, in_flight: usize) -> Option<CrawlTask> {
        if in_flight >= self.max_concurrent_fetches {
            return None;
        }
        self.frontier.pop_front()
    }

    /// Drops every queued task
    ///
    /// Returns the number of tasks discarded.
    pub fn discard_pending(&mut self) -> usize {
        let discarded = self.frontier.len();
        self.frontier.clear();
        discarded
    }

    /// Returns the number of tasks waiting for a worker
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Returns the size of the worker pool
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_fetches
    }

    /// Returns the run's visited registry
    pub fn registry(&self) -> &Arc<VisitedRegistry> {
        &self.registry
    }
}
