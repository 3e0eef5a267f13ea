//! Visited registry
//!
//! Admission is the only mechanism preventing duplicate fetches and endless
//! cycles, so membership check and insert happen under one lock.

use crate::url::canonicalize;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Set of URLs admitted during one crawl run
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    visited: Mutex<HashSet<String>>,
}

impl VisitedRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `url` if it has not been admitted before
    ///
    /// Returns true for exactly one caller per canonical URL, however many
    /// race to admit it.
    pub fn try_admit(&self, url: &Url) -> bool {
        let key = canonicalize(url).into();
        self.lock().insert(key)
    }

    /// Returns true if `url` was already admitted
    pub fn contains(&self, url: &Url) -> bool {
        let key: String = canonicalize(url).into();
        self.lock().contains(&key)
    }

    /// Number of admitted URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing was admitted yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // A panicking worker cannot leave the set half-updated
        self.visited.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
