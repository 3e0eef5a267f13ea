//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle phase of a run (idle, running, completed, stopped, failed)
//! - `RunState`: the running flag, active task counter and phase shared by a run's workers

mod run_state;

// Re-export main types
pub use run_state::{CrawlState, RunState};
