/// Run state definitions for tracking a crawl's lifecycle
///
/// This module defines the phases a crawl run moves through and the shared
/// flags and counters workers consult while the run is active.
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Represents the lifecycle phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Initial State =====
    /// No run has been started
    Idle,

    // ===== Active State =====
    /// Tasks are being fetched and expanded
    Running,

    // ===== Terminal States =====
    /// The task graph was exhausted
    Completed,

    /// The run was cancelled by a stop request
    Stopped,

    /// The run could not make progress (e.g. the output root is not writable)
    Failed,
}

impl CrawlState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed)
    }

    /// Returns true while a run is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if the run may move from this state to `next`
    ///
    /// `Idle` and every terminal state may start a new run; only `Running`
    /// may end in a terminal state.
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        match (self, next) {
            (Self::Idle, Self::Running) => true,
            (Self::Running, next) => next.is_terminal(),
            (current, Self::Running) => current.is_terminal(),
            _ => false,
        }
    }

    /// Short lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared state of one crawl run
///
/// The running flag is the cooperative cancellation signal; the active
/// counter covers tasks that are queued or in flight.
#[derive(Debug)]
pub struct RunState {
    running: AtomicBool,
    active_tasks: AtomicUsize,
    phase: Mutex<CrawlState>,
}

impl RunState {
    /// Creates the state of a run that has just been started
    pub fn started() -> Self {
        Self {
            running: AtomicBool::new(true),
            active_tasks: AtomicUsize::new(0),
            phase: Mutex::new(CrawlState::Running),
        }
    }

    /// Returns true until a stop is requested or the run ends
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clears the running flag
    ///
    /// Returns true if this call was the one that cleared it.
    pub fn request_stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }

    /// Current phase of the run
    pub fn phase(&self) -> CrawlState {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves the run into a terminal phase
    ///
    /// Returns false, leaving the phase untouched, if the transition is not
    /// allowed (for instance when the run already finished).
    pub fn finish(&self, terminal: CrawlState) -> bool {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if !terminal.is_terminal() || !phase.can_transition_to(terminal) {
            return false;
        }
        *phase = terminal;
        self.running.store(false, Ordering::SeqCst);
        true
    }

    /// Number of tasks queued or in flight
    pub fn active_tasks(&self) -> usize {
        self.active_tasks.load(Ordering::SeqCst)
    }

    /// Counts a newly admitted task
    pub fn task_added(&self) {
        self.active_tasks.fetch_add(1, Ordering::SeqCst);
    }

    /// Counts `count` tasks as finished or discarded
    ///
    /// Returns the number of tasks still active.
    pub fn tasks_finished(&self, count: usize) -> usize {
        let previous = self.active_tasks.fetch_sub(count, Ordering::SeqCst);
        debug_assert!(previous >= count, "active task counter underflow");
        previous.saturating_sub(count)
    }
}
