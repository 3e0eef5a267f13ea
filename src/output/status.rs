//! Outbound status stream
//!
//! Producers (the run driver and its workers) push events through a
//! [`StatusSender`]; the front-end drains the matching [`StatusReceiver`].
//! The channel is unbounded so producers never wait on the consumer.

use std::fmt;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// An event delivered to the front-end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// A human-readable progress or error line
    Progress(String),

    /// The task graph was exhausted
    Completed,

    /// The run was cancelled by the user
    Stopped,

    /// The run could not make progress
    Failed(String),
}

impl StatusEvent {
    /// Returns true for the events that end a run
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progress(line) => f.write_str(line),
            Self::Completed => f.write_str("Grab completed"),
            Self::Stopped => f.write_str("Grab process stopped by user"),
            Self::Failed(reason) => write!(f, "Error: {}", reason),
        }
    }
}

/// Receiving half of the status stream
pub type StatusReceiver = UnboundedReceiver<StatusEvent>;

/// Sending half of the status stream
///
/// Cheap to clone; every worker holds one.
#[derive(Debug, Clone)]
pub struct StatusSender {
    tx: UnboundedSender<StatusEvent>,
}

impl StatusSender {
    /// Sends a progress line
    pub fn progress(&self, line: impl Into<String>) {
        self.send(StatusEvent::Progress(line.into()));
    }

    /// Sends an event
    ///
    /// A closed receiver means nobody is listening any more; the event is dropped.
    pub fn send(&self, event: StatusEvent) {
        let _ = self.tx.send(event);
    }
}

/// Creates a connected sender/receiver pair
pub fn status_channel() -> (StatusSender, StatusReceiver) {
    let (tx, rx) = unbounded_channel();
    (StatusSender { tx }, rx)
}
