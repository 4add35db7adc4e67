//! The worker→supervisor progress queue.
//!
//! A multi-producer, single-consumer channel carrying [`ProgressEvent`]s.
//! Every worker holds a cloned [`ProgressSender`]; the supervisor owns the
//! single [`ProgressReceiver`] and drains it while workers run. Sends are
//! non-blocking; the channel is unbounded because the supervisor drains
//! continuously for the lifetime of every worker.

use crate::event::ProgressEvent;
use tokio::sync::mpsc;

/// Create a connected progress queue.
///
/// Returns the producer handle (clone one per worker) and the single
/// consumer handle.
#[must_use]
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        ProgressSender { inner: sender },
        ProgressReceiver { inner: receiver },
    )
}

/// Producer handle for the progress queue.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    inner: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    /// Enqueue a progress event without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the supervisor has dropped the receiving end.
    pub fn send(&self, event: ProgressEvent) -> Result<(), SendError> {
        self.inner.send(event).map_err(|_| SendError::Closed)
    }

    /// Check whether the consuming end is still alive.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Consumer handle for the progress queue.
#[derive(Debug)]
pub struct ProgressReceiver {
    inner: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Receive the next event, waiting if the queue is empty.
    ///
    /// Returns `None` once every sender has been dropped and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.inner.recv().await
    }

    /// Receive an event without waiting.
    ///
    /// Returns `None` when no event is immediately available or the queue
    /// is closed and drained.
    pub fn try_recv(&mut self) -> Option<ProgressEvent> {
        self.inner.try_recv().ok()
    }
}

/// Error returned when sending on a torn-down queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The receiving end has been dropped.
    Closed,
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "progress queue is closed"),
        }
    }
}

impl std::error::Error for SendError {}
