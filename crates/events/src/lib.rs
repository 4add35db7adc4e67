//! Worker-to-supervisor progress channel and structured event macros for
//! strata.
//!
//! Two complementary surfaces live here:
//!
//! - a typed, in-band **progress queue** ([`progress_channel`],
//!   [`ProgressEvent`]) that workers use to stream completion fractions to
//!   the supervising executor, and
//! - out-of-band **`emit_*!` macros** that lower task lifecycle events to
//!   [`tracing`] with `strata::` targets, so any installed subscriber can
//!   observe runs without touching the executor's data path.
//!
//! ```text
//! ┌──────────┐  ProgressEvent   ┌────────────┐   tracing events
//! │ workers  │ ───────────────► │ supervisor │ ──────────────────► subscriber
//! └──────────┘  (mpsc queue)    └────────────┘   (emit_*! macros)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use strata_events::{ProgressEvent, progress_channel};
//! use strata_task_graph::TaskHash;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (sender, mut receiver) = progress_channel();
//! sender
//!     .send(ProgressEvent::new(TaskHash::compute(1, "build"), 0.5))
//!     .unwrap();
//! assert_eq!(receiver.recv().await.unwrap().fraction, 0.5);
//! # }
//! ```

pub mod event;
pub mod queue;

// Re-exports for convenience
pub use event::ProgressEvent;
pub use queue::{ProgressReceiver, ProgressSender, SendError, progress_channel};

// ============================================================================
// Emit Macros
// ============================================================================

/// Emit a layer started event.
///
/// # Example
/// ```rust,ignore
/// emit_layer_started!(0, 4);
/// ```
#[macro_export]
macro_rules! emit_layer_started {
    ($depth:expr, $task_count:expr) => {
        ::tracing::info!(
            target: "strata::executor",
            event_type = "layer.started",
            depth = $depth,
            task_count = $task_count,
        )
    };
}

/// Emit a task started event.
///
/// # Example
/// ```rust,ignore
/// emit_task_started!(task.identifier(), 1, 0);
/// ```
#[macro_export]
macro_rules! emit_task_started {
    ($identifier:expr, $depth:expr, $partition:expr) => {
        ::tracing::info!(
            target: "strata::task",
            event_type = "task.started",
            task = %$identifier,
            depth = $depth,
            partition = $partition,
        )
    };
}

/// Emit a task completed event.
#[macro_export]
macro_rules! emit_task_completed {
    ($identifier:expr, $success:expr) => {
        ::tracing::info!(
            target: "strata::task",
            event_type = "task.completed",
            task = %$identifier,
            success = $success,
        )
    };
    ($identifier:expr, $success:expr, $message:expr) => {
        ::tracing::info!(
            target: "strata::task",
            event_type = "task.completed",
            task = %$identifier,
            success = $success,
            message = %$message,
        )
    };
}

/// Emit a task cancelled event. Cancellation happens when a task's required
/// inputs never reached the resource pool.
#[macro_export]
macro_rules! emit_task_cancelled {
    ($identifier:expr, $message:expr) => {
        ::tracing::info!(
            target: "strata::task",
            event_type = "task.cancelled",
            task = %$identifier,
            message = %$message,
        )
    };
}

/// Emit a task progress event mirroring an in-band queue message.
#[macro_export]
macro_rules! emit_task_progress {
    ($task:expr, $fraction:expr) => {
        ::tracing::trace!(
            target: "strata::task",
            event_type = "task.progress",
            task = %$task,
            fraction = $fraction,
        )
    };
}

#[cfg(test)]
mod tests {
    use strata_task_graph::TaskIdentifier;

    #[tokio::test]
    async fn emit_macros_compile() {
        let identifier = TaskIdentifier::new(1, "build");
        emit_layer_started!(0, 3_usize);
        emit_task_started!(identifier, 0, 0);
        emit_task_completed!(identifier, true);
        emit_task_completed!(identifier, false, "boom");
        emit_task_cancelled!(identifier, "inputs unavailable");
        emit_task_progress!(identifier.hash(), 0.5_f64);
    }
}
