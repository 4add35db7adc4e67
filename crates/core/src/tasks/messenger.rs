//! The worker-side progress handle.

use crate::status::Status;
use strata_events::{ProgressEvent, ProgressSender, SendError, emit_task_progress};
use strata_task_graph::TaskHash;

/// Thin handle a worker uses to report progress for its task.
///
/// Carries the owning task's hash and a producer handle on the shared
/// progress queue. Cheap to clone; one is handed to every action
/// invocation.
#[derive(Debug, Clone)]
pub struct Messenger {
    task: TaskHash,
    sender: ProgressSender,
}

impl Messenger {
    /// Create a messenger for `task`.
    #[must_use]
    pub fn new(task: TaskHash, sender: ProgressSender) -> Self {
        Self { task, sender }
    }

    /// The hash of the task this messenger reports for.
    #[must_use]
    pub fn task(&self) -> TaskHash {
        self.task
    }

    /// Report the completed fraction of this task's work.
    ///
    /// The fraction is clamped to `[0.0, 1.0]`; the range is advisory and
    /// the supervisor only keeps the last observed value. The send never
    /// blocks. Returns a success status when the event was enqueued, or a
    /// warning when the supervisor has already torn the queue down.
    pub fn send_progress(&self, fraction: f64) -> Status {
        let fraction = fraction.clamp(0.0, 1.0);
        emit_task_progress!(self.task, fraction);
        match self.sender.send(ProgressEvent::new(self.task, fraction)) {
            Ok(()) => Status::success(),
            Err(SendError::Closed) => Status::warn("progress queue is closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusKind;
    use strata_events::progress_channel;

    #[tokio::test]
    async fn progress_reaches_the_queue() {
        let task = TaskHash::compute(1, "reporting");
        let (sender, mut receiver) = progress_channel();
        let messenger = Messenger::new(task, sender);

        assert!(messenger.send_progress(0.25).is_success());

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.task, task);
        assert!((event.fraction - 0.25).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn fractions_are_clamped_to_the_advisory_range() {
        let (sender, mut receiver) = progress_channel();
        let messenger = Messenger::new(TaskHash::compute(1, "t"), sender);

        messenger.send_progress(7.5);
        messenger.send_progress(-1.0);

        assert!((receiver.recv().await.unwrap().fraction - 1.0).abs() < f64::EPSILON);
        assert!(receiver.recv().await.unwrap().fraction.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn closed_queue_degrades_to_a_warning() {
        let (sender, receiver) = progress_channel();
        let messenger = Messenger::new(TaskHash::compute(1, "t"), sender);
        drop(receiver);

        let status = messenger.send_progress(0.5);
        assert_eq!(status.kind, StatusKind::Warn);
    }
}
