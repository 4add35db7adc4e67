//! Typed events carried on the progress queue.

use serde::{Deserialize, Serialize};
use strata_task_graph::TaskHash;

/// A progress report from a running worker.
///
/// Carries the content hash of the reporting task and a fraction that is
/// *advisory*: values are expected in `[0.0, 1.0]`, monotonicity is
/// recommended but not enforced, and the supervisor keeps only the last
/// observed value per task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Hash identity of the reporting task.
    pub task: TaskHash,
    /// Completed fraction of the task's work.
    pub fraction: f64,
}

impl ProgressEvent {
    /// Create a progress event.
    #[must_use]
    pub fn new(task: TaskHash, fraction: f64) -> Self {
        Self { task, fraction }
    }

    /// Whether the reported fraction indicates completed work.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.fraction >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_threshold() {
        let task = TaskHash::compute(1, "a");
        assert!(!ProgressEvent::new(task, 0.99).is_complete());
        assert!(ProgressEvent::new(task, 1.0).is_complete());
    }

    #[test]
    fn serde_round_trip() {
        let event = ProgressEvent::new(TaskHash::compute(2, "b"), 0.5);
        let json = serde_json::to_string(&event).unwrap();
        let restored: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, restored);
    }
}
