//! Task outcome statuses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classifier for a task outcome or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    /// Normal completion. Records output and unblocks dependents.
    Success,
    /// Informational, non-terminal.
    Info,
    /// Something degraded, non-terminal.
    Warn,
    /// Recoverable failure: the action returned failure or panicked.
    Fail,
    /// Unrecoverable internal condition, e.g. graph construction failure.
    Error,
    /// Work has not started yet.
    Pending,
    /// Preconditions unmet: a required input never reached the pool.
    Cancel,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
            Self::Error => "ERROR",
            Self::Pending => "PENDING",
            Self::Cancel => "CANCEL",
        };
        f.write_str(name)
    }
}

/// A status value: a kind plus a human-readable message.
///
/// Ordering between kinds is not meaningful beyond success versus
/// non-success; use [`Status::is_success`] for scheduling decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// The outcome classifier.
    pub kind: StatusKind,
    /// Free-form description; may be empty.
    pub message: String,
}

impl Status {
    /// Create a status from a kind and message.
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A successful status with no message.
    #[must_use]
    pub fn success() -> Self {
        Self::new(StatusKind::Success, "")
    }

    /// An informational status.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, message)
    }

    /// A warning status.
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Warn, message)
    }

    /// A recoverable failure.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Fail, message)
    }

    /// An unrecoverable internal failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, message)
    }

    /// A not-yet-started status with no message.
    #[must_use]
    pub fn pending() -> Self {
        Self::new(StatusKind::Pending, "")
    }

    /// A cancellation due to unmet preconditions.
    pub fn cancel(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Cancel, message)
    }

    /// Whether this status unblocks dependents.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "[{}]", self.kind)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_the_only_unblocking_kind() {
        assert!(Status::success().is_success());
        assert!(!Status::fail("boom").is_success());
        assert!(!Status::cancel("inputs missing").is_success());
        assert!(!Status::pending().is_success());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Status::success().to_string(), "[SUCCESS]");
        assert_eq!(Status::fail("boom").to_string(), "[FAIL] boom");
    }

    #[test]
    fn serde_uses_screaming_snake_case_kinds() {
        let json = serde_json::to_string(&Status::cancel("nope")).unwrap();
        assert!(json.contains("\"CANCEL\""));
        let restored: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.kind, StatusKind::Cancel);
    }
}
