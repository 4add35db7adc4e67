//! Error types for the core crate.
//!
//! Per-task failures are *not* errors: they are [`Status`](crate::Status)
//! values recorded per outcome. The `Error` type here covers misuse of the
//! library surface itself.

use miette::Diagnostic;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the core library surface.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    /// A caller-supplied argument was out of range.
    #[error("invalid argument: {reason}")]
    #[diagnostic(code(strata::invalid_argument))]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },
}

impl Error {
    /// Create an [`Error::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}
