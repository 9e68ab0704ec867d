//! Exec error types.

use thiserror::Error;

/// Errors produced by looking up or running an exec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// No exec is registered under the name.
    #[error("exec {name:?} is not registered")]
    NotFound {
        /// The unknown name.
        name: String,
    },

    /// The exec ran and reported a failure.
    #[error("exec {exec:?} failed: {reason}")]
    Failed {
        /// The exec that failed.
        exec: String,
        /// What went wrong.
        reason: String,
    },

    /// An action argument could not be used.
    #[error("invalid argument {key:?}: {reason}")]
    InvalidArgument {
        /// The argument key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The exec observed cancellation and stopped.
    #[error("exec cancelled")]
    Cancelled,
}

impl ExecError {
    /// A failure reported by `exec`.
    pub fn failed(exec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            exec: exec.into(),
            reason: reason.into(),
        }
    }
}
