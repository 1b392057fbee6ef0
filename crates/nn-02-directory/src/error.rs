//! Error types for the nickname directory

use thiserror::Error;

/// Faults talking to the shared store. Always transient from the caller's view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("Directory unavailable during {op}: {cause}")]
    Unavailable { op: &'static str, cause: String },

    #[error("Directory {op} timed out after {timeout_ms}ms")]
    Timeout { op: &'static str, timeout_ms: u64 },

    #[error("Invalid directory configuration: {0}")]
    InvalidConfig(String),
}

impl DirectoryError {
    pub fn unavailable(op: &'static str, cause: impl ToString) -> Self {
        Self::Unavailable {
            op,
            cause: cause.to_string(),
        }
    }
}
