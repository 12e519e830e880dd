//! Per-record error types.
//!
//! Both variants are recoverable: the reader logs them and moves on to the
//! next line. Nothing here aborts a parse.

use thiserror::Error;

/// Errors raised while decoding a single source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The line is not a well-formed record, or a required field is missing.
    #[error("Malformed record: {message}")]
    Malformed {
        /// Description of what's wrong.
        message: String,
    },

    /// The record decoded, but its copper outline is unusable.
    #[error("Degenerate shape: {message}")]
    Degenerate {
        /// Description of what's wrong.
        message: String,
    },
}

impl RecordError {
    /// Creates a malformed record error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a degenerate shape error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::Degenerate {
            message: message.into(),
        }
    }

    /// Creates a missing-field error.
    pub fn missing_field(kind: &str, field: &str) -> Self {
        Self::malformed(format!("{kind} record without usable '{field}'"))
    }
}
