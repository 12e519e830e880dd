//! Error types for physical-nets.
//!
//! Per-record problems ([`crate::board::RecordError`]) never reach this
//! level: the reader recovers from them line by line. Everything here
//! aborts a run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised by a board host.
#[derive(Error, Debug)]
pub enum HostError {
    /// A file could not be read or written.
    #[error("I/O error on {path}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON payload could not be decoded or encoded.
    #[error("invalid JSON in {what}")]
    Json {
        /// Which payload.
        what: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The host refused the request.
    #[error("host rejected {operation}: {message}")]
    Rejected {
        /// Operation name.
        operation: &'static str,
        /// Host-provided reason.
        message: String,
    },
}

impl HostError {
    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a JSON error.
    pub fn json(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            what: what.into(),
            source,
        }
    }
}

/// Errors that abort a reconstruction run.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An input needed before any computation is missing or unusable.
    #[error("missing board data ({what}): {reason}")]
    MissingBoardData {
        /// Which input.
        what: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Reading from the host failed.
    #[error("host operation '{operation}' failed")]
    Host {
        /// Operation name.
        operation: &'static str,
        /// The underlying host error.
        #[source]
        source: HostError,
    },

    /// Writing the patched netlist back failed.
    #[error("failed to write the netlist back")]
    WriteBack {
        /// The underlying host error.
        #[source]
        source: HostError,
    },
}

impl EngineError {
    /// Creates a missing-data error.
    pub fn missing(what: &'static str, reason: impl Into<String>) -> Self {
        Self::MissingBoardData {
            what,
            reason: reason.into(),
        }
    }
}

/// Result type for pipeline operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn engine_error_display() {
        let error = EngineError::missing("document source", "empty");
        assert_eq!(
            error.to_string(),
            "missing board data (document source): empty"
        );

        let error = EngineError::WriteBack {
            source: HostError::Rejected {
                operation: "set_netlist_document",
                message: "read-only".to_string(),
            },
        };
        let source = std::error::Error::source(&error).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("host rejected set_netlist_document: read-only")
        );
    }
}
