//! Centralized error types for inboxsweep.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the inboxsweep library.
#[derive(Error, Debug)]
pub enum SweepError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A row snapshot could not be decoded.
    #[error("Invalid row snapshot '{path}': {reason}")]
    InvalidSnapshot { path: PathBuf, reason: String },

    /// The persisted state document is corrupt.
    #[error("Invalid state file '{path}': {reason}")]
    InvalidState { path: PathBuf, reason: String },

    /// A configuration value is out of range or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A category name that is not one of the known buckets.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The host refused or failed a bulk action step.
    #[error("Action '{action}' failed on message {index}: {reason}")]
    ActionFailed {
        action: &'static str,
        index: usize,
        reason: String,
    },
}

/// Convenience alias for `Result<T, SweepError>`.
pub type Result<T> = std::result::Result<T, SweepError>;

impl SweepError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map an `io::Error` for `path`, turning `NotFound` into [`SweepError::FileNotFound`].
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_maps_not_found() {
        let err = SweepError::open(
            "/nope",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, SweepError::FileNotFound(_)));
    }

    #[test]
    fn test_open_keeps_other_io_errors() {
        let err = SweepError::open(
            "/locked",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, SweepError::Io { .. }));
        assert!(err.to_string().contains("/locked"));
    }
}
