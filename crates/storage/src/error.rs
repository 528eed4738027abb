//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File or directory does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Path was expected to be a directory
    #[display("not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// Path has no usable file name component
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The blocking copy task panicked or was cancelled by the runtime.
    #[display("copy task aborted: {}", _0.display())]
    Aborted(#[error(not(source))] PathBuf),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Classify an I/O error against the path it happened on.
    pub(crate) fn from_io(e: IoError, path: impl Into<PathBuf>) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into()),
            _ => Self::Io(e),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Aborted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_errors_are_classified_by_kind() {
        let missing = ErrorKind::from_io(io::Error::from(io::ErrorKind::NotFound), "a.jpg");
        assert!(matches!(missing, ErrorKind::NotFound(p) if p == PathBuf::from("a.jpg")));
        let denied = ErrorKind::from_io(io::Error::from(io::ErrorKind::PermissionDenied), "b.jpg");
        assert!(matches!(denied, ErrorKind::PermissionDenied(_)));
        let other = ErrorKind::from_io(io::Error::other("disk on fire"), "c.jpg");
        assert!(matches!(other, ErrorKind::Io(_)));
        assert!(other.is_retryable());
    }

    #[test]
    fn display() {
        assert_eq!(ErrorKind::NotADirectory(PathBuf::from("/tmp/x")).to_string(), "not a directory: /tmp/x");
    }
}
