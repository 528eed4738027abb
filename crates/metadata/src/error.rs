//! Metadata Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A metadata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Only [`Unavailable`](Self::Unavailable) should stop a run, and only when
/// it happens while opening a session. Everything else is a per-file problem
/// that callers treat as "no value".
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The extraction backend could not be found or started.
    #[display("metadata backend unavailable")]
    Unavailable,
    /// The backend session has already been closed, or its process died.
    #[display("metadata session closed")]
    Closed,
    /// Talking to the backend process failed.
    #[display("I/O error talking to metadata backend")]
    Io,
    /// The backend did not answer within the configured timeout.
    #[display("metadata lookup timed out: {}", _0.display())]
    Timeout(#[error(not(source))] PathBuf),
    /// The backend produced no output for the file (unreadable, missing, or
    /// not an image it understands).
    #[display("no metadata produced for: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// The backend answered with something that couldn't be parsed.
    #[display("invalid response from metadata backend")]
    InvalidResponse,
    /// The path or key can't be passed to the backend (e.g. contains a newline).
    #[display("argument can't be passed to metadata backend: {_0}")]
    InvalidArgument(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io | Self::Timeout(_))
    }
}
