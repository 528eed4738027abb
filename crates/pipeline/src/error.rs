//! Error types for the pipeline.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::{Path, PathBuf};

/// A pipeline error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a pipeline failure.
///
/// ### Run-level Errors
/// - [`ErrorKind::Traversal`] - the source tree couldn't be walked.
/// - [`ErrorKind::Interrupted`]
///
/// ### Per-candidate Errors
/// - [`ErrorKind::Gate`]
/// - [`ErrorKind::Copy`]
///
/// Metadata lookup failures never show up here: a file whose metadata can't
/// be read simply doesn't match.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Part of the source tree could not be read.
    #[display("failed to traverse source directory")]
    Traversal,
    /// Checking the destination for an existing copy failed.
    #[display("failed to check destination for: {}", _0.display())]
    Gate(#[error(not(source))] PathBuf),
    /// Duplicating a matched file into the destination failed.
    #[display("failed to copy: {}", _0.display())]
    Copy(#[error(not(source))] PathBuf),
    /// The run stream ended without reporting completion.
    #[display("run ended before completing")]
    Interrupted,
}

impl ErrorKind {
    /// Returns `true` if the whole run must stop. Per-candidate errors only
    /// end their own candidate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Traversal | Self::Interrupted)
    }

    /// The candidate this error belongs to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Gate(path) | Self::Copy(path) => Some(path),
            Self::Traversal | Self::Interrupted => None,
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Gate(_) | Self::Copy(_))
    }
}
