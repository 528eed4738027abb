//! Configuration Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every variant means the run must not start. The message is meant for the
/// person at the terminal.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A configuration source could not be read or parsed.
    #[display("failed to load configuration")]
    Load,
    /// The configuration file's extension isn't one of toml, yaml, yml, json.
    #[display("unsupported configuration file format: {}", _0.display())]
    UnknownFormat(#[error(not(source))] PathBuf),
    /// A required setting has no value.
    #[display("missing required setting: {_0}")]
    Missing(#[error(not(source))] &'static str),
    #[display("path does not exist: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    #[display("not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// No non-empty match target was given.
    #[display("no match targets given")]
    NoTargets,
    #[display("no file extensions given")]
    NoExtensions,
    /// The metadata key would break the line-based exiftool protocol.
    #[display("invalid metadata key: {_0:?}")]
    InvalidKey(#[error(not(source))] String),
    #[display("invalid file extension: {_0:?}")]
    InvalidExtension(#[error(not(source))] String),
    #[display("timeout must be at least one second")]
    InvalidTimeout,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Configuration has to be fixed by the user; nothing is retryable.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(ErrorKind::Missing("source").to_string(), "missing required setting: source");
        assert_eq!(ErrorKind::InvalidExtension("j/pg".to_string()).to_string(), r#"invalid file extension: "j/pg""#);
        assert_eq!(ErrorKind::InvalidKey("a\nb".to_string()).to_string(), r#"invalid metadata key: "a\nb""#);
        assert!(!ErrorKind::NoTargets.is_retryable());
    }
}
