use crate::Config;
use crate::error::{ErrorKind, Result};
use exifsift_pipeline::{Context, Matcher, Query, TraversalPolicy};
use exifsift_storage::{Destination, Extensions};
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Validated, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Everything the pipeline needs.
    pub context: Context,
    /// Explicit exiftool executable, if configured.
    pub exiftool: Option<PathBuf>,
    /// Upper bound for a single metadata lookup.
    pub timeout: Duration,
}

impl Config {
    /// Check the merged configuration and turn it into [`Settings`].
    ///
    /// Source and destination are canonicalized, so every path the pipeline
    /// logs or copies to is absolute.
    ///
    /// # Errors
    /// - [`Missing`](ErrorKind::Missing) for an unset source, destination or key.
    /// - [`NotFound`](ErrorKind::NotFound) / [`NotADirectory`](ErrorKind::NotADirectory)
    ///   when either directory is unusable.
    /// - [`InvalidKey`](ErrorKind::InvalidKey) for a key containing a line break or NUL.
    /// - [`NoTargets`](ErrorKind::NoTargets) when no non-empty target remains.
    /// - [`NoExtensions`](ErrorKind::NoExtensions) / [`InvalidExtension`](ErrorKind::InvalidExtension).
    /// - [`InvalidTimeout`](ErrorKind::InvalidTimeout) for a zero timeout.
    pub fn validate(&self) -> Result<Settings> {
        let source = existing_dir(self.source.as_deref().ok_or_raise(|| ErrorKind::Missing("source"))?)?;
        let destination = existing_dir(self.destination.as_deref().ok_or_raise(|| ErrorKind::Missing("destination"))?)?;
        let destination = Destination::new(&destination).or_raise(|| ErrorKind::NotADirectory(destination.clone()))?;

        let key = self.key.as_deref().map(str::trim).filter(|k| !k.is_empty());
        let key = key.ok_or_raise(|| ErrorKind::Missing("key"))?;
        if key.contains(['\n', '\r', '\0']) {
            exn::bail!(ErrorKind::InvalidKey(key.to_string()));
        }
        let matcher = Matcher::new(self.policy, self.targets.iter().map(|t| t.trim()));
        if matcher.is_empty() {
            exn::bail!(ErrorKind::NoTargets);
        }

        if let Some(bad) = self.extensions.iter().find(|e| !is_valid_extension(e)) {
            exn::bail!(ErrorKind::InvalidExtension(bad.clone()));
        }
        let extensions = Extensions::new(&self.extensions);
        if extensions.is_empty() {
            exn::bail!(ErrorKind::NoExtensions);
        }
        if self.timeout == 0 {
            exn::bail!(ErrorKind::InvalidTimeout);
        }

        let traversal = match self.skip_unreadable {
            true => TraversalPolicy::Skip,
            false => TraversalPolicy::Abort,
        };
        let mut context = Context::new(source, destination, Query::new(key, matcher))
            .with_extensions(extensions)
            .with_traversal(traversal)
            .with_dry_run(self.dry_run);
        if let Some(concurrency) = self.concurrency {
            context = context.with_concurrency(concurrency);
        }

        Ok(Settings { context, exiftool: self.exiftool.clone(), timeout: Duration::from_secs(self.timeout) })
    }
}

// Use non-async here; it only happens once at startup.
fn existing_dir(path: &Path) -> Result<PathBuf> {
    let canonical = std::fs::canonicalize(path).or_raise(|| ErrorKind::NotFound(path.to_path_buf()))?;
    if !canonical.is_dir() {
        exn::bail!(ErrorKind::NotADirectory(path.to_path_buf()));
    }
    Ok(canonical)
}

/// An extension is matched against the end of a file name, so it can't
/// contain a separator or whitespace.
fn is_valid_extension(extension: &str) -> bool {
    !extension.trim().chars().any(|c| std::path::is_separator(c) || c.is_whitespace() || c == '\0')
}
