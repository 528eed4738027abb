//! Files discovered by traversal, pending match evaluation.

use crate::matcher::Matcher;
use exifsift_storage::display_name;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What every candidate in a run is checked against: one metadata key and a
/// predicate over its value. Shared (read-only) by all candidates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub key: String,
    pub matcher: Matcher,
}
impl Query {
    pub fn new(key: impl Into<String>, matcher: Matcher) -> Self {
        Self { key: key.into(), matcher }
    }
}

/// A single source file awaiting a verdict.
///
/// Immutable once created, and handed to exactly one task.
#[derive(Clone, Debug)]
pub struct Candidate {
    path: PathBuf,
    query: Arc<Query>,
}
impl Candidate {
    pub fn new(path: impl Into<PathBuf>, query: Arc<Query>) -> Self {
        Self { path: path.into(), query }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Base name, for log lines.
    pub fn name(&self) -> String {
        display_name(&self.path)
    }
}
