//! Run-wide, immutable settings handed to the pipeline.

use crate::MAX_PROCESS_CONCURRENCY;
use crate::candidate::Query;
use derive_more::Display;
use exifsift_storage::{Destination, Extensions};
use std::path::PathBuf;
use std::sync::Arc;

/// What to do when part of the source tree can't be read.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum TraversalPolicy {
    /// Stop the run before any candidate is processed.
    #[default]
    #[display("abort")]
    Abort,
    /// Log the unreadable entry and keep walking.
    #[display("skip")]
    Skip,
}

/// Everything a run needs besides the metadata service.
///
/// Built once at startup and only ever borrowed afterwards; nothing in the
/// pipeline reads configuration from anywhere else.
#[derive(Clone, Debug)]
pub struct Context {
    /// Root of the tree to scan.
    pub source: PathBuf,
    /// Extensions a file must have to become a candidate.
    pub extensions: Extensions,
    /// Where matching files are copied to.
    pub destination: Destination,
    pub query: Arc<Query>,
    /// Never zero; see [`Context::concurrency`].
    concurrency: usize,
    pub traversal: TraversalPolicy,
    /// Report matches without copying anything.
    pub dry_run: bool,
}
impl Context {
    pub fn new(source: impl Into<PathBuf>, destination: Destination, query: Query) -> Self {
        Self {
            source: source.into(),
            extensions: Extensions::default(),
            destination,
            query: Arc::new(query),
            concurrency: MAX_PROCESS_CONCURRENCY,
            traversal: TraversalPolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Zero is bumped to one; a run always makes progress.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Maximum number of candidates in flight at once. Always at least one.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn with_traversal(mut self, traversal: TraversalPolicy) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchPolicy, Matcher};
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(16, 16)]
    fn test_concurrency_is_never_zero(#[case] requested: usize, #[case] expected: usize) {
        let temp_dir = tempfile::tempdir().unwrap();
        let query = Query::new("Keywords", Matcher::new(MatchPolicy::Contains, ["beach"]));
        let ctx = Context::new(temp_dir.path(), Destination::new(temp_dir.path()).unwrap(), query);
        assert_eq!(ctx.concurrency(), MAX_PROCESS_CONCURRENCY);
        assert_eq!(ctx.with_concurrency(requested).concurrency(), expected);
    }
}
