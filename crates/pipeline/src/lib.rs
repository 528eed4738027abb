//! The exifsift pipeline: scan a source tree, look up one metadata key per
//! candidate, and copy the files whose value matches into a destination
//! directory, skipping files that are already there.
//!
//! - [`run`] streams [`RunEvent`]s for a whole run; [`execute`] drives it to
//!   completion and logs as it goes.
//! - [`process_candidate`] takes a single [`Candidate`] through
//!   skip-check → lookup → match → copy.
//! - [`Matcher`] is the predicate over extracted values.

mod candidate;
mod context;
pub mod error;
mod matcher;
mod process;
mod report;
mod run;

pub use crate::candidate::{Candidate, Query};
pub use crate::context::{Context, TraversalPolicy};
pub use crate::matcher::{MatchPolicy, Matcher};
pub use crate::process::{Outcome, process_candidate};
pub use crate::report::execute;
pub use crate::run::{RunEvent, Summary, run};

/// Default cap on candidates in flight at once.
pub const MAX_PROCESS_CONCURRENCY: usize = 100;
