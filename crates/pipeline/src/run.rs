use crate::candidate::Candidate;
use crate::context::{Context, TraversalPolicy};
use crate::error::{ErrorKind, Result};
use crate::process::{Outcome, process_candidate};
use async_stream::stream;
use exifsift_metadata::ServiceHandle;
use exifsift_storage::locate;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Progress events emitted by [`run`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete) exactly once, with the
///    number of candidates found.
/// 3. [`Processed`](Self::Processed) zero or more times, one per candidate
///    that finished without error.
/// 4. [`Complete`](Self::Complete) exactly once, with the final tally.
///
/// A fatal error ends the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum RunEvent {
    Started,
    DiscoveryComplete(u64),
    Processed(Outcome),
    Complete(Summary),
}

/// Counters for a finished (or cancelled) run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Candidates found by traversal.
    pub discovered: u64,
    /// Unreadable entries skipped during traversal.
    pub unreadable: u64,
    pub already_present: u64,
    pub no_value: u64,
    pub lookup_failed: u64,
    pub unmatched: u64,
    pub copied: u64,
    pub would_copy: u64,
    pub raced: u64,
    /// Candidates whose task ended in an error.
    pub failed: u64,
    /// Candidates never dispatched because the run was cancelled.
    pub cancelled: u64,
    /// Total bytes written to the destination.
    pub bytes: u64,
    pub elapsed: Duration,
}
impl Summary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::AlreadyPresent(_) => self.already_present += 1,
            Outcome::NoValue(_) => self.no_value += 1,
            Outcome::LookupFailed { .. } => self.lookup_failed += 1,
            Outcome::Unmatched { .. } => self.unmatched += 1,
            Outcome::WouldCopy { .. } => self.would_copy += 1,
            Outcome::Copied { bytes, .. } => {
                self.copied += 1;
                self.bytes += bytes;
            },
            Outcome::Raced(_) => self.raced += 1,
        }
    }

    /// Candidates that satisfied the matcher, whether or not they were
    /// written.
    pub fn matched(&self) -> u64 {
        self.copied + self.would_copy + self.raced
    }

    /// Candidates that reached a verdict (including failed ones).
    pub fn completed(&self) -> u64 {
        self.already_present + self.no_value + self.lookup_failed + self.unmatched + self.matched() + self.failed
    }
}

/// Streams [`RunEvent`]s while scanning `ctx.source` and copying every
/// matching candidate into `ctx.destination`.
///
/// The source tree is walked to completion first, then candidates are
/// processed concurrently, up to `ctx.concurrency()` at a time. Another
/// candidate is promoted as each in-flight one completes.
///
/// Cancelling `cancel` stops the walk and the promotion of new candidates.
/// Candidates already in flight are allowed to finish, the rest are counted
/// in [`Summary::cancelled`], and the stream still ends with
/// [`Complete`](RunEvent::Complete).
///
/// Per-candidate failures are surfaced as `Err` items without ending the
/// stream. Only a traversal failure (under [`TraversalPolicy::Abort`]) is
/// fatal.
pub fn run<'a>(
    service: &'a ServiceHandle,
    ctx: &'a Context,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<RunEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let started = Instant::now();
        let mut summary = Summary::default();
        yield Ok(RunEvent::Started);

        let mut pending = VecDeque::new();
        let mut located = locate(&ctx.source, &ctx.extensions);
        while let Some(Some(found)) = cancel.run_until_cancelled(located.next()).await {
            match found {
                Ok(path) => pending.push_back(Candidate::new(path, Arc::clone(&ctx.query))),
                Err(e) if ctx.traversal == TraversalPolicy::Skip => {
                    tracing::warn!(error = ?e, "Skipping unreadable entry");
                    summary.unreadable += 1;
                },
                Err(e) => {
                    yield Err(e.raise(ErrorKind::Traversal));
                    return;
                },
            }
        }
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        summary.discovered = u64::try_from(pending.len()).unwrap_or(0);
        yield Ok(RunEvent::DiscoveryComplete(summary.discovered));

        let mut processing = FuturesUnordered::new();
        while processing.len() < ctx.concurrency() && !cancel.is_cancelled() {
            let Some(candidate) = pending.pop_front() else {
                break;
            };
            processing.push(dispatch(service, ctx, candidate));
        }
        while let Some(result) = processing.next().await {
            match &result {
                Ok(outcome) => summary.record(outcome),
                Err(_) => summary.failed += 1,
            }
            yield result.map(RunEvent::Processed);
            if !cancel.is_cancelled()
                && let Some(candidate) = pending.pop_front()
            {
                processing.push(dispatch(service, ctx, candidate));
            }
        }

        summary.cancelled = u64::try_from(pending.len()).unwrap_or(0);
        summary.elapsed = started.elapsed();
        yield Ok(RunEvent::Complete(summary));
    })
}

async fn dispatch<'a>(service: &'a ServiceHandle, ctx: &'a Context, candidate: Candidate) -> Result<Outcome> {
    process_candidate(service, ctx, &candidate).await
}
