use crate::context::Context;
use crate::error::{ErrorKind, Result};
use crate::process::Outcome;
use crate::run::{RunEvent, Summary, run};
use exifsift_metadata::ServiceHandle;
use exifsift_storage::display_name;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

/// Drives [`run`] to the end, logging every event, and returns the final
/// [`Summary`].
///
/// Per-candidate errors are logged and counted; they don't stop the run.
///
/// # Errors
/// The fatal error that ended the run early, or
/// [`Interrupted`](ErrorKind::Interrupted) if the stream stopped without
/// reporting completion.
pub async fn execute(service: &ServiceHandle, ctx: &Context, cancel: CancellationToken) -> Result<Summary> {
    let events = run(service, ctx, cancel);
    futures::pin_mut!(events);
    while let Some(event) = events.next().await {
        match event {
            Ok(RunEvent::Started) => tracing::info!(
                source = %ctx.source.display(),
                destination = %ctx.destination.root().display(),
                key = %ctx.query.key,
                policy = %ctx.query.matcher.policy(),
                targets = ?ctx.query.matcher.targets(),
                backend = service.name(),
                dry_run = ctx.dry_run,
                "Starting"
            ),
            Ok(RunEvent::DiscoveryComplete(candidates)) => tracing::info!(candidates, "Discovery complete"),
            Ok(RunEvent::Processed(outcome)) => log_outcome(&outcome),
            Ok(RunEvent::Complete(summary)) => {
                tracing::info!(
                    elapsed = ?summary.elapsed,
                    discovered = summary.discovered,
                    copied = summary.copied,
                    would_copy = summary.would_copy,
                    skipped = summary.already_present,
                    unmatched = summary.unmatched + summary.no_value + summary.lookup_failed,
                    failed = summary.failed,
                    cancelled = summary.cancelled,
                    bytes = summary.bytes,
                    "Complete"
                );
                return Ok(summary);
            },
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                let file = e.path().map(display_name).unwrap_or_default();
                tracing::error!(%file, error = ?e, "Failed to process file");
            },
        }
    }
    exn::bail!(ErrorKind::Interrupted)
}

fn log_outcome(outcome: &Outcome) {
    let file = display_name(outcome.path());
    match outcome {
        Outcome::AlreadyPresent(_) => tracing::info!(%file, "Already in destination, skipping"),
        Outcome::NoValue(_) => tracing::debug!(%file, "No value, not matched"),
        Outcome::LookupFailed { reason, .. } => tracing::warn!(%file, %reason, "Metadata unavailable, not matched"),
        Outcome::Unmatched { value, .. } => tracing::debug!(%file, %value, "Not matched"),
        Outcome::WouldCopy { destination, .. } => {
            tracing::info!(%file, destination = %destination.display(), "Matched, would copy (dry run)")
        },
        Outcome::Copied { bytes, .. } => tracing::info!(%file, bytes, "Copied"),
        Outcome::Raced(_) => tracing::info!(%file, "Matched, but already copied by another task"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchPolicy, Matcher, Query};
    use exifsift_metadata::MockService;
    use exifsift_storage::Destination;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_execute_returns_summary() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        let a = source.path().join("a.jpg");
        std::fs::write(&a, b"a-bytes").unwrap();
        let service: ServiceHandle = Arc::new(MockService::with_values([(a, "Keywords", "sunset beach")]));
        let query = Query::new("Keywords", Matcher::new(MatchPolicy::Contains, ["beach"]));
        let ctx = Context::new(source.path(), Destination::new(destination.path()).unwrap(), query);

        let summary = execute(&service, &ctx, CancellationToken::new()).await.unwrap();
        assert_eq!((summary.discovered, summary.copied, summary.bytes), (1, 1, 7));
        assert!(destination.path().join("a.jpg").exists());
    }

    #[tokio::test]
    async fn test_execute_returns_fatal_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        let service: ServiceHandle = Arc::new(MockService::default());
        let query = Query::new("Keywords", Matcher::new(MatchPolicy::Contains, ["beach"]));
        let ctx = Context::new(temp_dir.path().join("missing"), Destination::new(destination.path()).unwrap(), query);

        let err = execute(&service, &ctx, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Traversal));
    }

    #[tokio::test]
    async fn test_copy_errors_are_counted_not_returned() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        let a = source.path().join("a.jpg");
        std::fs::write(&a, b"a-bytes").unwrap();
        // The destination vanishes after validation.
        let service: ServiceHandle = Arc::new(MockService::with_values([(a, "Keywords", "beach")]));
        let query = Query::new("Keywords", Matcher::new(MatchPolicy::Contains, ["beach"]));
        let ctx = Context::new(source.path(), Destination::new(destination.path()).unwrap(), query);
        std::fs::remove_dir(destination.path()).unwrap();

        let summary = execute(&service, &ctx, CancellationToken::new()).await.unwrap();
        assert_eq!((summary.discovered, summary.failed, summary.copied), (1, 1, 0));
    }
}
