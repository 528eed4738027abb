use crate::candidate::Candidate;
use crate::context::Context;
use crate::error::{ErrorKind, Result};
use exifsift_metadata::ServiceHandle;
use exifsift_metadata::error::Error as MetadataError;
use exifsift_storage::CopyOutcome;
use exn::ResultExt;
use std::path::{Path, PathBuf};

/// The outcome of (successfully) processing a single candidate.
///
/// Each variant carries the source path so consumers can log it, count it,
/// or take further action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A file with the same base name was already in the destination. No
    /// metadata was read and nothing was copied.
    AlreadyPresent(PathBuf),
    /// The file has no value for the key (or an empty one).
    NoValue(PathBuf),
    /// The metadata service failed for this file. Treated exactly like
    /// [`NoValue`](Self::NoValue); the reason is kept for the log.
    LookupFailed { path: PathBuf, reason: String },
    /// The value didn't satisfy the matcher.
    Unmatched { path: PathBuf, value: String },
    /// Dry run: the file matched and would have been copied.
    WouldCopy { source: PathBuf, destination: PathBuf },
    /// The file matched and was copied.
    Copied { source: PathBuf, destination: PathBuf, bytes: u64 },
    /// The file matched, but by the time it was ready to be copied a file of
    /// the same name had appeared in the destination. Nothing was overwritten.
    Raced(PathBuf),
}
impl Outcome {
    /// Source path of the candidate this outcome belongs to.
    pub fn path(&self) -> &Path {
        match self {
            Self::AlreadyPresent(path) | Self::NoValue(path) | Self::Raced(path) => path,
            Self::LookupFailed { path, .. } | Self::Unmatched { path, .. } => path,
            Self::WouldCopy { source, .. } | Self::Copied { source, .. } => source,
        }
    }

    /// Returns `true` if the candidate satisfied the matcher.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::WouldCopy { .. } | Self::Copied { .. } | Self::Raced(_))
    }
}

/// What the metadata service said about one candidate.
struct Lookup<'a> {
    candidate: &'a Candidate,
    value: Option<String>,
    error: Option<MetadataError>,
}
impl Lookup<'_> {
    /// A value worth handing to the matcher: present, non-empty, and not
    /// accompanied by an error.
    fn usable(&self) -> Option<&str> {
        match (&self.error, self.value.as_deref()) {
            (None, Some(value)) if !value.is_empty() => Some(value),
            _ => None,
        }
    }
}

async fn lookup<'a>(service: &ServiceHandle, candidate: &'a Candidate) -> Lookup<'a> {
    match service.extract(candidate.path(), &candidate.query().key).await {
        Ok(value) => Lookup { candidate, value, error: None },
        Err(error) => Lookup { candidate, value: None, error: Some(error) },
    }
}

/// Takes one candidate through skip-check → metadata lookup → match → copy.
///
/// - **[`Outcome::AlreadyPresent`]**: the skip-gate short-circuits; the
///   metadata service is never called.
/// - **[`Outcome::NoValue`] / [`Outcome::LookupFailed`]**: nothing to match
///   against. Extraction failures are never errors here.
/// - **[`Outcome::Unmatched`]**: nothing is written.
/// - **[`Outcome::Copied`] / [`Outcome::Raced`] / [`Outcome::WouldCopy`]**:
///   the candidate matched.
///
/// # Errors
/// [`Gate`](ErrorKind::Gate) if the destination can't be checked, and
/// [`Copy`](ErrorKind::Copy) if duplicating the file fails. Either only ends
/// this candidate.
pub async fn process_candidate(service: &ServiceHandle, ctx: &Context, candidate: &Candidate) -> Result<Outcome> {
    let source = candidate.path();
    if ctx.destination.is_present(source).await.or_raise(|| ErrorKind::Gate(source.to_path_buf()))? {
        return Ok(Outcome::AlreadyPresent(source.to_path_buf()));
    }

    let lookup = lookup(service, candidate).await;
    let Some(value) = lookup.usable() else {
        return Ok(match lookup.error {
            Some(error) => {
                tracing::debug!(file = %lookup.candidate.name(), error = ?error, "Metadata lookup failed");
                Outcome::LookupFailed { path: source.to_path_buf(), reason: (*error).to_string() }
            },
            None => Outcome::NoValue(source.to_path_buf()),
        });
    };
    if !candidate.query().matcher.is_match(value) {
        return Ok(Outcome::Unmatched { path: source.to_path_buf(), value: value.to_string() });
    }

    let destination = ctx.destination.target_for(source).or_raise(|| ErrorKind::Copy(source.to_path_buf()))?;
    if ctx.dry_run {
        return Ok(Outcome::WouldCopy { source: source.to_path_buf(), destination });
    }
    match ctx.destination.copy_from(source).await.or_raise(|| ErrorKind::Copy(source.to_path_buf()))? {
        CopyOutcome::Copied(bytes) => Ok(Outcome::Copied { source: source.to_path_buf(), destination, bytes }),
        CopyOutcome::AlreadyPresent => Ok(Outcome::Raced(source.to_path_buf())),
    }
}
