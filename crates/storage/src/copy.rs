//! Full-content file duplication that never overwrites.
//!
//! Bytes are streamed into a temporary file created beside the target, then
//! the temporary file is moved into place with an exclusive (no-clobber)
//! rename. Readers of the destination directory therefore see either no file
//! or a complete one, never a partial write. The temporary file is removed on
//! every failure path when its handle drops. The copy takes the source's
//! permission bits rather than the temporary file's private ones.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

const TEMP_PREFIX: &str = ".exifsift-";
const TEMP_SUFFIX: &str = ".part";

/// What [`copy_file`] actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The target was written; carries the number of bytes copied.
    Copied(u64),
    /// The target already existed, either before the copy started or by the
    /// time it was ready to be moved into place. Nothing was changed.
    AlreadyPresent,
}

/// Copy `source` to `target` without ever replacing an existing `target`.
///
/// The blocking I/O runs on Tokio's blocking pool.
///
/// # Errors
/// - [`NotFound`](ErrorKind::NotFound) / [`PermissionDenied`](ErrorKind::PermissionDenied)
///   when the source can't be opened or the target directory can't be
///   written to.
/// - [`InvalidPath`](ErrorKind::InvalidPath) when `target` has no parent.
/// - [`Io`](ErrorKind::Io) for any other read/write failure.
/// - [`Aborted`](ErrorKind::Aborted) if the blocking task panicked.
pub async fn copy_file(source: &Path, target: &Path) -> Result<CopyOutcome> {
    let (source, target) = (source.to_path_buf(), target.to_path_buf());
    let label = source.clone();
    tokio::task::spawn_blocking(move || copy_blocking(&source, &target))
        .await
        .or_raise(|| ErrorKind::Aborted(label))?
}

fn copy_blocking(source: &Path, target: &Path) -> Result<CopyOutcome> {
    let parent = target.parent().filter(|p| !p.as_os_str().is_empty());
    let Some(parent) = parent else {
        exn::bail!(ErrorKind::InvalidPath(target.to_path_buf()));
    };
    // Cheap re-check: another task may have finished this file while we were
    // waiting on metadata extraction.
    if target.try_exists().map_err(|e| ErrorKind::from_io(e, target))? {
        return Ok(CopyOutcome::AlreadyPresent);
    }

    let file = File::open(source).map_err(|e| ErrorKind::from_io(e, source))?;
    let permissions = file.metadata().map_err(|e| ErrorKind::from_io(e, source))?.permissions();
    let mut reader = BufReader::new(file);
    let mut staged = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(parent)
        .map_err(|e| ErrorKind::from_io(e, parent))?;
    let bytes = io::copy(&mut reader, &mut staged).map_err(ErrorKind::Io)?;
    staged.as_file().set_permissions(permissions).map_err(ErrorKind::Io)?;
    staged.as_file().sync_all().map_err(ErrorKind::Io)?;

    match staged.persist_noclobber(target) {
        Ok(_) => Ok(CopyOutcome::Copied(bytes)),
        // Lost the race. The PersistError owns the temp file; dropping it
        // deletes the staged copy.
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!(target = %target.display(), "Destination appeared while copying; discarding staged copy");
            Ok(CopyOutcome::AlreadyPresent)
        },
        Err(e) => Err(ErrorKind::from_io(e.error, PathBuf::from(target)).into()),
    }
}
