//! Destination directory handling.
//!
//! The [`Destination`] answers one question before any expensive work is done
//! for a candidate: does a file with the same base name already sit in the
//! destination directory? The answer is advisory. Another task, or something
//! outside this process, may create the same file between the check and a
//! later copy. [`Destination::copy_from`] closes that window as far as the
//! filesystem allows by refusing to clobber.

use crate::copy::{CopyOutcome, copy_file};
use crate::error::{ErrorKind, Result};
use crate::path::destination_for;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A flat destination directory receiving copies under their original base
/// names.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use exifsift_storage::Destination;
/// # async fn example() -> exifsift_storage::error::Result<()> {
/// let destination = Destination::new("/srv/selected")?;
/// if !destination.is_present(Path::new("/photos/a.jpg")).await? {
///     destination.copy_from(Path::new("/photos/a.jpg")).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Destination {
    root: PathBuf,
}
impl Destination {
    /// Wrap an existing directory.
    ///
    /// Unlike a library root, the destination is never created on demand:
    /// a missing directory is almost always a typo on the command-line.
    ///
    /// # Errors
    /// [`NotFound`](ErrorKind::NotFound) if nothing exists at `root`, or
    /// [`NotADirectory`](ErrorKind::NotADirectory) if it isn't a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        // Use non-async here; it only happens once at startup.
        let metadata = std::fs::metadata(&root).map_err(|e| ErrorKind::from_io(e, &root))?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path a copy of `source` would occupy.
    pub fn target_for(&self, source: &Path) -> Result<PathBuf> {
        destination_for(&self.root, source)
    }

    /// Returns `true` if a file with `source`'s base name already exists in
    /// the destination directory.
    pub async fn is_present(&self, source: &Path) -> Result<bool> {
        let target = self.target_for(source)?;
        Ok(fs::try_exists(&target).await.map_err(|e| ErrorKind::from_io(e, &target))?)
    }

    /// Copy `source` into the destination directory under its base name.
    ///
    /// Returns [`CopyOutcome::AlreadyPresent`] (not an error) if the target
    /// appeared since the last [`is_present`](Self::is_present) check.
    pub async fn copy_from(&self, source: &Path) -> Result<CopyOutcome> {
        let target = self.target_for(source)?;
        copy_file(source, &target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_existing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(Destination::new(temp_dir.path()).is_ok());

        let err = Destination::new(temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));

        let file = temp_dir.path().join("file.jpg");
        std::fs::write(&file, b"data").unwrap();
        let err = Destination::new(&file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotADirectory(_)));
    }

    #[test]
    fn test_target_for_uses_base_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let destination = Destination::new(temp_dir.path()).unwrap();
        let target = destination.target_for(Path::new("/photos/2023/06/a.jpg")).unwrap();
        assert_eq!(target, temp_dir.path().join("a.jpg"));
    }

    #[tokio::test]
    async fn test_is_present() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let destination = Destination::new(dest_dir.path()).unwrap();
        // The source itself doesn't have to exist for the gate to answer.
        let source = source_dir.path().join("nested/a.jpg");
        assert!(!destination.is_present(&source).await.unwrap());
        std::fs::write(dest_dir.path().join("a.jpg"), b"other bytes").unwrap();
        assert!(destination.is_present(&source).await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_from() {
        let source_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let destination = Destination::new(dest_dir.path()).unwrap();
        let source = source_dir.path().join("a.jpg");
        std::fs::write(&source, b"\xFF\xD8\xFFjpeg").unwrap();

        let outcome = destination.copy_from(&source).await.unwrap();
        assert_eq!(outcome, CopyOutcome::Copied(7));
        assert_eq!(std::fs::read(dest_dir.path().join("a.jpg")).unwrap(), b"\xFF\xD8\xFFjpeg");
        assert!(destination.is_present(&source).await.unwrap());

        let outcome = destination.copy_from(&source).await.unwrap();
        assert_eq!(outcome, CopyOutcome::AlreadyPresent);
    }
}
