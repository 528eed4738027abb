//! Recursive discovery of candidate files.
//!
//! Walks a directory tree using `tokio::fs` and yields the paths of regular
//! files whose extension is in an [`Extensions`] set. Traversal order is
//! whatever the filesystem hands back; consumers must not rely on it.

use crate::error::{Error, ErrorKind, Result};
use async_stream::stream;
use futures::Stream;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs::{self, DirEntry};

pub type LocateStream<'a> = Pin<Box<dyn Stream<Item = Result<PathBuf>> + Send + 'a>>;

enum WalkEntry {
    File(PathBuf),
    Descend(PathBuf),
    Skip,
}

/// A set of file extensions, each stored with its leading dot.
///
/// Matching is case-sensitive: `.JPG` and `.jpg` are different extensions.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use exifsift_storage::Extensions;
///
/// let extensions = Extensions::new([".jpg", "jpeg"]);
/// assert!(extensions.matches(Path::new("/photos/a.jpg")));
/// assert!(extensions.matches(Path::new("/photos/b.jpeg")));
/// assert!(!extensions.matches(Path::new("/photos/c.JPG")));
/// assert!(!extensions.matches(Path::new("/photos/README")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extensions(BTreeSet<String>);
impl Extensions {
    /// Build a set from extensions with or without their leading dot. Empty
    /// entries (and a lone `.`) are ignored.
    pub fn new(extensions: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let set = extensions
            .into_iter()
            .filter_map(|ext| {
                let ext = ext.as_ref().trim().trim_start_matches('.');
                (!ext.is_empty()).then(|| format!(".{ext}"))
            })
            .collect();
        Self(set)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns `true` if the final extension of `path` (dot included) is a
    /// member of this set.
    pub fn matches(&self, path: &Path) -> bool {
        // Everything from the last dot of the file name, so a file named
        // just `.jpg` has the extension `.jpg` (unlike `Path::extension`).
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        match name.rfind('.') {
            Some(dot) => self.0.contains(&name[dot..]),
            None => false,
        }
    }
}
impl Default for Extensions {
    fn default() -> Self {
        Self::new([".jpg", ".jpeg"])
    }
}

/// Stream the paths of every regular file under `root` whose extension is in
/// `extensions`.
///
/// Paths are yielded joined onto `root`, so an absolute root produces
/// absolute paths. Directories are descended into; symlinks and other
/// special files are silently dropped (symlinks are never followed).
///
/// Errors reading a directory or one of its entries are yielded as `Err`
/// items and the walk carries on with the next entry. Whether such an error
/// ends the run is the caller's decision. A directory that vanished between
/// being listed and being read is not an error.
///
/// # Examples
///
/// ```no_run
/// use futures::TryStreamExt;
/// use std::path::Path;
/// use exifsift_storage::{Extensions, locate};
/// # async fn example() -> exifsift_storage::error::Result<()> {
/// let extensions = Extensions::default();
/// let files: Vec<_> = locate(Path::new("/photos"), &extensions).try_collect().await?;
/// # Ok(())
/// # }
/// ```
pub fn locate<'a>(root: &'a Path, extensions: &'a Extensions) -> LocateStream<'a> {
    let mut stack = vec![root.to_path_buf()];

    Box::pin(stream! {
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound && current != root => continue 'dirs,
                Err(err) => {
                    yield Err(Error::from(ErrorKind::from_io(err, &current)));
                    continue 'dirs;
                }
            };

            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    // An iteration error on a directory handle tends to repeat
                    // forever; give up on this directory rather than spin.
                    Err(e) => { yield Err(Error::from(ErrorKind::from_io(e, &current))); break 'entries; },
                };
                match classify(entry, extensions).await {
                    Ok(WalkEntry::File(f)) => yield Ok(f),
                    Ok(WalkEntry::Descend(d)) => stack.push(d),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                };
            }
        }
    })
}

async fn classify(entry: DirEntry, extensions: &Extensions) -> Result<WalkEntry> {
    let path = entry.path();
    // DirEntry::file_type() does not traverse symlinks.
    let file_type = entry.file_type().await.map_err(|e| ErrorKind::from_io(e, &path))?;
    if file_type.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    if file_type.is_file() && extensions.matches(&path) {
        return Ok(WalkEntry::File(path));
    }
    Ok(WalkEntry::Skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, TryStreamExt};
    use rstest::rstest;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"data").unwrap();
    }

    async fn collect(root: &Path, extensions: &Extensions) -> Vec<PathBuf> {
        let mut files: Vec<_> = locate(root, extensions).try_collect().await.unwrap();
        files.sort();
        files
    }

    #[rstest]
    #[case(&[".jpg", ".jpeg"], &[".jpeg", ".jpg"])]
    #[case(&["jpg", "png"], &[".jpg", ".png"])]
    #[case(&[" .tif ", "", "."], &[".tif"])]
    fn test_extensions_normalized(#[case] input: &[&str], #[case] expected: &[&str]) {
        let extensions = Extensions::new(input);
        assert_eq!(extensions.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_extensions_case_sensitive() {
        let extensions = Extensions::default();
        assert!(extensions.matches(Path::new("a.jpg")));
        assert!(!extensions.matches(Path::new("a.JPG")));
        assert!(!extensions.matches(Path::new("a.jpg.bak")));
        assert!(!extensions.matches(Path::new("jpg")));
    }

    #[rstest]
    #[case("/photos/.jpg", true)]
    #[case("/photos/.hidden.jpg", true)]
    #[case("/photos/a.b.jpeg", true)]
    #[case("/photos/a.", false)]
    #[case("/photos/.", false)]
    #[case("/photos.jpg/", true)]
    #[case("/photos.jpg/a", false)]
    fn test_extension_is_suffix_after_last_dot(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(Extensions::default().matches(Path::new(path)), expected);
    }

    #[tokio::test]
    async fn test_locate_finds_dot_named_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(root, ".jpg");
        touch(root, "nested/.jpeg");
        let files = collect(root, &Extensions::default()).await;
        assert_eq!(files, vec![root.join(".jpg"), root.join("nested/.jpeg")]);
    }

    #[tokio::test]
    async fn test_locate_recurses_and_filters() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(root, "a.jpg");
        touch(root, "2023/b.jpeg");
        touch(root, "2023/06/deep/c.jpg");
        touch(root, "2023/notes.txt");
        touch(root, "d.JPG");
        let files = collect(root, &Extensions::default()).await;
        assert_eq!(
            files,
            vec![root.join("2023/06/deep/c.jpg"), root.join("2023/b.jpeg"), root.join("a.jpg")]
        );
    }

    #[tokio::test]
    async fn test_locate_skips_directories_with_matching_names() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("album.jpg")).unwrap();
        touch(root, "album.jpg/inside.jpg");
        let files = collect(root, &Extensions::default()).await;
        assert_eq!(files, vec![root.join("album.jpg/inside.jpg")]);
    }

    #[tokio::test]
    async fn test_locate_empty_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(collect(temp_dir.path(), &Extensions::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_locate_missing_root_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope");
        let extensions = Extensions::default();
        let results: Vec<_> = locate(&missing, &extensions).collect().await;
        assert_eq!(results.len(), 1);
        let err = results.into_iter().next().unwrap().unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_locate_does_not_follow_symlinks() {
        let temp_dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        touch(outside.path(), "elsewhere.jpg");
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("elsewhere.jpg"), temp_dir.path().join("link.jpg")).unwrap();
        assert!(collect(temp_dir.path(), &Extensions::default()).await.is_empty());
    }
}
