//! Path helpers shared by the gate and the copier.
//!
//! Destination naming is flat: `destination/basename(source)`. No
//! restructuring, renaming or collision disambiguation happens here.

use crate::error::{ErrorKind, Result};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Returns the final component of `path`, the name a copy will carry in the
/// destination directory.
///
/// Rejects paths without a normal final component (`/`, `..`, empty) and
/// names containing null bytes, which would be truncated by C-based syscalls.
///
/// # Examples
///
/// ```
/// use std::ffi::OsStr;
/// use std::path::Path;
/// use exifsift_storage::base_name;
/// assert_eq!(base_name(Path::new("/photos/2023/a.jpg")).unwrap(), OsStr::new("a.jpg"));
/// assert!(base_name(Path::new("/")).is_err());
/// assert!(base_name(Path::new("photos/..")).is_err());
/// ```
pub fn base_name(path: &Path) -> Result<&OsStr> {
    // `Path::file_name()` would happily resolve "a/b/.." to "b"; only accept
    // a genuinely normal trailing component.
    match path.components().next_back() {
        Some(Component::Normal(name)) if !name.as_encoded_bytes().contains(&0) => Ok(name),
        _ => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
    }
}

/// Joins the base name of `source` onto `directory`.
pub fn destination_for(directory: &Path, source: &Path) -> Result<PathBuf> {
    Ok(directory.join(base_name(source)?))
}

/// Lossy, display-friendly base name for log lines. Falls back to the whole
/// path when there is no usable final component.
pub fn display_name(path: &Path) -> String {
    match base_name(path) {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/photos/a.jpg", "a.jpg")]
    #[case("relative/dir/b.jpeg", "b.jpeg")]
    #[case("c.jpg", "c.jpg")]
    #[case("/photos/./d.jpg", "d.jpg")]
    // Trailing slashes are dropped by the component parser.
    #[case("/photos/e.jpg/", "e.jpg")]
    fn test_base_name(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(base_name(Path::new(path)).unwrap(), OsStr::new(expected));
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("..")]
    #[case("photos/..")]
    #[case("a\0b.jpg")]
    fn test_base_name_invalid(#[case] path: &str) {
        let err = base_name(Path::new(path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[test]
    fn test_destination_is_flat() {
        let target = destination_for(Path::new("/out"), Path::new("/in/2023/06/beach.jpg")).unwrap();
        assert_eq!(target, Path::new("/out/beach.jpg"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/in/sunset.jpg")), "sunset.jpg");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
