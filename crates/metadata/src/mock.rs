//! In-memory metadata service for testing.

use crate::MetadataService;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// In-memory metadata service for testing.
///
/// Values are fixed at construction. Every call to
/// [`extract`](MetadataService::extract) is recorded, so tests can assert
/// which files were (or weren't) looked up.
///
/// # Examples
///
/// ```
/// use exifsift_metadata::{MetadataService, MockService};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = MockService::with_values([
///     ("/photos/a.jpg", "Keywords", "sunset beach"),
/// ]);
/// let value = service.extract(Path::new("/photos/a.jpg"), "Keywords").await.ok().flatten();
/// assert_eq!(value.as_deref(), Some("sunset beach"));
/// assert_eq!(service.lookups().await, vec![Path::new("/photos/a.jpg").to_path_buf()]);
/// # Ok(())
/// # }
/// ```
pub struct MockService {
    name: String,
    values: HashMap<PathBuf, HashMap<String, String>>,
    failures: HashSet<PathBuf>,
    lookups: Mutex<Vec<PathBuf>>,
    closed: AtomicBool,
}

impl MockService {
    /// Create a mock service answering with the given `(path, key, value)`
    /// triples.
    pub fn with_values(
        values: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let mut map: HashMap<PathBuf, HashMap<String, String>> = HashMap::new();
        for (path, key, value) in values {
            map.entry(path.into()).or_default().insert(key.into(), value.into());
        }
        Self {
            name: "mock".to_string(),
            values: map,
            failures: HashSet::new(),
            lookups: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Make every lookup for `path` fail with an I/O error.
    pub fn with_failure(mut self, path: impl Into<PathBuf>) -> Self {
        self.failures.insert(path.into());
        self
    }

    /// Every path passed to [`extract`](MetadataService::extract), in call
    /// order.
    pub async fn lookups(&self) -> Vec<PathBuf> {
        self.lookups.lock().await.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
impl Default for MockService {
    fn default() -> Self {
        let values: [(&str, &str, &str); 0] = [];
        Self::with_values(values)
    }
}

#[async_trait]
impl MetadataService for MockService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, path: &Path, key: &str) -> Result<Option<String>> {
        self.lookups.lock().await.push(path.to_path_buf());
        if self.is_closed() {
            exn::bail!(ErrorKind::Closed);
        }
        if self.failures.contains(path) {
            exn::bail!(ErrorKind::Io);
        }
        Ok(self.values.get(path).and_then(|keys| keys.get(key)).cloned())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_failures_and_close() {
        let service = MockService::with_values([("/a.jpg", "Keywords", "beach"), ("/a.jpg", "Make", "Canon")])
            .with_failure("/broken.jpg");
        assert_eq!(service.extract(Path::new("/a.jpg"), "Make").await.unwrap().as_deref(), Some("Canon"));
        assert_eq!(service.extract(Path::new("/a.jpg"), "Artist").await.unwrap(), None);
        assert_eq!(service.extract(Path::new("/b.jpg"), "Keywords").await.unwrap(), None);
        let err = service.extract(Path::new("/broken.jpg"), "Keywords").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io));
        assert_eq!(service.lookups().await.len(), 4);

        service.close().await.unwrap();
        assert!(service.is_closed());
        let err = service.extract(Path::new("/a.jpg"), "Make").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Closed));
    }
}
