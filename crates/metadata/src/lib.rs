//! Metadata extraction for exifsift.
//!
//! The pipeline never parses image formats itself. It asks a
//! [`MetadataService`] for the value of one key in one file and gets back a
//! string, nothing, or an error. The production implementation is
//! [`ExifTool`], which keeps a single `exiftool -stay_open` process alive for
//! the whole run.

pub mod error;
mod exiftool;
#[cfg(feature = "mock")]
mod mock;

pub use crate::exiftool::{ExifTool, Options};
#[cfg(feature = "mock")]
pub use crate::mock::MockService;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub type ServiceHandle = Arc<dyn MetadataService + Send + Sync>;

/// A session against a metadata extraction backend.
///
/// A session is opened once per run and shared by every concurrent task, so
/// implementations must be safe to call concurrently through `&self`. If the
/// underlying backend can only handle one request at a time, the
/// implementation serializes access internally.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use exifsift_metadata::{MetadataService, error::Result};
///
/// async fn keywords(service: &dyn MetadataService, photo: &Path) -> Result<String> {
///     Ok(service.extract(photo, "Keywords").await?.unwrap_or_default())
/// }
/// ```
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Name of the backend, for logging.
    fn name(&self) -> &str;

    /// Look up `key` in the embedded metadata of the file at `path`.
    ///
    /// Returns `Ok(None)` when the file has no such key. Multi-valued keys
    /// are flattened into a single `", "`-separated string.
    async fn extract(&self, path: &Path, key: &str) -> Result<Option<String>>;

    /// Release the session. Calls after this return
    /// [`Closed`](crate::error::ErrorKind::Closed). Closing twice is a no-op.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
