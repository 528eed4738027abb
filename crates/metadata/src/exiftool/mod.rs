//! [`MetadataService`] backed by Phil Harvey's ExifTool.
//!
//! Spawning exiftool per file costs more than the lookup itself, so a single
//! process is started in `-stay_open` mode and fed requests for the lifetime
//! of the [`ExifTool`] value. The process handles one request at a time;
//! access is serialized behind a mutex. This is the one point where
//! concurrent pipeline tasks actually wait on each other.

#[cfg(all(test, unix))]
mod fake;
mod response;
mod session;

use self::session::Session;
use crate::MetadataService;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const EXECUTABLE: &str = "exiftool";
/// Restarts allowed without a successful lookup in between. Past this the
/// session is considered broken and every lookup fails with `Closed`.
const MAX_CONSECUTIVE_RESTARTS: u32 = 3;

/// How to find and drive the exiftool executable.
#[derive(Debug, Clone)]
pub struct Options {
    /// Explicit executable. Looked up in `PATH` when unset.
    pub executable: Option<PathBuf>,
    /// Upper bound for a single lookup (and for the startup handshake).
    pub timeout: Duration,
}
impl Default for Options {
    fn default() -> Self {
        Self { executable: None, timeout: Duration::from_secs(30) }
    }
}

/// A running exiftool session.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use exifsift_metadata::{ExifTool, MetadataService, Options};
/// # async fn example() -> exifsift_metadata::error::Result<()> {
/// let exiftool = ExifTool::open(Options::default()).await?;
/// let keywords = exiftool.extract(Path::new("/photos/a.jpg"), "Keywords").await?;
/// exiftool.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct ExifTool {
    executable: PathBuf,
    version: String,
    timeout: Duration,
    sequence: AtomicU64,
    restarts: AtomicU32,
    session: Mutex<Option<Session>>,
}
impl ExifTool {
    /// Find exiftool, start it, and check that it answers.
    ///
    /// # Errors
    /// [`Unavailable`](ErrorKind::Unavailable) if the executable can't be
    /// found, can't be started, or doesn't answer the `-ver` handshake
    /// within the timeout.
    pub async fn open(options: Options) -> Result<Self> {
        let executable = discover(options.executable.as_deref())?;
        let mut session = Session::spawn(&executable)?;
        let version = tokio::time::timeout(options.timeout, session.execute(0, &[OsStr::new("-ver")]))
            .await
            .or_raise(|| ErrorKind::Timeout(executable.clone()))
            .and_then(|answer| answer)
            .or_raise(|| ErrorKind::Unavailable)?;
        let version = String::from_utf8_lossy(&version).trim().to_string();
        tracing::info!(executable = %executable.display(), %version, "ExifTool session started");
        Ok(Self {
            executable,
            version,
            timeout: options.timeout,
            sequence: AtomicU64::new(1),
            restarts: AtomicU32::new(0),
            session: Mutex::new(Some(session)),
        })
    }

    /// Version string reported by exiftool during the handshake.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// A fresh process to replace one that died or hung, unless too many
    /// replacements in a row have already failed to produce an answer.
    fn respawn(&self) -> Option<Session> {
        let restarts = self.restarts.fetch_add(1, Ordering::Relaxed);
        if restarts >= MAX_CONSECUTIVE_RESTARTS {
            tracing::error!(restarts, "exiftool keeps failing; giving up on the session");
            return None;
        }
        Session::spawn(&self.executable).inspect_err(|e| tracing::error!(error = ?e, "Could not restart exiftool")).ok()
    }
}

#[async_trait]
impl MetadataService for ExifTool {
    fn name(&self) -> &str {
        EXECUTABLE
    }

    async fn extract(&self, path: &Path, key: &str) -> Result<Option<String>> {
        // exiftool would read a relative path starting with `-` as an option.
        let path: Cow<'_, Path> = match path.is_relative() {
            true => Cow::Owned(Path::new(".").join(path)),
            false => Cow::Borrowed(path),
        };
        let tag = format!("-{key}");
        let args = [OsStr::new("-json"), OsStr::new(&tag), path.as_os_str()];
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);

        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut() else {
            exn::bail!(ErrorKind::Closed);
        };
        let output = match tokio::time::timeout(self.timeout, session.execute(id, &args)).await {
            Ok(Ok(output)) => {
                self.restarts.store(0, Ordering::Relaxed);
                output
            },
            Ok(Err(e)) => {
                if matches!(&*e, ErrorKind::Closed | ErrorKind::Io) {
                    // The process died (or its pipes broke) on this file.
                    // Only this file fails; the next one gets a new process.
                    tracing::warn!(path = %path.display(), error = ?e, "exiftool session lost; restarting");
                    *guard = self.respawn();
                }
                return Err(e);
            },
            Err(_) => {
                // Whatever exiftool is chewing on may never finish. Replace
                // the process; dropping the old one kills it.
                tracing::warn!(path = %path.display(), timeout = ?self.timeout, "exiftool timed out; restarting session");
                *guard = self.respawn();
                exn::bail!(ErrorKind::Timeout(path.into_owned()));
            },
        };
        drop(guard);

        if output.trim_ascii().is_empty() {
            exn::bail!(ErrorKind::Unreadable(path.into_owned()));
        }
        response::parse(&output, key)
    }

    async fn close(&self) -> Result<()> {
        let Some(session) = self.session.lock().await.take() else {
            return Ok(());
        };
        session.shutdown(self.timeout).await?;
        tracing::info!("ExifTool session closed");
        Ok(())
    }
}

/// Locate the exiftool executable: the configured one if given (resolved
/// through `PATH` when it's a bare name), otherwise `exiftool` from `PATH`.
fn discover(explicit: Option<&Path>) -> Result<PathBuf> {
    let wanted = explicit.map(Path::as_os_str).unwrap_or(OsStr::new(EXECUTABLE));
    match which::which(wanted) {
        Ok(path) => Ok(path),
        Err(e) => {
            tracing::info!(executable = %wanted.to_string_lossy(), "exiftool executable not found");
            Err(e).or_raise(|| ErrorKind::Unavailable)
        },
    }
}
