//! A single `exiftool -stay_open True -@ -` child process.
//!
//! Arguments are written to stdin one per line, and `-execute<N>` tells
//! exiftool to run everything since the previous `-execute`. When it's done
//! it prints `{ready<N>}` on stdout. Numbering the requests means the output
//! of an abandoned request (the caller timed out and dropped the future) can
//! be recognised and skipped by the next one.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

pub(super) struct Session {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}
impl Session {
    pub(super) fn spawn(executable: &Path) -> Result<Self> {
        let mut child = Command::new(executable)
            .args(["-stay_open", "True", "-@", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            // Per-file complaints ("File not found", "Unknown file type")
            // go to stderr. An empty stdout tells us the same thing.
            .stderr(Stdio::null())
            // The session must not outlive the run, however the run ends.
            .kill_on_drop(true)
            .spawn()
            .or_raise(|| ErrorKind::Unavailable)?;
        let stdin = child.stdin.take().ok_or_raise(|| ErrorKind::Unavailable)?;
        let stdout = child.stdout.take().ok_or_raise(|| ErrorKind::Unavailable)?;
        Ok(Self { child, stdin, stdout: BufReader::new(stdout) })
    }

    /// Send one request and collect everything exiftool printed for it.
    ///
    /// Not cancel-safe on its own: dropping the future part-way leaves
    /// unread output in the pipe. That output is discarded by the next call
    /// because its `{ready<N>}` marker won't match.
    pub(super) async fn execute(&mut self, id: u64, args: &[&OsStr]) -> Result<Vec<u8>> {
        let mut request = Vec::new();
        for arg in args {
            let bytes = arg.as_encoded_bytes();
            if bytes.iter().any(|b| matches!(b, b'\n' | b'\r')) {
                exn::bail!(ErrorKind::InvalidArgument(arg.to_string_lossy().into_owned()));
            }
            request.extend_from_slice(bytes);
            request.push(b'\n');
        }
        request.extend_from_slice(format!("-execute{id}\n").as_bytes());
        self.stdin.write_all(&request).await.or_raise(|| ErrorKind::Io)?;
        self.stdin.flush().await.or_raise(|| ErrorKind::Io)?;

        let marker = format!("{{ready{id}}}");
        let mut output = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.stdout.read_until(b'\n', &mut line).await.or_raise(|| ErrorKind::Io)? == 0 {
                // EOF: exiftool went away.
                exn::bail!(ErrorKind::Closed);
            }
            let trimmed = line.trim_ascii_end();
            if trimmed.starts_with(b"{ready") && trimmed.ends_with(b"}") {
                if trimmed == marker.as_bytes() {
                    return Ok(output);
                }
                // Tail end of an abandoned request.
                output.clear();
                continue;
            }
            output.extend_from_slice(&line);
        }
    }

    /// Ask exiftool to exit, and kill it if it doesn't within `grace`.
    pub(super) async fn shutdown(mut self, grace: Duration) -> Result<()> {
        let asked = async {
            self.stdin.write_all(b"-stay_open\nFalse\n").await?;
            self.stdin.flush().await
        }
        .await;
        if let Err(e) = asked {
            tracing::debug!(error = %e, "Could not ask exiftool to exit; killing it");
            return self.child.kill().await.or_raise(|| ErrorKind::Io);
        }
        drop(self.stdin);
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => {
                let status = status.or_raise(|| ErrorKind::Io)?;
                tracing::debug!(%status, "exiftool exited");
                Ok(())
            },
            Err(_) => {
                tracing::warn!("exiftool did not exit in time; killing it");
                self.child.kill().await.or_raise(|| ErrorKind::Io)
            },
        }
    }
}
