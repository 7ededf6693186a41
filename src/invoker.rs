//! Generator invocation
//!
//! Runs the generator bound to an artifact's language against the staged
//! input, inside the staging directory, and waits for it for at most the
//! configured timeout. A generator that outlives the timeout is killed along
//! with every process it started in its group.

use crate::staging::TempWorkspace;
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, Command};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default time allowed for one generator run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long stderr may keep draining after the generator exits
const STDERR_DRAIN: Duration = Duration::from_millis(500);

/// Flag carrying the staged input path
pub const BASE_PACKAGE_FLAG: &str = "--base-package=";

/// Outcome of one generator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationResult {
    /// The process exited before the timeout. The exit code is informational only.
    Completed {
        diagnostics: String,
        exit_code: Option<i32>,
    },
    /// The process was still running at the timeout and has been killed
    TimedOut {
        #[serde(rename = "after_ms", serialize_with = "serialize_millis")]
        after: Duration,
    },
    /// The process could not be started or waited on
    Failed { reason: String },
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Runs generator executables with a bounded wait
#[derive(Debug, Clone)]
pub struct GeneratorInvoker {
    timeout: Duration,
}

impl Default for GeneratorInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl GeneratorInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `generator` against `workspace`, blocking the caller until it exits or times out
    pub fn invoke(&self, generator: &Path, workspace: &TempWorkspace) -> GenerationResult {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                return GenerationResult::Failed {
                    reason: format!("Failed to create runtime: {}", e),
                }
            }
        };
        rt.block_on(self.run(generator, workspace.input(), workspace.dir()))
    }

    async fn run(&self, generator: &Path, input: &Path, working_dir: &Path) -> GenerationResult {
        let deadline = Instant::now() + self.timeout;

        let mut command = Command::new(generator);
        command
            .arg(format!("{}{}", BASE_PACKAGE_FLAG, input.display()))
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // The generator leads its own process group so its helpers can be signalled with it.
        #[cfg(unix)]
        command.process_group(0);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return GenerationResult::Failed {
                    reason: format!("Failed to start {}: {}", generator.display(), e),
                }
            }
        };
        // `Child::id` is gone once the child is reaped; keep it for the group kill.
        let pid = child.id();
        debug!(generator = %generator.display(), pid = ?pid, "Generator started");

        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut reader = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(drain_stderr(stderr, Arc::clone(&captured))));

        let status = match tokio::time::timeout_at(deadline, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                kill_process_group(pid);
                if let Some(reader) = reader {
                    reader.abort();
                }
                return GenerationResult::Failed {
                    reason: format!("Failed to wait for {}: {}", generator.display(), e),
                };
            }
            Err(_) => {
                warn!(
                    generator = %generator.display(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Generator timed out; killing its process group"
                );
                kill_process_group(pid);
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed out generator");
                }
                if let Some(reader) = reader {
                    reader.abort();
                }
                return GenerationResult::TimedOut {
                    after: self.timeout,
                };
            }
        };

        // Helpers the generator left running in its group go down with it.
        kill_process_group(pid);

        // A process outside the group may still hold the pipe; keep what has arrived.
        if let Some(reader) = reader.as_mut() {
            let drain_until = std::cmp::min(deadline, Instant::now() + STDERR_DRAIN);
            if tokio::time::timeout_at(drain_until, &mut *reader).await.is_err() {
                warn!("Generator stderr still open after exit; keeping what was read");
                reader.abort();
            }
        }
        let stderr_bytes = std::mem::take(&mut *lock_buffer(&captured));

        debug!(exit_code = ?status.code(), stderr_bytes = stderr_bytes.len(), "Generator exited");
        GenerationResult::Completed {
            diagnostics: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            exit_code: status.code(),
        }
    }
}

/// Copy stderr into `captured` chunk by chunk until EOF
async fn drain_stderr(mut stderr: ChildStderr, captured: Arc<Mutex<Vec<u8>>>) {
    let mut chunk = [0u8; 4096];
    loop {
        match stderr.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => lock_buffer(&captured).extend_from_slice(&chunk[..n]),
            Err(e) => {
                warn!(error = %e, "Failed to read generator stderr");
                break;
            }
        }
    }
}

fn lock_buffer(buffer: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buffer.lock().unwrap_or_else(|e| e.into_inner())
}

/// SIGKILL every process left in the generator's group
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        Ok(()) => debug!(pgid = pid, "Signalled generator process group"),
        Err(Errno::ESRCH) => {}
        Err(e) => warn!(pgid = pid, error = %e, "Failed to signal generator process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
