//! External command execution utilities.
//!
//! `exec!` runs a short local command and fails with its stderr.
//! [`exec_bounded`] runs a command that may block on the network: it is
//! killed when it exceeds its timeout or when the [`CancelToken`] fires.

use crate::log;
use anyhow::{Context, Result};
use std::{
    ffi::OsString,
    io::{self, Read},
    path::Path,
    process::{Child, Command, ExitStatus, Output, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use thiserror::Error;

// ============================================================================
// Macros
// ============================================================================

/// Run an external command with arguments.
///
/// # Examples
/// ```ignore
/// // Without working directory
/// exec!(["git"]; "status", "-s")?;
///
/// // With working directory
/// exec!(root; ["git"]; "remote", "add", "origin", url)?;
/// ```
#[macro_export]
macro_rules! exec {
    ($root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::exec(
            Some($root),
            &$crate::utils::exec::internal::to_cmd_vec($cmd),
            &$crate::utils::exec::internal::filter_args(&[$($crate::utils::exec::internal::to_os($arg)),*]),
        )
    };
    ($cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::exec(
            None,
            &$crate::utils::exec::internal::to_cmd_vec($cmd),
            &$crate::utils::exec::internal::filter_args(&[$($crate::utils::exec::internal::to_os($arg)),*]),
        )
    };
}

// ============================================================================
// Argument Conversion
// ============================================================================

#[doc(hidden)]
pub mod internal {
    use std::ffi::OsString;

    /// Convert to `OsString`.
    #[inline]
    pub fn to_os<S: Into<OsString>>(s: S) -> OsString {
        s.into()
    }

    /// Trait for converting to command vector.
    pub trait ToCmd {
        fn to_cmd(self) -> Vec<OsString>;
    }

    impl<const N: usize> ToCmd for [&str; N] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.into_iter().map(OsString::from).collect()
        }
    }

    impl ToCmd for &[String] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.iter().map(OsString::from).collect()
        }
    }

    /// Convert command to Vec<OsString>.
    #[inline]
    pub fn to_cmd_vec<C: ToCmd>(cmd: C) -> Vec<OsString> {
        cmd.to_cmd()
    }

    /// Filter out empty args.
    #[inline]
    pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
        args.iter().filter(|a| !a.is_empty()).cloned().collect()
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Shared flag that aborts a running [`exec_bounded`] call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a command and capture its output.
///
/// # Errors
/// Returns error if command fails to execute or returns non-zero exit code.
pub fn exec(root: Option<&Path>, cmd: &[OsString], args: &[OsString]) -> Result<Output> {
    let (name, mut command) = prepare(root, cmd, args)?;

    let output = command
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    if !output.status.success() {
        anyhow::bail!(format_error(&name, output.status, &output.stderr));
    }
    Ok(output)
}

/// Failure of a bounded command.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to run `{name}`")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{}", format_error(.name, *.status, .stderr.as_bytes()))]
    Failed {
        name: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{name}` timed out after {}s", .after.as_secs())]
    TimedOut { name: String, after: Duration },

    #[error("`{name}` was cancelled")]
    Cancelled { name: String },
}

/// Limits applied to a bounded command.
pub struct Bounds<'a> {
    pub timeout: Duration,
    pub cancel: &'a CancelToken,
    pub envs: &'a [(&'a str, OsString)],
}

/// How often a bounded child is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Execute a command that must finish within `bounds`.
///
/// stdout/stderr are drained on helper threads so a chatty child can
/// never block on a full pipe while we poll it.
pub fn exec_bounded(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
    bounds: &Bounds<'_>,
) -> Result<Output, ExecError> {
    let (name, mut command) = prepare(root, cmd, args).map_err(|e| ExecError::Spawn {
        name: cmd
            .first()
            .map(|c| c.to_string_lossy().into_owned())
            .unwrap_or_default(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
    })?;

    for (key, value) in bounds.envs {
        command.env(key, value);
    }
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| ExecError::Spawn {
        name: name.clone(),
        source,
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(source) => return Err(ExecError::Spawn { name, source }),
        }

        if bounds.cancel.is_cancelled() {
            kill(&mut child);
            return Err(ExecError::Cancelled { name });
        }
        if started.elapsed() >= bounds.timeout {
            kill(&mut child);
            return Err(ExecError::TimedOut {
                name,
                after: bounds.timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let output = Output {
        status,
        stdout: join(stdout),
        stderr: join(stderr),
    };

    if !output.status.success() {
        return Err(ExecError::Failed {
            name,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    // git reports progress on stderr even on success
    let progress = String::from_utf8_lossy(&output.stderr);
    for line in progress.lines().map(str::trim).filter(|l| !l.is_empty()) {
        log!(&name; "{}", line);
    }

    Ok(output)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Prepare a Command from components.
fn prepare(root: Option<&Path>, cmd: &[OsString], args: &[OsString]) -> Result<(String, Command)> {
    let name = cmd
        .first()
        .and_then(|s| s.to_str())
        .context("Empty command")?
        .to_owned();

    let mut command = Command::new(&cmd[0]);
    command.args(&cmd[1..]).args(args);

    if let Some(dir) = root {
        command.current_dir(dir);
    }

    Ok((name, command))
}

/// Format command error message.
fn format_error(name: &str, status: ExitStatus, stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let mut msg = format!("Command `{name}` failed with {status}");
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(stderr);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================
