//! External collaborators: process execution and file reads
//!
//! The inventory pipeline never touches `std::process` or `std::fs` directly.
//! It goes through the [`CommandRunner`] and [`FileReader`] traits so tests can
//! inject in-memory fakes and the real host gets [`SystemCommandRunner`] and
//! [`FsFileReader`].
//!
//! # Timeouts
//!
//! `SystemCommandRunner` spawns the child with piped output, drains stdout and
//! stderr on two reader threads (a full pipe would otherwise stall the child),
//! and polls `try_wait` until the caller's deadline. On expiry the child is
//! killed and reaped, and `ExecutionError::TimedOut` is returned.
//!
//! A grandchild may inherit the pipes and hold them open after the child
//! exits. Output is therefore collected for at most [`DRAIN_GRACE`] past the
//! exit, and whatever arrived by then is returned. Commands marked [`CommandSpec::detached`] get null stdio and
//! report only their exit status.

use crate::error::{ExecutionError, FileReadError};
use std::fmt;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Interval between `try_wait` polls while a child is running
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long output is still collected after the child has exited
pub const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// A program plus its arguments, executed without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Arguments passed verbatim
    pub args: Vec<String>,
    /// Whether stdout and stderr are captured; `false` runs with null stdio
    pub capture_output: bool,
}

impl CommandSpec {
    /// Create a command spec from a program and its arguments
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            capture_output: true,
        }
    }

    /// Run with null stdio, keeping only the exit status
    ///
    /// Used for open commands whose launched application would otherwise
    /// inherit the output pipes.
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.capture_output = false;
        self
    }
}

/// Renders the command shell-quoted, e.g. `open /Applications/Safari.app`
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(joined) => f.write_str(&joined),
            // Nul bytes cannot be quoted; fall back to a plain join for display
            Err(_) => write!(f, "{} {}", self.program, self.args.join(" ")),
        }
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded as UTF-8
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8
    pub stderr: String,
    /// Exit code, `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Whether the command exited with status 0
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Process-execution collaborator
///
/// Implementations must be safe to call from several threads at once: two
/// launches of the same path run concurrently and spawn two processes.
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion, or fail once `timeout` elapses
    fn execute(
        &self,
        command: &CommandSpec,
        timeout: Duration,
    ) -> std::result::Result<CommandOutput, ExecutionError>;
}

/// File-read collaborator
pub trait FileReader: Send + Sync {
    /// Read the whole file at `path`
    fn read_file(&self, path: &Path) -> std::result::Result<Vec<u8>, FileReadError>;
}

/// Runs commands on the host with `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn execute(
        &self,
        command: &CommandSpec,
        timeout: Duration,
    ) -> std::result::Result<CommandOutput, ExecutionError> {
        debug!("Executing `{}` (timeout {:?})", command, timeout);

        let deadline = Instant::now() + timeout;
        let stdio = || {
            if command.capture_output {
                Stdio::piped()
            } else {
                Stdio::null()
            }
        };

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(stdio())
            .stderr(stdio())
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let (sender, receiver) = mpsc::channel();
        drain(child.stdout.take(), Stream::Stdout, &sender);
        drain(child.stderr.take(), Stream::Stderr, &sender);
        drop(sender);

        let status = wait_with_deadline(&mut child, &command.program, timeout, deadline)?;

        let drain_until = Instant::now() + DRAIN_GRACE;
        let (stdout, stderr) = collect_output(&receiver, drain_until, &command.program);

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: status.code(),
        })
    }
}

/// Poll the child until it exits or the deadline passes
fn wait_with_deadline(
    child: &mut Child,
    program: &str,
    timeout: Duration,
    deadline: Instant,
) -> std::result::Result<std::process::ExitStatus, ExecutionError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(source) => {
                return Err(ExecutionError::Wait {
                    program: program.to_string(),
                    source,
                });
            }
        }

        if Instant::now() >= deadline {
            if let Err(e) = child.kill() {
                warn!("Failed to kill timed out `{}`: {}", program, e);
            }
            // Reap so the child does not linger as a zombie
            if let Err(e) = child.wait() {
                warn!("Failed to reap timed out `{}`: {}", program, e);
            }
            return Err(ExecutionError::TimedOut {
                program: program.to_string(),
                timeout,
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Forward chunks read from `pipe` until EOF or until the collector is gone
fn drain<R: Read + Send + 'static>(
    pipe: Option<R>,
    stream: Stream,
    sender: &Sender<(Stream, Vec<u8>)>,
) {
    let Some(mut pipe) = pipe else {
        return;
    };
    let sender = sender.clone();
    thread::spawn(move || {
        let mut buffer = [0u8; 8192];
        loop {
            match pipe.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    if sender.send((stream, buffer[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
    });
}

/// Gather output until both pipes close or `until` passes
fn collect_output(
    receiver: &Receiver<(Stream, Vec<u8>)>,
    until: Instant,
    program: &str,
) -> (Vec<u8>, Vec<u8>) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    loop {
        let left = until.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(left) {
            Ok((Stream::Stdout, bytes)) => stdout.extend_from_slice(&bytes),
            Ok((Stream::Stderr, bytes)) => stderr.extend_from_slice(&bytes),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                debug!("`{}` exited but its output pipes are still open", program);
                break;
            }
        }
    }
    (stdout, stderr)
}

/// Reads files from the local file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn read_file(&self, path: &Path) -> std::result::Result<Vec<u8>, FileReadError> {
        std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FileReadError::NotFound(path.to_path_buf())
            } else {
                FileReadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }
}
