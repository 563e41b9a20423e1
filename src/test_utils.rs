#![expect(
    clippy::unwrap_used,
    reason = "Test utilities use .unwrap() for brevity"
)]

//! Shared test utilities for `GoToApp` unit tests.
//!
//! In-memory collaborators, an environment guard for the data directory
//! override, and builders for icon fixtures. Only compiled during testing.

use crate::config::manager::HOME_ENV;
use crate::error::{ExecutionError, FileReadError};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec, FileReader};
use parking_lot::Mutex as PlMutex;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tempfile::TempDir;

/// Serializes tests that modify `GOTOAPP_HOME`.
static HOME_LOCK: Mutex<()> = Mutex::new(());

/// Helper function to create a temporary test directory using tempfile.
/// Returns a `TempDir` that automatically cleans up when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// RAII guard pointing `GOTOAPP_HOME` at a temp directory for a test scope
/// and restoring the original value when dropped.
///
/// # Safety Considerations
///
/// `std::env::set_var` and `std::env::remove_var` are unsafe because another
/// thread may read the environment concurrently. `HOME_LOCK` is held for the
/// guard's lifetime, so tests touching the variable run one at a time.
pub struct HomeGuard {
    original: Option<String>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only code that modifies environment variables under a global lock"
)]
impl HomeGuard {
    /// Create a new guard that sets `GOTOAPP_HOME` to the temp directory.
    pub fn new(temp_dir: &TempDir) -> Self {
        let lock = HOME_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let original = std::env::var(HOME_ENV).ok();
        // SAFETY: HOME_LOCK serializes every writer of this variable.
        unsafe {
            std::env::set_var(HOME_ENV, temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only code that restores environment variables under a global lock"
)]
impl Drop for HomeGuard {
    fn drop(&mut self) {
        // SAFETY: the lock is still held until this guard's fields drop.
        unsafe {
            match &self.original {
                Some(original) => std::env::set_var(HOME_ENV, original),
                None => std::env::remove_var(HOME_ENV),
            }
        }
    }
}

/// In-memory `FileReader`
#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: HashMap<PathBuf, Vec<u8>>,
    unreadable: HashSet<PathBuf>,
}

impl MemoryFiles {
    /// Add a readable file
    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        self.files.insert(path.into(), bytes);
        self
    }

    /// Add a file that exists but fails to read
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.insert(path.into());
        self
    }
}

impl FileReader for MemoryFiles {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileReadError> {
        if self.unreadable.contains(path) {
            return Err(FileReadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FileReadError::NotFound(path.to_path_buf()))
    }
}

#[derive(Debug, Clone)]
enum Script {
    Output(CommandOutput),
    Timeout,
    SpawnFailure,
}

/// `CommandRunner` that answers every command the same way and records calls
#[derive(Debug)]
pub struct ScriptedRunner {
    script: Script,
    calls: PlMutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: PlMutex::new(Vec::new()),
        }
    }

    /// Succeed with the given stdout
    pub fn stdout(stdout: &str) -> Self {
        Self::output(CommandOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }

    /// Return the given output verbatim
    pub fn output(output: CommandOutput) -> Self {
        Self::new(Script::Output(output))
    }

    /// Fail every command with a timeout
    pub fn timeout() -> Self {
        Self::new(Script::Timeout)
    }

    /// Fail every command as if the program were missing
    pub fn spawn_failure() -> Self {
        Self::new(Script::SpawnFailure)
    }

    /// Commands executed so far
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// Commands executed so far, rendered for display
    pub fn rendered_calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn execute(
        &self,
        command: &CommandSpec,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutionError> {
        self.calls.lock().push(command.clone());
        match &self.script {
            Script::Output(output) => Ok(output.clone()),
            Script::Timeout => Err(ExecutionError::TimedOut {
                program: command.program.clone(),
                timeout,
            }),
            Script::SpawnFailure => Err(ExecutionError::Spawn {
                program: command.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
        }
    }
}

/// Assemble an icon container from `(tag, payload)` pairs
pub fn build_container(chunks: &[([u8; 4], &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (tag, payload) in chunks {
        body.extend_from_slice(tag);
        body.extend_from_slice(&u32::try_from(payload.len() + 8).unwrap().to_be_bytes());
        body.extend_from_slice(payload);
    }
    let mut bytes = b"icns".to_vec();
    bytes.extend_from_slice(&u32::try_from(body.len() + 8).unwrap().to_be_bytes());
    bytes.extend_from_slice(&body);
    bytes
}

/// Encode a `side`×`side` opaque PNG; different sides give different bytes
pub fn tiny_png(side: u32) -> Vec<u8> {
    let pixels = vec![200u8; (side * side * 4) as usize];
    let mut png = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut png),
        &pixels,
        side,
        side,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();
    png
}
