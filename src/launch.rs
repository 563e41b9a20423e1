//! Launch dispatcher
//!
//! Builds the active policy's open command for a path and runs it through the
//! session's [`crate::exec::CommandRunner`]. Failures are returned as values
//! and never change service state. Launching the same path twice runs two
//! independent commands; there is no deduplication.

use crate::error::{ExecutionError, LaunchError};
use crate::session::Session;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{info, warn};

/// Result of a launch request as reported to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// Whether the open command succeeded
    pub ok: bool,
    /// Failure details when `ok` is false
    pub error: Option<LaunchError>,
}

impl From<Result<(), LaunchError>> for LaunchOutcome {
    fn from(result: Result<(), LaunchError>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                error: None,
            },
            Err(e) => Self {
                ok: false,
                error: Some(e),
            },
        }
    }
}

/// Opens applications with the platform's launch command
#[derive(Debug, Clone)]
pub struct LaunchDispatcher {
    session: Arc<Session>,
}

impl LaunchDispatcher {
    /// Create a dispatcher for the session's platform
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Open the application at `path`
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] for an empty path or when the open command
    /// cannot run, exits nonzero, or times out.
    pub fn try_launch(&self, path: &str) -> Result<(), LaunchError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(LaunchError::EmptyPath);
        }

        // The launched application must not inherit our output pipes
        let command = self.session.policy.launch_command(path).detached();
        let rendered = command.to_string();
        info!("Launching `{}`", rendered);

        let output = self
            .session
            .runner
            .execute(&command, self.session.launch_timeout())
            .map_err(|e| match e {
                ExecutionError::TimedOut { timeout, .. } => LaunchError::TimedOut {
                    command: rendered.clone(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                },
                other => LaunchError::CommandFailed {
                    command: rendered.clone(),
                    reason: other.to_string(),
                },
            })?;

        if output.success() {
            Ok(())
        } else {
            Err(LaunchError::NonZeroExit {
                command: rendered,
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    /// Open the application at `path`, reporting the outcome as a value
    pub fn launch(&self, path: &str) -> LaunchOutcome {
        let result = self.try_launch(path);
        if let Err(e) = &result {
            warn!("Launch failed: {}", e);
        }
        result.into()
    }

    /// Open the application on a background thread
    pub fn spawn_launch(&self, path: impl Into<String>) -> JoinHandle<LaunchOutcome> {
        let dispatcher = self.clone();
        let path = path.into();
        std::thread::spawn(move || dispatcher.launch(&path))
    }
}
