//! Application enumeration
//!
//! Runs the active policy's listing command and turns its stdout into an
//! ordered list of [`Candidate`]s. Order follows the command's output; the
//! first occurrence of a path wins when the listing repeats it.

use crate::error::{EnumerationError, ExecutionError};
use crate::exec::CommandRunner;
use crate::platform::{Candidate, PlatformPolicy};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Parse raw listing output into candidates
///
/// Blank lines, filtered entries and duplicate paths are dropped.
pub fn parse_listing(policy: &dyn PlatformPolicy, stdout: &str) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    stdout
        .lines()
        .filter_map(|line| policy.parse_candidate(line))
        .filter(|candidate| {
            let fresh = seen.insert(candidate.path.clone());
            if !fresh {
                debug!("Skipping duplicate listing entry {}", candidate.path);
            }
            fresh
        })
        .collect()
}

/// Runs a policy's listing command through a [`CommandRunner`]
#[derive(Clone)]
pub struct AppEnumerator {
    policy: Arc<dyn PlatformPolicy>,
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl std::fmt::Debug for AppEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppEnumerator")
            .field("policy", &self.policy)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AppEnumerator {
    /// Create an enumerator bounded by `timeout`
    pub fn new(
        policy: Arc<dyn PlatformPolicy>,
        runner: Arc<dyn CommandRunner>,
        timeout: Duration,
    ) -> Self {
        Self {
            policy,
            runner,
            timeout,
        }
    }

    /// List the installed applications
    ///
    /// # Errors
    ///
    /// Returns [`EnumerationError`] when the listing command cannot run,
    /// exits nonzero, or outlives the timeout. Zero surviving lines is a
    /// successful, empty result.
    pub fn enumerate(&self) -> Result<Vec<Candidate>, EnumerationError> {
        let command = self.policy.list_command();
        let rendered = command.to_string();

        let output = self
            .runner
            .execute(&command, self.timeout)
            .map_err(|e| match e {
                ExecutionError::TimedOut { timeout, .. } => EnumerationError::TimedOut {
                    command: rendered.clone(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                },
                other => EnumerationError::CommandFailed {
                    command: rendered.clone(),
                    reason: other.to_string(),
                },
            })?;

        if !output.success() {
            return Err(EnumerationError::NonZeroExit {
                command: rendered,
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let candidates = parse_listing(self.policy.as_ref(), &output.stdout);
        info!(
            "Enumerated {} {} application(s) with `{}`",
            candidates.len(),
            self.policy.kind(),
            rendered
        );
        Ok(candidates)
    }
}
