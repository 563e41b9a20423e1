//! Process-wide session context
//!
//! A [`Session`] is created once at startup and shared by `Arc` with every
//! component that needs the active platform policy, the external
//! collaborators, or configuration. Nothing in the crate reaches for ambient
//! global state instead.

use crate::config::AppConfig;
use crate::error::Result;
use crate::exec::{CommandRunner, FileReader, FsFileReader, SystemCommandRunner};
use crate::platform::{PlatformPolicy, current_policy};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Policy, collaborators and configuration shared for the process lifetime
#[derive(Clone)]
pub struct Session {
    /// Policy selected for the running OS
    pub policy: Arc<dyn PlatformPolicy>,
    /// Process-execution collaborator
    pub runner: Arc<dyn CommandRunner>,
    /// File-read collaborator
    pub files: Arc<dyn FileReader>,
    /// Sanitized configuration
    pub config: AppConfig,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("policy", &self.policy)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Assemble a session from explicit parts
    pub fn new(
        policy: Arc<dyn PlatformPolicy>,
        runner: Arc<dyn CommandRunner>,
        files: Arc<dyn FileReader>,
        config: AppConfig,
    ) -> Self {
        Self {
            policy,
            runner,
            files,
            config: config.sanitized(),
        }
    }

    /// Build the session for the running host
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GotoAppError::UnsupportedPlatform`] when the OS
    /// has no policy.
    pub fn detect(config: AppConfig) -> Result<Self> {
        let config = config.sanitized();
        let policy = current_policy(&config.platform)?;
        info!("Session started for {} host", policy.kind());
        Ok(Self::new(
            policy,
            Arc::new(SystemCommandRunner),
            Arc::new(FsFileReader),
            config,
        ))
    }

    /// Deadline for the listing command
    pub fn enumeration_timeout(&self) -> Duration {
        Duration::from_millis(self.config.inventory.enumeration_timeout_ms)
    }

    /// Deadline for an open command
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.config.inventory.launch_timeout_ms)
    }

    /// Maximum number of concurrent icon resolutions
    pub fn worker_limit(&self) -> usize {
        self.config.inventory.worker_limit
    }
}
