//! Configuration data models
//!
//! This module defines the data structures used for application configuration.
//! Every section is `#[serde(default)]` so older or partial config files keep
//! loading when new settings are added.

use serde::{Deserialize, Serialize};

/// Smallest accepted icon worker limit
pub const MIN_WORKER_LIMIT: usize = 1;
/// Largest accepted icon worker limit
pub const MAX_WORKER_LIMIT: usize = 64;
/// Smallest accepted command timeout in milliseconds
pub const MIN_TIMEOUT_MS: u64 = 100;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scan and launch behaviour
    pub inventory: InventorySettings,
    /// Per-platform locations and commands
    pub platform: PlatformSettings,
}

/// Scan and launch behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    /// Maximum number of icon resolutions in flight (1-64)
    pub worker_limit: usize,
    /// Deadline for the listing command in milliseconds
    pub enumeration_timeout_ms: u64,
    /// Deadline for an open command in milliseconds
    pub launch_timeout_ms: u64,
}

/// Per-platform locations and commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    /// Spotlight query listing application bundles
    pub darwin_query: String,
    /// Icon container file name under `Contents/Resources`
    pub darwin_icon_resource: String,
    /// Fixed program directory scanned on Windows
    pub windows_program_dir: String,
    /// Directory holding desktop entries on Linux
    pub linux_applications_dir: String,
    /// Icon theme directory used to derive Linux icon paths
    pub linux_icon_dir: String,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            worker_limit: 12,
            enumeration_timeout_ms: 15_000,
            launch_timeout_ms: 10_000,
        }
    }
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            darwin_query: "kMDItemContentType == 'com.apple.application-bundle'".to_string(),
            darwin_icon_resource: "appIcon.icns".to_string(),
            windows_program_dir: "C:\\Program Files\\".to_string(),
            linux_applications_dir: "/usr/share/applications".to_string(),
            linux_icon_dir: "/usr/share/icons/hicolor/256x256/apps".to_string(),
        }
    }
}

impl AppConfig {
    /// Return a copy with out-of-range values clamped into range
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let inventory = &mut self.inventory;
        inventory.worker_limit = inventory
            .worker_limit
            .clamp(MIN_WORKER_LIMIT, MAX_WORKER_LIMIT);
        inventory.enumeration_timeout_ms = inventory.enumeration_timeout_ms.max(MIN_TIMEOUT_MS);
        inventory.launch_timeout_ms = inventory.launch_timeout_ms.max(MIN_TIMEOUT_MS);
        self
    }
}
