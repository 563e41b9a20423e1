//! Platform strategy
//!
//! One [`PlatformPolicy`] implementation per supported OS, selected once at
//! startup by [`select_policy`]. Every consumer depends only on the trait's
//! capability set:
//!
//! - **`list_command`**: the command whose stdout lists installed applications
//! - **`accepts_entry` / `extract_name` / `candidate_path`**: the per-line
//!   grammar turning one listing line into a [`Candidate`]
//! - **`icon_source`**: where a candidate's icon comes from
//! - **`launch_command`**: the command that opens an application
//!
//! Policies are immutable configuration values and hold no mutable state.
//!
//! # Line grammar
//!
//! ```text
//! line      := entry [ "/" ]        (surrounding whitespace and \r trimmed)
//! entry     := segment { "/" segment }
//! name      := last segment of entry with the platform suffix removed
//! ```

mod darwin;
mod linux;
mod windows;

pub use darwin::DarwinPolicy;
pub use linux::LinuxPolicy;
pub use windows::WindowsPolicy;

use crate::config::PlatformSettings;
use crate::error::{GotoAppError, Result};
use crate::exec::CommandSpec;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Supported platform families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// macOS application bundles
    Darwin,
    /// Windows program directory
    Windows,
    /// Linux freedesktop entries
    Linux,
}

impl PlatformKind {
    /// Map an OS identifier (`std::env::consts::OS` values) to a platform
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "macos" | "darwin" => Ok(Self::Darwin),
            "windows" | "win32" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            other => Err(GotoAppError::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::Linux => "linux",
        })
    }
}

/// A raw `{name, path}` pair produced by enumeration, before icon resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Display name, never empty
    pub name: String,
    /// Launch path, never empty
    pub path: String,
}

/// Where a candidate's icon comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    /// The platform provides no icon
    Absent,
    /// A direct file reference handed to the UI as-is
    File(PathBuf),
    /// A binary icon container that must be read and decoded
    Container(PathBuf),
}

/// Per-OS enumeration, naming, icon and launch policy
pub trait PlatformPolicy: Send + Sync + fmt::Debug {
    /// Platform family this policy implements
    fn kind(&self) -> PlatformKind;

    /// Command listing installed applications, one per stdout line
    fn list_command(&self) -> CommandSpec;

    /// Whether a trimmed listing line names an application
    fn accepts_entry(&self, entry: &str) -> bool;

    /// Display name for an accepted entry
    fn extract_name(&self, entry: &str) -> Option<String>;

    /// Launch path for an accepted entry
    fn candidate_path(&self, entry: &str) -> String {
        entry.to_string()
    }

    /// Icon source for a candidate
    fn icon_source(&self, candidate: &Candidate) -> IconSource;

    /// Command opening the application at `path`
    fn launch_command(&self, path: &str) -> CommandSpec;

    /// Human-readable description shown under the name
    fn describe(&self, candidate: &Candidate) -> String {
        format!("Description of {}", candidate.name)
    }

    /// Turn one raw listing line into a candidate
    ///
    /// Returns `None` for blank lines, filtered entries, and entries whose
    /// name or path would be empty.
    fn parse_candidate(&self, line: &str) -> Option<Candidate> {
        let entry = line.trim();
        if entry.is_empty() || !self.accepts_entry(entry) {
            return None;
        }
        let name = self.extract_name(entry)?;
        let path = self.candidate_path(entry);
        if name.is_empty() || path.is_empty() {
            return None;
        }
        Some(Candidate { name, path })
    }
}

/// Select the policy for an OS identifier
///
/// Unsupported identifiers are a configuration error, never a panic.
pub fn select_policy(os: &str, settings: &PlatformSettings) -> Result<Arc<dyn PlatformPolicy>> {
    let policy: Arc<dyn PlatformPolicy> = match PlatformKind::from_os(os)? {
        PlatformKind::Darwin => Arc::new(DarwinPolicy::new(settings)),
        PlatformKind::Windows => Arc::new(WindowsPolicy::new(settings)),
        PlatformKind::Linux => Arc::new(LinuxPolicy::new(settings)),
    };
    tracing::debug!("Selected {} platform policy for OS `{}`", policy.kind(), os);
    Ok(policy)
}

/// Select the policy for the running OS
pub fn current_policy(settings: &PlatformSettings) -> Result<Arc<dyn PlatformPolicy>> {
    select_policy(std::env::consts::OS, settings)
}

/// Final path segment, split on both separators so Windows and Unix listings
/// parse the same on any host
pub(crate) fn last_segment(entry: &str) -> &str {
    let trimmed = entry.trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
}

/// Strip an ASCII suffix case-insensitively
pub(crate) fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
