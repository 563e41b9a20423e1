//! `GoToApp` - cross-platform application inventory and launcher core
//!
//! Discovers installed applications on macOS, Windows and Linux desktops,
//! resolves a displayable icon for each, and launches them on request. A UI
//! shell drives it through [`bridge::UiBridge`] across a process boundary.
//!
//! # Pipeline
//!
//! `PlatformPolicy` (selected once) → `AppEnumerator` (candidates) →
//! `IconResolver` × N on a bounded pool → container decoder (macOS only) →
//! immutable `Snapshot` published by `InventoryService`.
//!
//! All external effects go through the [`exec::CommandRunner`] and
//! [`exec::FileReader`] traits, held by a [`session::Session`] created at
//! startup.

pub mod bridge;
pub mod config;
pub mod error;
pub mod exec;
pub mod icon;
pub mod inventory;
pub mod launch;
pub mod platform;
pub mod session;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use error::{GotoAppError, Result};
pub use session::Session;
