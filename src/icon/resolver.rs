//! Per-candidate icon resolution
//!
//! Branches on the [`IconSource`] a policy derived for a candidate:
//!
//! - `Absent`: no icon
//! - `File`: handed through as a path; existence is the UI's concern
//! - `Container`: read through the [`FileReader`] and decoded
//!
//! [`IconResolver::resolve`] never fails. Every error from a read or a decode
//! is logged and collapses that one record to no icon, so sibling
//! resolutions and the scan carry on.

use super::{AppIcon, container::decode_icon_container};
use crate::error::{FileReadError, IconNotFoundError, IconResolveError};
use crate::exec::FileReader;
use crate::platform::IconSource;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves icon sources into record icons
#[derive(Clone)]
pub struct IconResolver {
    files: Arc<dyn FileReader>,
}

impl std::fmt::Debug for IconResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconResolver").finish_non_exhaustive()
    }
}

impl IconResolver {
    /// Create a resolver reading containers through `files`
    pub fn new(files: Arc<dyn FileReader>) -> Self {
        Self { files }
    }

    /// Resolve an icon source, reporting why it degraded
    ///
    /// `Ok(None)` means the source legitimately has no icon: the platform
    /// provides none, or the container holds no directly usable image.
    ///
    /// # Errors
    ///
    /// Returns [`IconResolveError`] when the container file is missing,
    /// unreadable, or malformed.
    pub fn try_resolve(&self, source: &IconSource) -> Result<Option<AppIcon>, IconResolveError> {
        match source {
            IconSource::Absent => Ok(None),
            IconSource::File(path) => Ok(Some(AppIcon::File(path.clone()))),
            IconSource::Container(path) => {
                let bytes = self.files.read_file(path).map_err(|e| match e {
                    FileReadError::NotFound(path) => IconResolveError::NotFound(IconNotFoundError(path)),
                    FileReadError::Io { path, source } => IconResolveError::Read { path, source },
                })?;
                let icon = decode_icon_container(&bytes).map_err(|source| {
                    IconResolveError::Decode {
                        path: path.clone(),
                        source,
                    }
                })?;
                if icon.is_none() {
                    debug!(
                        "Icon container {} holds no directly usable image",
                        path.display()
                    );
                }
                Ok(icon.map(AppIcon::Raster))
            }
        }
    }

    /// Resolve an icon source, degrading every failure to no icon
    pub fn resolve(&self, source: &IconSource) -> Option<AppIcon> {
        match self.try_resolve(source) {
            Ok(icon) => icon,
            Err(IconResolveError::NotFound(e)) => {
                debug!("{e}");
                None
            }
            Err(e) => {
                warn!("Icon degraded to absent: {e}");
                None
            }
        }
    }
}
