//! Application icons
//!
//! - [`container`]: decoder for the tagged-chunk icon container format
//! - [`resolver`]: per-candidate icon resolution with failure isolation
//! - [`transport`]: data-URI encoding for handing icons across the UI boundary
//!
//! An icon attached to a record is either a fully extracted raster
//! ([`AppIcon::Raster`]) or a direct file reference the UI loads itself
//! ([`AppIcon::File`]). Anything that fails along the way collapses to no icon.

pub mod container;
pub mod resolver;
pub mod transport;

pub use container::{IconContainerChunk, decode_icon_container, is_icon_container, parse_chunks};
pub use resolver::IconResolver;
pub use transport::{IconPayload, placeholder_data_uri, resolve_icon_data_uri, to_data_uri};

use image::ImageFormat;
use std::path::PathBuf;

/// Encoding of raster icon bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconFormat {
    /// PNG image data
    Png,
    /// Bytes of an unrecognised encoding, passed through opaquely
    Unknown,
}

impl IconFormat {
    /// Detect the format from leading signature bytes
    pub fn sniff(bytes: &[u8]) -> Self {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => Self::Png,
            _ => Self::Unknown,
        }
    }

    /// MIME type used in data URIs
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Raster icon bytes extracted from a container or read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    /// Encoding of `bytes`
    pub format: IconFormat,
    /// Encoded image data
    pub bytes: Vec<u8>,
    /// Nominal pixel width of the source representation, when known
    pub source_width: Option<u32>,
}

/// Icon attached to an application record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppIcon {
    /// Decoded raster owned by the record
    Raster(Icon),
    /// Path the UI loads directly; not checked for existence
    File(PathBuf),
}
