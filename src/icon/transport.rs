//! Transport encoding for icons crossing the UI boundary
//!
//! The UI process only ever sees icons as `data:` URIs:
//!
//! ```text
//! data:image/png;base64,iVBORw0KGgo...
//! data:application/octet-stream;base64,...
//! ```
//!
//! An empty string means "no icon"; the UI then shows its default asset,
//! which [`placeholder_data_uri`] provides.

use super::{Icon, IconFormat, container};
use crate::exec::FileReader;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ExtendedColorType, ImageFormat, ImageResult};
use std::io::Cursor;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Edge length of the generated placeholder icon
pub const PLACEHOLDER_SIZE: u32 = 32;

const PLACEHOLDER_BORDER: u8 = 64;
const PLACEHOLDER_FILL: u8 = 128;

/// Icon data handed over by the UI for encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconPayload {
    /// A file to read, either an icon container or a plain image
    Path(PathBuf),
    /// Bytes already in memory
    Bytes(Vec<u8>),
}

/// Encode raw bytes as a base64 data URI
pub fn encode_data_uri(format: IconFormat, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        format.mime_type(),
        STANDARD.encode(bytes)
    )
}

/// Encode a resolved icon as a base64 data URI
pub fn to_data_uri(icon: &Icon) -> String {
    encode_data_uri(icon.format, &icon.bytes)
}

/// Turn arbitrary icon bytes into a displayable icon
///
/// Containers are decoded; any other non-empty bytes pass through with a
/// sniffed format.
///
/// # Errors
///
/// Returns [`crate::error::IconDecodeError`] for a malformed container.
pub fn icon_from_bytes(bytes: Vec<u8>) -> Result<Option<Icon>, crate::error::IconDecodeError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    if container::is_icon_container(&bytes) {
        return container::decode_icon_container(&bytes);
    }
    Ok(Some(Icon {
        format: IconFormat::sniff(&bytes),
        bytes,
        source_width: None,
    }))
}

/// Resolve a payload to a data URI, or `""` when no icon can be produced
pub fn resolve_icon_data_uri(payload: IconPayload, files: &dyn FileReader) -> String {
    let bytes = match payload {
        IconPayload::Bytes(bytes) => bytes,
        IconPayload::Path(path) => match files.read_file(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Icon payload unavailable: {e}");
                return String::new();
            }
        },
    };

    match icon_from_bytes(bytes) {
        Ok(Some(icon)) => to_data_uri(&icon),
        Ok(None) => String::new(),
        Err(e) => {
            warn!("Icon payload could not be decoded: {e}");
            String::new()
        }
    }
}

/// Render the default icon: a gray square with a darker one-pixel border
///
/// # Errors
///
/// Returns the encoder error if PNG encoding fails.
pub fn placeholder_png() -> ImageResult<Vec<u8>> {
    let size = PLACEHOLDER_SIZE as usize;
    let mut rgba = Vec::with_capacity(size * size * 4);
    for y in 0..size {
        for x in 0..size {
            let edge = x == 0 || y == 0 || x == size - 1 || y == size - 1;
            let shade = if edge {
                PLACEHOLDER_BORDER
            } else {
                PLACEHOLDER_FILL
            };
            rgba.extend_from_slice(&[shade, shade, shade, u8::MAX]);
        }
    }

    let mut png = Vec::with_capacity(1024);
    image::write_buffer_with_format(
        &mut Cursor::new(&mut png),
        &rgba,
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE,
        ExtendedColorType::Rgba8,
        ImageFormat::Png,
    )?;
    Ok(png)
}

/// The default icon as a data URI, `""` if it cannot be encoded
pub fn placeholder_data_uri() -> String {
    match placeholder_png() {
        Ok(png) => encode_data_uri(IconFormat::Png, &png),
        Err(e) => {
            warn!("Failed to encode placeholder icon: {e}");
            String::new()
        }
    }
}
