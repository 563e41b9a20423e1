//! Icon container decoder
//!
//! Parses the big-endian tagged-chunk container used for macOS application
//! icons and extracts the best embedded raster. The decoder only slices out
//! an existing payload: no recompression or resizing happens here.
//!
//! # Layout
//!
//! ```text
//! container := magic:"icns" total_len:u32be chunk*
//! chunk     := tag:[u8; 4] length:u32be payload:[u8; length - 8]
//! ```
//!
//! `total_len` and every chunk `length` include their own 8-byte header.
//! Bytes past `total_len` are ignored.
//!
//! # Selection
//!
//! Each tag is looked up in a table of known representations. Only
//! embedded-image tags whose payload carries a PNG signature are directly
//! usable; legacy raw bitmaps, masks and JPEG 2000 payloads would need
//! transcoding and are never selected. Among usable chunks the largest
//! nominal resolution wins, and the first one encountered wins a tie.
//! Unknown tags are skipped.

use super::{Icon, IconFormat};
use crate::error::IconDecodeError;
use tracing::trace;

/// Magic bytes opening every container
pub const CONTAINER_MAGIC: [u8; 4] = *b"icns";

/// Size of the container header and of every chunk header
pub const HEADER_LEN: usize = 8;

/// How a known tag stores its image data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkEncoding {
    /// A complete embedded image file (PNG or JPEG 2000)
    Embedded,
    /// Raw or packed bitmap data, or a mask
    Legacy,
}

/// Table entry for a known tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    /// Nominal pixel width of the representation
    pub resolution: u32,
    /// Payload encoding
    pub encoding: ChunkEncoding,
}

const fn embedded(resolution: u32) -> Option<TagInfo> {
    Some(TagInfo {
        resolution,
        encoding: ChunkEncoding::Embedded,
    })
}

const fn legacy(resolution: u32) -> Option<TagInfo> {
    Some(TagInfo {
        resolution,
        encoding: ChunkEncoding::Legacy,
    })
}

/// Look up a tag in the known-representation table
pub fn classify_tag(tag: [u8; 4]) -> Option<TagInfo> {
    match &tag {
        b"icp4" => embedded(16),
        b"icp5" | b"ic11" => embedded(32),
        b"icp6" | b"ic12" => embedded(64),
        b"ic07" => embedded(128),
        b"ic08" | b"ic13" => embedded(256),
        b"ic09" | b"ic14" => embedded(512),
        b"ic10" => embedded(1024),
        b"icsb" => embedded(18),
        b"icsB" => embedded(36),

        b"is32" | b"s8mk" | b"ics#" | b"icm#" | b"ics4" | b"ics8" | b"icm4" | b"icm8"
        | b"ic04" => legacy(16),
        b"il32" | b"l8mk" | b"ICN#" | b"icl4" | b"icl8" | b"ic05" => legacy(32),
        b"ih32" | b"h8mk" | b"ich#" | b"ich4" | b"ich8" => legacy(48),
        b"it32" | b"t8mk" => legacy(128),

        _ => None,
    }
}

/// One tagged chunk borrowed from the container buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconContainerChunk<'a> {
    /// Four-byte type code
    pub tag: [u8; 4],
    /// Declared length including the 8-byte header
    pub length: u32,
    /// Payload bytes (`length - 8` of them)
    pub payload: &'a [u8],
}

impl IconContainerChunk<'_> {
    /// Printable form of the tag, non-ASCII bytes escaped
    pub fn tag_name(&self) -> String {
        tag_name(self.tag)
    }

    /// Known-table entry for this chunk's tag
    pub fn info(&self) -> Option<TagInfo> {
        classify_tag(self.tag)
    }

    /// Whether the chunk holds an image that can be displayed without
    /// transcoding
    pub fn is_directly_usable(&self) -> bool {
        matches!(
            self.info(),
            Some(TagInfo {
                encoding: ChunkEncoding::Embedded,
                ..
            })
        ) && IconFormat::sniff(self.payload) == IconFormat::Png
    }
}

fn tag_name(tag: [u8; 4]) -> String {
    tag.escape_ascii().to_string()
}

/// Whether `bytes` starts with the container magic
pub fn is_icon_container(bytes: &[u8]) -> bool {
    bytes.starts_with(&CONTAINER_MAGIC)
}

fn read_u32_be(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(word)
}

/// Validate the container header and split it into chunks
///
/// # Errors
///
/// Returns [`IconDecodeError`] for a short buffer, a wrong magic, a declared
/// length that is below the header size or past the end of the buffer, or any
/// chunk whose header or payload does not fit. No partial chunk list is
/// returned on error.
pub fn parse_chunks(bytes: &[u8]) -> Result<Vec<IconContainerChunk<'_>>, IconDecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(IconDecodeError::TooShort { len: bytes.len() });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&bytes[..4]);
    if magic != CONTAINER_MAGIC {
        return Err(IconDecodeError::BadMagic { found: magic });
    }

    let declared = read_u32_be(bytes, 4);
    let total = usize::try_from(declared).unwrap_or(usize::MAX);
    if total < HEADER_LEN {
        return Err(IconDecodeError::InvalidTotalLength { declared });
    }
    if total > bytes.len() {
        return Err(IconDecodeError::Truncated {
            declared,
            actual: bytes.len(),
        });
    }
    let container = &bytes[..total];

    let mut chunks = Vec::new();
    let mut offset = HEADER_LEN;
    while offset < total {
        let remaining = total - offset;
        if remaining < HEADER_LEN {
            return Err(IconDecodeError::TruncatedChunkHeader { offset });
        }

        let mut tag = [0u8; 4];
        tag.copy_from_slice(&container[offset..offset + 4]);
        let length = read_u32_be(container, offset + 4);
        let chunk_len = usize::try_from(length).unwrap_or(usize::MAX);

        if chunk_len < HEADER_LEN {
            return Err(IconDecodeError::InvalidChunkLength {
                tag: tag_name(tag),
                offset,
                length,
            });
        }
        if chunk_len > remaining {
            return Err(IconDecodeError::ChunkOverrun {
                tag: tag_name(tag),
                offset,
                length,
                remaining,
            });
        }

        chunks.push(IconContainerChunk {
            tag,
            length,
            payload: &container[offset + HEADER_LEN..offset + chunk_len],
        });
        offset += chunk_len;
    }

    Ok(chunks)
}

/// Decode a container and return its best directly-usable raster
///
/// Returns `Ok(None)` when the container is well formed but holds no usable
/// chunk; the caller substitutes a default.
///
/// # Errors
///
/// Propagates the structural errors of [`parse_chunks`].
pub fn decode_icon_container(bytes: &[u8]) -> Result<Option<Icon>, IconDecodeError> {
    let chunks = parse_chunks(bytes)?;

    let mut best: Option<(u32, &IconContainerChunk<'_>)> = None;
    for chunk in &chunks {
        let Some(info) = chunk.info() else {
            trace!("Skipping unknown icon chunk `{}`", chunk.tag_name());
            continue;
        };
        if !chunk.is_directly_usable() {
            trace!(
                "Skipping icon chunk `{}` ({}px): not an embedded PNG",
                chunk.tag_name(),
                info.resolution
            );
            continue;
        }
        // Strictly greater: the first chunk keeps a tie
        if best.is_none_or(|(resolution, _)| info.resolution > resolution) {
            best = Some((info.resolution, chunk));
        }
    }

    Ok(best.map(|(resolution, chunk)| Icon {
        format: IconFormat::Png,
        bytes: chunk.payload.to_vec(),
        source_width: Some(resolution),
    }))
}
