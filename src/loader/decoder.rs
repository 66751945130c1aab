//! Trait-based panorama decoding.
//!
//! Each media kind is handled by one or more `PanoramaDecoder`s registered in a
//! `DecoderRegistry`. Still images decode to RGBA8 through the `image` crate;
//! videos are probed for their frame size and handed over as a looping stream.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vrtour::loader::DecoderRegistry;
//!
//! let registry = DecoderRegistry::new();
//! let texture = registry.decode("pano/hall.jpg", MediaKind::Still, bytes)?;
//! ```

use std::sync::Arc;

use super::texture::{StillTexture, Texture, VideoStream};
use crate::model::MediaKind;

/// Error type for fetch and decode operations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderError {
    /// Human-readable error message.
    pub message: String,
    /// The decoder or source that produced this error (if known).
    pub loader_id: Option<&'static str>,
}

impl LoaderError {
    /// Create a new loader error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            loader_id: None,
        }
    }

    /// Create an error with loader context.
    pub fn with_loader(mut self, loader_id: &'static str) -> Self {
        self.loader_id = Some(loader_id);
        self
    }
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(loader) = self.loader_id {
            write!(f, "[{}] {}", loader, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for LoaderError {}

/// Turns fetched bytes into a renderable texture.
pub trait PanoramaDecoder: Send + Sync {
    /// Unique identifier for this decoder (e.g., "still", "mp4").
    fn id(&self) -> &'static str;

    /// Media kind this decoder produces.
    fn media_kind(&self) -> MediaKind;

    /// Check magic bytes to see whether this decoder understands the data.
    fn can_decode(&self, data: &[u8]) -> bool;

    /// Decode the data fetched from `url`.
    fn decode(&self, url: &str, data: Vec<u8>) -> Result<Texture, LoaderError>;

    /// Priority when several decoders handle the same kind (higher = tried first).
    fn priority(&self) -> i32 {
        0
    }
}

/// Decodes still panoramas with the `image` crate.
pub struct StillImageDecoder;

impl PanoramaDecoder for StillImageDecoder {
    fn id(&self) -> &'static str {
        "still"
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::Still
    }

    fn can_decode(&self, data: &[u8]) -> bool {
        image::guess_format(data).is_ok()
    }

    fn decode(&self, url: &str, data: Vec<u8>) -> Result<Texture, LoaderError> {
        let img = image::load_from_memory(&data)
            .map_err(|e| {
                LoaderError::new(format!("Failed to decode image: {}", e)).with_loader(self.id())
            })?
            .to_rgba8();

        log::trace!(
            "StillImageDecoder: decoded {} as {}x{}",
            url,
            img.width(),
            img.height()
        );

        Ok(Texture::Still(StillTexture {
            width: img.width(),
            height: img.height(),
            rgba: img.into_raw(),
        }))
    }
}

/// Prepares MP4/MOV panoramic video streams.
pub struct VideoStreamDecoder;

impl PanoramaDecoder for VideoStreamDecoder {
    fn id(&self) -> &'static str {
        "mp4"
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn can_decode(&self, data: &[u8]) -> bool {
        data.len() >= 8 && &data[4..8] == b"ftyp"
    }

    fn decode(&self, url: &str, data: Vec<u8>) -> Result<Texture, LoaderError> {
        let (width, height) = probe_mp4_dimensions(&data).ok_or_else(|| {
            LoaderError::new("No video track with frame dimensions").with_loader(self.id())
        })?;

        log::debug!("Prepared video stream {}: {}x{}", url, width, height);

        Ok(Texture::Video(VideoStream {
            url: url.to_string(),
            width,
            height,
            looping: true,
            data: Arc::from(data),
        }))
    }
}

/// Iterate over the ISO-BMFF boxes directly inside `data`, yielding `(type, body)`.
fn boxes(data: &[u8]) -> impl Iterator<Item = ([u8; 4], &[u8])> {
    let mut offset = 0usize;
    std::iter::from_fn(move || {
        let header = data.get(offset..offset + 8)?;
        let size32 = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let kind = [header[4], header[5], header[6], header[7]];

        let (size, header_len) = match size32 {
            // Box extends to the end of the enclosing data
            0 => (data.len() - offset, 8),
            // 64-bit size follows the type
            1 => {
                let large = data.get(offset + 8..offset + 16)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(large);
                (usize::try_from(u64::from_be_bytes(buf)).ok()?, 16)
            }
            n => (n as usize, 8),
        };

        if size < header_len {
            return None;
        }
        let body = data.get(offset + header_len..offset.checked_add(size)?)?;
        offset += size;
        Some((kind, body))
    })
}

/// Read width/height (16.16 fixed point) from a `tkhd` body.
fn parse_tkhd(body: &[u8]) -> Option<(u32, u32)> {
    let version = *body.first()?;
    // Fields before the reserved/layer/volume/matrix block differ by version
    let base = if version == 1 { 36 } else { 24 };
    let width = body.get(base + 52..base + 56)?;
    let height = body.get(base + 56..base + 60)?;
    let width = u32::from_be_bytes([width[0], width[1], width[2], width[3]]) >> 16;
    let height = u32::from_be_bytes([height[0], height[1], height[2], height[3]]) >> 16;
    Some((width, height))
}

/// Find the frame size of the first visual track of an MP4/MOV file.
pub fn probe_mp4_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    for (kind, body) in boxes(data) {
        match &kind {
            b"moov" | b"trak" => {
                if let Some(dimensions) = probe_mp4_dimensions(body) {
                    return Some(dimensions);
                }
            }
            b"tkhd" => {
                // Audio tracks report 0x0
                if let Some((w, h)) = parse_tkhd(body).filter(|&(w, h)| w > 0 && h > 0) {
                    return Some((w, h));
                }
            }
            _ => {}
        }
    }
    None
}

/// Registry of available decoders.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn PanoramaDecoder>>,
}

impl DecoderRegistry {
    /// Create a registry with the built-in decoders.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(StillImageDecoder));
        registry.register(Box::new(VideoStreamDecoder));
        registry
    }

    /// Create a registry without any decoders.
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Register a decoder.
    pub fn register(&mut self, decoder: Box<dyn PanoramaDecoder>) {
        self.decoders.push(decoder);
        // Stable sort keeps registration order for equal priorities
        self.decoders.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Number of registered decoders.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether no decoders are registered.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode bytes of the given media kind.
    ///
    /// Decoders whose magic-byte check passes are preferred; if none claims the
    /// data the highest-priority decoder for the kind gets a try.
    pub fn decode(&self, url: &str, kind: MediaKind, data: Vec<u8>) -> Result<Texture, LoaderError> {
        let mut candidates = self.decoders.iter().filter(|d| d.media_kind() == kind);
        let Some(first) = candidates.clone().next() else {
            return Err(LoaderError::new(format!("No decoder registered for {:?}", kind)));
        };

        let decoder = candidates
            .find(|d| d.can_decode(&data))
            .unwrap_or(first);

        log::debug!("Decoding {} with '{}' ({} bytes)", url, decoder.id(), data.len());
        decoder.decode(url, data)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
