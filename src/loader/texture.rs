//! Decoded panorama surfaces handed to the renderer.

use std::sync::Arc;

use crate::model::MediaKind;

/// RGBA8 pixels of a decoded still panorama.
#[derive(Debug, Clone, PartialEq)]
pub struct StillTexture {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// RGBA pixel data (width * height * 4 bytes)
    pub rgba: Vec<u8>,
}

/// A prepared video stream. Frames are decoded by the renderer; the stream
/// only carries what is needed to size the render target and bind it.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoStream {
    /// Source URL
    pub url: String,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Panoramic video always loops
    pub looping: bool,
    /// Container bytes
    pub data: Arc<[u8]>,
}

/// A surface ready to be bound to the sky-sphere material.
#[derive(Debug, Clone, PartialEq)]
pub enum Texture {
    /// Still image
    Still(StillTexture),
    /// Looping video stream
    Video(VideoStream),
}

impl Texture {
    /// Decoded `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Texture::Still(still) => (still.width, still.height),
            Texture::Video(video) => (video.width, video.height),
        }
    }

    /// Whether this texture is a video stream.
    pub fn is_video(&self) -> bool {
        matches!(self, Texture::Video(_))
    }

    /// Media kind this texture was decoded from.
    pub fn media_kind(&self) -> MediaKind {
        match self {
            Texture::Still(_) => MediaKind::Still,
            Texture::Video(_) => MediaKind::Video,
        }
    }
}
