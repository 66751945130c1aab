//! Global constants for the gallery core

/// File extensions treated as video when an item does not declare its media type
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "mkv"];

/// File extensions the icon registry picks up from a directory
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "tif"];

/// World-space edge length of an icon billboard
pub const DEFAULT_ICON_SCALE: f32 = 0.5;

/// World units per font point for text billboards
pub const DEFAULT_TEXT_SCALE: f32 = 0.01;

/// Font size used when an annotation does not carry a usable size
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Fallback color for annotations whose color cannot be parsed (white)
pub const DEFAULT_TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Name of the background worker thread used for panorama loads
pub const LOADER_THREAD_NAME: &str = "panorama-loader";
