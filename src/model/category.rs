//! Categories and the media items they contain.

use super::hotspot::HotspotSpec;
use crate::constants::VIDEO_EXTENSIONS;

/// How an item's bytes are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Still image
    Still,
    /// Video stream
    Video,
}

impl MediaKind {
    /// Guess the media kind from a URL's file extension.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let is_video = path
            .rsplit_once('.')
            .map(|(_, ext)| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_video { Self::Video } else { Self::Still }
    }
}

/// A leaf media entry of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    /// Identifier, unique within its tour
    pub id: String,
    /// Name shown on the media tile
    pub display_name: String,
    /// Where the media bytes are fetched from
    pub media_url: String,
    /// Still or video
    pub media_kind: MediaKind,
    /// Whether the media wraps around the viewer
    pub is_panoramic: bool,
    /// Entry point of a tour
    pub is_default_node: bool,
    /// Hotspots; always empty for non-panoramic items
    pub hotspots: Vec<HotspotSpec>,
}

impl CatalogItem {
    /// Create a flat (non-panoramic) item.
    pub fn new(id: &str, display_name: &str, media_url: &str, media_kind: MediaKind) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            media_url: media_url.to_string(),
            media_kind,
            is_panoramic: false,
            is_default_node: false,
            hotspots: Vec::new(),
        }
    }

    /// Mark the item as panoramic.
    pub fn panoramic(mut self) -> Self {
        self.is_panoramic = true;
        self
    }

    /// Mark the item as the default tour node.
    pub fn as_default(mut self) -> Self {
        self.is_default_node = true;
        self
    }

    /// Attach hotspots. Ignored (with a warning) on non-panoramic items.
    pub fn with_hotspots(mut self, hotspots: Vec<HotspotSpec>) -> Self {
        if !self.is_panoramic && !hotspots.is_empty() {
            log::warn!(
                "Dropping {} hotspots on non-panoramic item '{}'",
                hotspots.len(),
                self.id
            );
            return self;
        }
        self.hotspots = hotspots;
        self
    }
}

/// Type tag of a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryKind {
    /// Flat images
    Image,
    /// Videos (flat or 360)
    Video,
    /// Standalone 360 images or videos
    Panorama,
    /// Multi-node walkthrough
    Tour,
    /// Tag the viewer does not understand; still listed, never opened
    Unknown(String),
}

impl CategoryKind {
    /// Parse a category type tag (`I`, `V`, `3`, `W` or their long names).
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "i" | "image" | "images" => Self::Image,
            "v" | "video" | "videos" => Self::Video,
            "3" | "360" | "panorama" | "360image" => Self::Panorama,
            "w" | "tour" | "walkthrough" | "vrtour" => Self::Tour,
            _ => Self::Unknown(tag.to_string()),
        }
    }

    /// Short tag for this kind.
    pub fn tag(&self) -> &str {
        match self {
            Self::Image => "I",
            Self::Video => "V",
            Self::Panorama => "3",
            Self::Tour => "W",
            Self::Unknown(tag) => tag,
        }
    }
}

/// A named group of media items.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Display name
    pub name: String,
    /// Type tag
    pub kind: CategoryKind,
    /// Items in catalog order
    pub items: Vec<CatalogItem>,
}

impl Category {
    /// Create a category.
    pub fn new(name: &str, kind: CategoryKind, items: Vec<CatalogItem>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            items,
        }
    }

    /// Whether the category has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entry node of this category when opened as a tour.
    pub fn default_node(&self) -> Option<&CatalogItem> {
        default_node(&self.items)
    }

    /// Look up an item by id.
    pub fn item(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Pick the entry node of a tour.
///
/// The first item flagged as default wins; without a flag the first item is used.
/// Only returns `None` for an empty slice.
pub fn default_node(items: &[CatalogItem]) -> Option<&CatalogItem> {
    items
        .iter()
        .find(|item| item.is_default_node)
        .or_else(|| items.first())
}
