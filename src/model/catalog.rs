//! Catalog document parsing and validation.
//!
//! The gallery backend ships either a full project record (with the gallery
//! nested under `project_json`) or the bare gallery object. Both are accepted.
//! Parsing goes through loosely typed `Raw*` structs first, then validation turns
//! them into the typed model, dropping what cannot be rendered.

use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

use super::category::{CatalogItem, Category, CategoryKind, MediaKind};
use super::hotspot::{Annotation, HotspotSpec};
use crate::error::GalleryError;

/// A boolean that the backend sometimes sends as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn as_bool(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1" || s.eq_ignore_ascii_case("yes")
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawVec3 {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    text: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    size: f32,
}

#[derive(Debug, Deserialize)]
struct RawHotspot {
    #[serde(default)]
    position: RawVec3,
    #[serde(rename = "imageUid", default)]
    image_uid: Option<String>,
    #[serde(rename = "pathIconUrl", default)]
    path_icon_url: Option<String>,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default, alias = "_id")]
    uid: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    file_url: String,
    #[serde(default)]
    is_360: Option<Flag>,
    #[serde(default)]
    is_default: Option<Flag>,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    walk_through_data: Option<Vec<RawHotspot>>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    category_name: String,
    #[serde(default)]
    category_type: String,
    #[serde(default)]
    items: Option<Vec<RawItem>>,
}

#[derive(Debug, Deserialize)]
struct RawGallery {
    #[serde(rename = "categoriesWithGallery")]
    categories_with_gallery: Vec<RawCategory>,
}

/// Treat empty strings the way the backend means them: absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// The typed gallery catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Project name, when the document was a full project record
    pub project_name: Option<String>,
    /// Categories in document order, including empty ones
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Create a catalog from already typed categories.
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            project_name: None,
            categories,
        }
    }

    /// Parse and validate a catalog document.
    pub fn from_json(json: &str) -> Result<Self, GalleryError> {
        let mut document: serde_json::Value = serde_json::from_str(json)?;

        let project_name = document
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        // Full project records nest the gallery one level down
        let gallery_value = if document.get("project_json").is_some() {
            document["project_json"].take()
        } else {
            document
        };

        let raw: RawGallery = serde_json::from_value(gallery_value)?;
        let categories = raw
            .categories_with_gallery
            .into_iter()
            .enumerate()
            .map(|(index, category)| validate_category(index, category))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Parsed catalog with {} categories ({} non-empty)",
            categories.len(),
            categories.iter().filter(|c| !c.is_empty()).count()
        );

        Ok(Self {
            project_name,
            categories,
        })
    }

    /// Read and parse a catalog file.
    pub fn from_path(path: &Path) -> Result<Self, GalleryError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| GalleryError::malformed(format!("cannot read {:?}: {}", path, e)))?;
        Self::from_json(&json)
    }

    /// Categories that belong in the category list (empty ones are left out).
    pub fn visible_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| !c.is_empty())
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}

fn validate_category(index: usize, raw: RawCategory) -> Result<Category, GalleryError> {
    let name = if raw.category_name.trim().is_empty() {
        format!("category-{index}")
    } else {
        raw.category_name
    };

    let Some(raw_items) = raw.items else {
        return Err(GalleryError::malformed(format!(
            "category '{}' has no items array",
            name
        )));
    };

    let kind = CategoryKind::from_tag(&raw.category_type);
    if let CategoryKind::Unknown(tag) = &kind {
        log::warn!("Category '{}' has unknown type tag '{}'", name, tag);
    }

    let items = raw_items
        .into_iter()
        .enumerate()
        .map(|(item_index, item)| validate_item(&kind, item_index, item))
        .collect();

    Ok(Category::new(&name, kind, items))
}

fn validate_item(kind: &CategoryKind, index: usize, raw: RawItem) -> CatalogItem {
    let id = non_empty(raw.uid)
        .or_else(|| non_empty(Some(raw.name.clone())))
        .unwrap_or_else(|| format!("item-{index}"));

    if raw.file_url.trim().is_empty() {
        log::warn!("Item '{}' has no file_url", id);
    }

    let media_kind = match raw.media_type.as_deref().map(str::to_ascii_lowercase) {
        Some(t) if t == "video" => MediaKind::Video,
        Some(t) if t == "image" || t == "still" => MediaKind::Still,
        _ if *kind == CategoryKind::Video => MediaKind::Video,
        _ => MediaKind::from_url(&raw.file_url),
    };

    let flagged_360 = raw.is_360.as_ref().is_some_and(Flag::as_bool);
    let is_panoramic = match kind {
        CategoryKind::Panorama | CategoryKind::Tour => true,
        CategoryKind::Video => flagged_360,
        CategoryKind::Image => false,
        CategoryKind::Unknown(_) => flagged_360,
    };

    let hotspots: Vec<HotspotSpec> = raw
        .walk_through_data
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(hotspot_index, hotspot)| {
            let spec = validate_hotspot(hotspot);
            if spec.is_inert() {
                log::warn!(
                    "Dropping hotspot {} on '{}': no navigation target with icon and no annotation",
                    hotspot_index,
                    id
                );
                None
            } else {
                Some(spec)
            }
        })
        .collect();

    let item = CatalogItem {
        id,
        display_name: raw.name,
        media_url: raw.file_url,
        media_kind,
        is_panoramic,
        is_default_node: raw.is_default.as_ref().is_some_and(Flag::as_bool),
        hotspots: Vec::new(),
    };
    item.with_hotspots(hotspots)
}

fn validate_hotspot(raw: RawHotspot) -> HotspotSpec {
    HotspotSpec {
        anchor_position: Vec3::new(raw.position.x, raw.position.y, raw.position.z),
        target_node_id: non_empty(raw.image_uid),
        icon_ref: non_empty(raw.path_icon_url),
        annotation: raw
            .message
            .map(|m| Annotation {
                text: m.text,
                color: m.color,
                size: m.size,
            })
            .filter(Annotation::has_text),
    }
}
