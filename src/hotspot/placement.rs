//! Turning hotspot specs into viewer-facing billboards.
//!
//! Placement works in the render frame (right-handed, +Y up). Authored anchors
//! use a left-handed frame, so X is mirrored first. Each billboard is rotated so
//! its local +Z points away from the viewer, which keeps glyphs and text
//! readable from inside the panorama sphere.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::icons::{Icon, IconRegistry, bare_icon_name};
use crate::color_utils::{Rgba, parse_color_or};
use crate::constants::{
    DEFAULT_FONT_SIZE, DEFAULT_ICON_SCALE, DEFAULT_TEXT_COLOR, DEFAULT_TEXT_SCALE,
};
use crate::error::GalleryError;
use crate::model::HotspotSpec;

/// Sizing and fallback settings for placed billboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// World-space edge length of icon and marker billboards
    #[serde(default = "default_icon_scale")]
    pub icon_scale: f32,
    /// World units per font point for text billboards
    #[serde(default = "default_text_scale")]
    pub text_scale: f32,
    /// Font size for annotations without a usable size
    #[serde(default = "default_font_size")]
    pub default_font_size: f32,
    /// Color used when an annotation color is missing or invalid
    #[serde(default = "default_text_color")]
    pub fallback_color: Rgba,
}

fn default_icon_scale() -> f32 {
    DEFAULT_ICON_SCALE
}

fn default_text_scale() -> f32 {
    DEFAULT_TEXT_SCALE
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_text_color() -> Rgba {
    DEFAULT_TEXT_COLOR
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            icon_scale: default_icon_scale(),
            text_scale: default_text_scale(),
            default_font_size: default_font_size(),
            fallback_color: default_text_color(),
        }
    }
}

/// What a placed hotspot shows.
#[derive(Debug, Clone, PartialEq)]
pub enum HotspotVisual {
    /// Custom glyph from the icon registry
    Icon(Arc<Icon>),
    /// Generic marker used when the requested icon is missing
    Marker,
    /// Styled text billboard
    Text {
        /// Text to render
        text: String,
        /// Parsed color
        color: Rgba,
        /// Font size in points
        font_size: f32,
    },
}

/// A hotspot ready to be installed in the hotspot container.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedHotspot {
    /// Index of the spec this was placed from
    pub source_index: usize,
    /// Position in the render frame
    pub position: Vec3,
    /// Billboard orientation (local +Z points away from the viewer)
    pub rotation: Quat,
    /// Uniform world-space scale
    pub scale: f32,
    /// Content
    pub visual: HotspotVisual,
    /// Node to navigate to when clicked; `None` for non-interactive billboards
    pub target: Option<String>,
}

impl PlacedHotspot {
    /// Whether clicking this hotspot navigates.
    pub fn is_interactive(&self) -> bool {
        self.target.is_some()
    }

    /// Visible text, for text billboards.
    pub fn text(&self) -> Option<&str> {
        match &self.visual {
            HotspotVisual::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Convert an authored (left-handed) anchor into the render frame.
pub fn mirror_x(anchor: Vec3) -> Vec3 {
    Vec3::new(-anchor.x, anchor.y, anchor.z)
}

/// Rotation whose local +Z is `forward`, keeping local +Y as close to `up` as possible.
fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    // Looking straight up or down: any horizontal axis works as a reference
    let up = if forward.cross(up).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        up
    };
    let right = up.cross(forward).normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

/// Orientation of a billboard at `position` seen from `viewer`.
///
/// Looks at the viewer, then turns 180° about local up so content is not
/// mirrored. A viewer exactly at the anchor gets the unrotated billboard turned
/// about up.
pub fn facing_rotation(position: Vec3, viewer: Vec3) -> Quat {
    let half_turn = Quat::from_rotation_y(PI);
    match (viewer - position).try_normalize() {
        Some(forward) => (look_rotation(forward, Vec3::Y) * half_turn).normalize(),
        None => half_turn,
    }
}

/// Places hotspots against an icon registry.
pub struct HotspotPlacer {
    icons: IconRegistry,
    config: PlacementConfig,
}

impl HotspotPlacer {
    /// Create a placer.
    pub fn new(icons: IconRegistry, config: PlacementConfig) -> Self {
        Self { icons, config }
    }

    /// The icon registry.
    pub fn icons(&self) -> &IconRegistry {
        &self.icons
    }

    /// Current placement settings.
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Place every non-inert spec, in order.
    ///
    /// Always returns a fresh set; the caller replaces the previous set in full.
    pub fn place_hotspots(&self, specs: &[HotspotSpec], viewer_position: Vec3) -> Vec<PlacedHotspot> {
        specs
            .iter()
            .enumerate()
            .filter_map(|(index, spec)| self.place_one(index, spec, viewer_position))
            .collect()
    }

    /// Place a single spec. Inert specs produce nothing.
    pub fn place_one(
        &self,
        index: usize,
        spec: &HotspotSpec,
        viewer_position: Vec3,
    ) -> Option<PlacedHotspot> {
        if spec.is_inert() {
            return None;
        }
        let (visual, target) = self.resolve_visual(spec)?;
        let position = mirror_x(spec.anchor_position);
        let scale = match &visual {
            HotspotVisual::Text { font_size, .. } => font_size * self.config.text_scale,
            HotspotVisual::Icon(_) | HotspotVisual::Marker => self.config.icon_scale,
        };

        Some(PlacedHotspot {
            source_index: index,
            position,
            rotation: facing_rotation(position, viewer_position),
            scale,
            visual,
            target,
        })
    }

    /// Pick the content: icon first, annotation text otherwise.
    fn resolve_visual(&self, spec: &HotspotSpec) -> Option<(HotspotVisual, Option<String>)> {
        let target = spec.target_node_id.clone();

        if let Some(icon_ref) = &spec.icon_ref {
            match self.icons.resolve(icon_ref) {
                Some(icon) => return Some((HotspotVisual::Icon(icon), target)),
                None => {
                    log::warn!("{}", GalleryError::icon_not_found(bare_icon_name(icon_ref)));
                    if target.is_some() {
                        return Some((HotspotVisual::Marker, target));
                    }
                    // Nothing to navigate to: fall through and show the text instead
                }
            }
        }

        let annotation = spec.visible_annotation()?;
        let color = if annotation.color.trim().is_empty() {
            self.config.fallback_color
        } else {
            parse_color_or(&annotation.color, self.config.fallback_color)
        };
        let font_size = if annotation.size > 0.0 {
            annotation.size
        } else {
            self.config.default_font_size
        };

        // Text billboards never navigate, even when a target was authored
        Some((
            HotspotVisual::Text {
                text: annotation.text.clone(),
                color,
                font_size,
            },
            None,
        ))
    }
}
