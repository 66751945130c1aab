//! Hotspot definitions attached to panorama nodes.

use glam::Vec3;

/// Styled text shown on an informational hotspot.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Text to display
    pub text: String,
    /// Color string as authored (HTML notation, may be invalid)
    pub color: String,
    /// Font size in points; non-positive means "use the default"
    pub size: f32,
}

impl Annotation {
    /// Create an annotation with the given text, color and size.
    pub fn new(text: &str, color: &str, size: f32) -> Self {
        Self {
            text: text.to_string(),
            color: color.to_string(),
            size,
        }
    }

    /// Whether there is any visible text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// A spatially anchored marker on a panorama.
///
/// Owned by its parent item and never mutated after the catalog is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotSpec {
    /// Anchor in the panorama's local (left-handed) frame
    pub anchor_position: Vec3,
    /// Node to navigate to; `None` means informational only
    pub target_node_id: Option<String>,
    /// Icon file reference, resolved by bare name against the icon registry
    pub icon_ref: Option<String>,
    /// Text annotation
    pub annotation: Option<Annotation>,
}

impl HotspotSpec {
    /// Create an empty (inert) hotspot at the given anchor.
    pub fn new(anchor_position: Vec3) -> Self {
        Self {
            anchor_position,
            target_node_id: None,
            icon_ref: None,
            annotation: None,
        }
    }

    /// Set the navigation target.
    pub fn with_target(mut self, node_id: &str) -> Self {
        self.target_node_id = Some(node_id.to_string());
        self
    }

    /// Set the icon reference.
    pub fn with_icon(mut self, icon_ref: &str) -> Self {
        self.icon_ref = Some(icon_ref.to_string());
        self
    }

    /// Set the annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Node this hotspot navigates to when clicked.
    ///
    /// Only icon hotspots navigate; a target on an annotation-only hotspot is ignored.
    pub fn navigation_target(&self) -> Option<&str> {
        self.icon_ref.as_ref()?;
        self.target_node_id.as_deref()
    }

    /// Annotation with visible text, if any.
    pub fn visible_annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref().filter(|a| a.has_text())
    }

    /// A hotspot with neither navigation nor text renders nothing useful.
    pub fn is_inert(&self) -> bool {
        self.navigation_target().is_none() && self.visible_annotation().is_none()
    }
}
