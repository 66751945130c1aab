//! The render-facing state owned by the navigator: one background slot and one
//! hotspot container. The renderer reads it every frame; only the navigator
//! writes to it.

use std::sync::Arc;

use crate::hotspot::PlacedHotspot;
use crate::loader::Texture;

/// What is behind the viewer.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Background {
    /// The host's regular (non-panoramic) scene
    #[default]
    Scene,
    /// A tour node's panorama on the sky-sphere
    Panorama {
        /// Node whose panorama is shown
        node_id: String,
        /// Bound texture
        texture: Arc<Texture>,
    },
}

/// Playback state of the panoramic video slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Playback {
    /// Nothing playing
    #[default]
    Stopped,
    /// A panoramic video is looping
    Looping {
        /// URL of the video
        url: String,
    },
}

/// Background slot plus hotspot container.
#[derive(Debug, Default)]
pub struct Stage {
    background: Background,
    playback: Playback,
    hotspots: Vec<PlacedHotspot>,
}

impl Stage {
    /// Create a stage showing the regular scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current background.
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Current video playback.
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Installed hotspots.
    pub fn hotspots(&self) -> &[PlacedHotspot] {
        &self.hotspots
    }

    /// Node whose panorama is on screen, if any.
    pub fn displayed_node(&self) -> Option<&str> {
        match &self.background {
            Background::Panorama { node_id, .. } => Some(node_id),
            Background::Scene => None,
        }
    }

    /// Navigation target of the hotspot at `index`, for click mapping.
    pub fn target_of(&self, index: usize) -> Option<&str> {
        self.hotspots.get(index)?.target.as_deref()
    }

    /// Bind a panorama to the background. Video textures start looping.
    pub(crate) fn show_panorama(&mut self, node_id: &str, texture: Arc<Texture>) {
        self.stop_video();
        if let Texture::Video(stream) = texture.as_ref() {
            self.playback = Playback::Looping {
                url: stream.url.clone(),
            };
        }
        let (width, height) = texture.dimensions();
        log::debug!("Background -> '{}' ({}x{})", node_id, width, height);
        self.background = Background::Panorama {
            node_id: node_id.to_string(),
            texture,
        };
    }

    /// Replace the hotspot set in full.
    pub(crate) fn install_hotspots(&mut self, hotspots: Vec<PlacedHotspot>) {
        self.clear_hotspots();
        self.hotspots = hotspots;
    }

    /// Remove every hotspot.
    pub(crate) fn clear_hotspots(&mut self) {
        if !self.hotspots.is_empty() {
            log::trace!("Clearing {} hotspots", self.hotspots.len());
        }
        self.hotspots.clear();
    }

    /// Stop video and put the regular scene back.
    pub(crate) fn restore_background(&mut self) {
        self.stop_video();
        self.background = Background::Scene;
    }

    fn stop_video(&mut self) {
        if let Playback::Looping { url } = &self.playback {
            log::debug!("Stopping panoramic video {}", url);
        }
        self.playback = Playback::Stopped;
    }
}
