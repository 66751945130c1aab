//! Hotspot placement: icon lookup, billboard orientation and content resolution.

mod icons;
mod placement;

pub use icons::{Icon, IconRegistry, bare_icon_name};
pub use placement::{
    HotspotPlacer, HotspotVisual, PlacedHotspot, PlacementConfig, facing_rotation, mirror_x,
};
