//! vrtour - gallery and VR tour viewer core
//!
//! Parses a gallery catalog, loads panoramas in the background, places
//! hotspot billboards around the viewer and walks tours node by node. Rendering
//! is left to the host: it reads the [`tour::Stage`] every frame and maps clicks
//! to [`tour::TourNavigator::select_hotspot`].

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod hotspot;
pub mod loader;
pub mod model;
pub mod tour;

pub use config::ViewerConfig;
pub use dispatch::{MediaClass, MediaDispatcher};
pub use error::GalleryError;
pub use hotspot::{HotspotPlacer, IconRegistry, PlacementConfig};
pub use loader::{PanoramaLoader, ThreadExecutor};
pub use model::{Catalog, Category, CategoryKind};
pub use tour::{TourNavigator, TourState};
