//! Data models for the gallery catalog and tour graph.

mod catalog;
mod category;
mod graph;
mod hotspot;

pub use catalog::Catalog;
pub use category::{CatalogItem, Category, CategoryKind, MediaKind, default_node};
pub use graph::{DanglingReference, TourGraph};
pub use hotspot::{Annotation, HotspotSpec};
