//! Routing of category and item selections.
//!
//! Tours and panoramic items go to the [`TourNavigator`]; flat images and videos
//! open in a stateless full-screen view where the last click wins.

use crate::error::GalleryError;
use crate::model::{CatalogItem, Category, CategoryKind, MediaKind};
use crate::tour::TourNavigator;

/// How a selection is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    /// Flat still image
    Image,
    /// Flat video
    Video,
    /// 360 still on the sky-sphere
    PanoramaImage,
    /// 360 video on the sky-sphere
    PanoramaVideo,
    /// Multi-node walkthrough
    Tour,
}

impl MediaClass {
    /// Whether this class is shown on the sky-sphere.
    pub fn is_panoramic(self) -> bool {
        matches!(
            self,
            MediaClass::PanoramaImage | MediaClass::PanoramaVideo | MediaClass::Tour
        )
    }

    /// Whether the media is a video stream.
    pub fn is_video(self) -> bool {
        matches!(self, MediaClass::Video | MediaClass::PanoramaVideo)
    }
}

/// Classify a whole category. Unknown kinds have no class.
///
/// Panorama categories take their class from the first item.
pub fn classify(category: &Category) -> Option<MediaClass> {
    match &category.kind {
        CategoryKind::Image => Some(MediaClass::Image),
        CategoryKind::Video => Some(MediaClass::Video),
        CategoryKind::Tour => Some(MediaClass::Tour),
        CategoryKind::Panorama => match category.items.first().map(|i| i.media_kind) {
            Some(MediaKind::Video) => Some(MediaClass::PanoramaVideo),
            _ => Some(MediaClass::PanoramaImage),
        },
        CategoryKind::Unknown(_) => None,
    }
}

/// Classify one item of a category of the given kind.
pub fn classify_item(kind: &CategoryKind, item: &CatalogItem) -> Option<MediaClass> {
    match kind {
        CategoryKind::Tour => Some(MediaClass::Tour),
        CategoryKind::Unknown(_) => None,
        _ => Some(match (item.is_panoramic, item.media_kind) {
            (true, MediaKind::Video) => MediaClass::PanoramaVideo,
            (true, MediaKind::Still) => MediaClass::PanoramaImage,
            (false, MediaKind::Video) => MediaClass::Video,
            (false, MediaKind::Still) => MediaClass::Image,
        }),
    }
}

/// One entry of a category's media list.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTile {
    /// Item id
    pub id: String,
    /// Caption
    pub name: String,
    /// Media URL
    pub url: String,
    /// `None` for items of unknown categories; they are listed but do not open
    pub class: Option<MediaClass>,
    /// Video tiles show a placeholder instead of a loaded thumbnail
    pub wants_thumbnail: bool,
}

impl MediaTile {
    fn new(kind: &CategoryKind, item: &CatalogItem) -> Self {
        let class = classify_item(kind, item);
        Self {
            id: item.id.clone(),
            name: item.display_name.clone(),
            url: item.media_url.clone(),
            class,
            wants_thumbnail: !class.is_some_and(MediaClass::is_video),
        }
    }
}

/// Flat media currently shown full-screen.
#[derive(Debug, Clone, PartialEq)]
pub struct FullscreenView {
    /// Item being shown
    pub item_id: String,
    /// Caption
    pub name: String,
    /// Media URL
    pub url: String,
    /// Image or Video
    pub class: MediaClass,
}

/// Routes selections to the navigator or the full-screen view.
pub struct MediaDispatcher {
    navigator: TourNavigator,
    fullscreen: Option<FullscreenView>,
}

impl MediaDispatcher {
    /// Create a dispatcher with nothing on screen.
    pub fn new(navigator: TourNavigator) -> Self {
        Self {
            navigator,
            fullscreen: None,
        }
    }

    /// The navigator tours and panoramas are handed to.
    pub fn navigator(&self) -> &TourNavigator {
        &self.navigator
    }

    /// Mutable navigator access, for polling and hotspot clicks.
    pub fn navigator_mut(&mut self) -> &mut TourNavigator {
        &mut self.navigator
    }

    /// The flat item on screen, if any.
    pub fn fullscreen(&self) -> Option<&FullscreenView> {
        self.fullscreen.as_ref()
    }

    /// Open a category: start a tour, or list its media.
    ///
    /// A flat first item is shown right away; 360 items wait for `open_item`.
    /// Tours return an empty tile list since the navigator takes over the view.
    pub fn open_category(&mut self, category: &Category) -> Result<Vec<MediaTile>, GalleryError> {
        let Some(class) = classify(category) else {
            log::warn!(
                "Category '{}' has unknown type '{}', no media view",
                category.name,
                category.kind.tag()
            );
            return Ok(self.tiles(category));
        };

        if class == MediaClass::Tour {
            self.fullscreen = None;
            self.navigator.start_tour(category)?;
            return Ok(Vec::new());
        }

        let tiles = self.tiles(category);
        if let Some(first) = category.items.first() {
            match classify_item(&category.kind, first) {
                Some(MediaClass::Image | MediaClass::Video) => self.show(category, first)?,
                _ => log::debug!("Not auto-showing 360 item '{}'", first.id),
            }
        }
        Ok(tiles)
    }

    /// Open one item of `category` by id.
    pub fn open_item(&mut self, category: &Category, item_id: &str) -> Result<(), GalleryError> {
        let item = category
            .item(item_id)
            .ok_or_else(|| GalleryError::unknown_node(item_id))?;
        self.show(category, item)
    }

    /// Close the full-screen view.
    pub fn close_fullscreen(&mut self) {
        if let Some(view) = self.fullscreen.take() {
            log::debug!("Closing full-screen view of '{}'", view.item_id);
        }
    }

    fn tiles(&self, category: &Category) -> Vec<MediaTile> {
        category
            .items
            .iter()
            .map(|item| MediaTile::new(&category.kind, item))
            .collect()
    }

    fn show(&mut self, category: &Category, item: &CatalogItem) -> Result<(), GalleryError> {
        match classify_item(&category.kind, item) {
            None => {
                log::warn!("Ignoring item '{}' of unknown media type", item.id);
                Ok(())
            }
            Some(MediaClass::Tour) => {
                self.fullscreen = None;
                self.navigator.start_tour(category)
            }
            Some(MediaClass::PanoramaImage | MediaClass::PanoramaVideo) => {
                self.fullscreen = None;
                self.navigator.start_panorama(item)
            }
            Some(class) => {
                log::debug!("Full-screen {:?} '{}'", class, item.id);
                self.fullscreen = Some(FullscreenView {
                    item_id: item.id.clone(),
                    name: item.display_name.clone(),
                    url: item.media_url.clone(),
                    class,
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;

    use super::*;
    use crate::hotspot::{HotspotPlacer, IconRegistry, PlacementConfig};
    use crate::loader::{ManualExecutor, MemorySource, PanoramaLoader, png_bytes};
    use crate::tour::TourState;

    fn dispatcher() -> (Arc<ManualExecutor>, MediaDispatcher) {
        let executor = Arc::new(ManualExecutor::new());
        let source = MemorySource::new().with("pano.png", png_bytes(2, 1, [9, 9, 9, 255]));
        let loader = PanoramaLoader::new(executor.clone(), Arc::new(source));
        let placer = HotspotPlacer::new(IconRegistry::new(), PlacementConfig::default());
        let navigator = TourNavigator::new(loader, placer, Vec3::ZERO);
        (executor, MediaDispatcher::new(navigator))
    }

    fn item(id: &str, url: &str) -> CatalogItem {
        CatalogItem::new(id, id, url, MediaKind::from_url(url))
    }

    #[test]
    fn test_classify_categories() {
        let photos = Category::new("P", CategoryKind::from_tag("I"), vec![item("a", "a.jpg")]);
        let videos = Category::new("V", CategoryKind::from_tag("V"), vec![item("a", "a.mp4")]);
        let sky = Category::new(
            "S",
            CategoryKind::from_tag("3"),
            vec![item("a", "a.mp4").panoramic()],
        );
        let walk = Category::new("W", CategoryKind::from_tag("W"), vec![item("a", "a.jpg")]);
        let odd = Category::new("X", CategoryKind::from_tag("Q"), vec![item("a", "a.jpg")]);

        assert_eq!(classify(&photos), Some(MediaClass::Image));
        assert_eq!(classify(&videos), Some(MediaClass::Video));
        assert_eq!(classify(&sky), Some(MediaClass::PanoramaVideo));
        assert_eq!(classify(&walk), Some(MediaClass::Tour));
        assert_eq!(classify(&odd), None);
    }

    #[test]
    fn test_classify_item_uses_panoramic_flag() {
        let kind = CategoryKind::Video;
        assert_eq!(
            classify_item(&kind, &item("a", "a.mp4").panoramic()),
            Some(MediaClass::PanoramaVideo)
        );
        assert_eq!(classify_item(&kind, &item("a", "a.mp4")), Some(MediaClass::Video));
    }

    #[test]
    fn test_flat_category_shows_first_item() {
        let (_, mut dispatcher) = dispatcher();
        let category = Category::new(
            "Clips",
            CategoryKind::Video,
            vec![item("one", "one.mp4"), item("two", "two.mp4")],
        );

        let tiles = dispatcher.open_category(&category).unwrap();
        assert_eq!(tiles.len(), 2);
        assert!(tiles.iter().all(|t| !t.wants_thumbnail));
        assert_eq!(dispatcher.fullscreen().unwrap().item_id, "one");

        // Last click replaces the view
        dispatcher.open_item(&category, "two").unwrap();
        assert_eq!(dispatcher.fullscreen().unwrap().item_id, "two");
        assert_eq!(dispatcher.fullscreen().unwrap().class, MediaClass::Video);

        dispatcher.close_fullscreen();
        assert!(dispatcher.fullscreen().is_none());
        assert_eq!(dispatcher.navigator().state(), &TourState::Idle);
    }

    #[test]
    fn test_tour_category_goes_to_navigator() {
        let (executor, mut dispatcher) = dispatcher();
        let category = Category::new(
            "Walk",
            CategoryKind::Tour,
            vec![item("hall", "pano.png").panoramic()],
        );

        let tiles = dispatcher.open_category(&category).unwrap();
        assert!(tiles.is_empty());
        assert!(dispatcher.fullscreen().is_none());

        executor.run_all();
        dispatcher.navigator_mut().poll();
        assert_eq!(
            dispatcher.navigator().state(),
            &TourState::Displaying {
                node: "hall".to_string()
            }
        );
    }

    #[test]
    fn test_panorama_item_opens_single_node_session() {
        let (executor, mut dispatcher) = dispatcher();
        let category = Category::new(
            "Sky",
            CategoryKind::Panorama,
            vec![item("dome", "pano.png").panoramic()],
        );

        let tiles = dispatcher.open_category(&category).unwrap();
        assert_eq!(tiles[0].class, Some(MediaClass::PanoramaImage));
        assert!(tiles[0].wants_thumbnail);
        assert_eq!(dispatcher.navigator().state(), &TourState::Idle);
        assert_eq!(executor.pending_count(), 0);

        dispatcher.open_item(&category, "dome").unwrap();
        executor.run_all();
        dispatcher.navigator_mut().poll();
        assert_eq!(dispatcher.navigator().stage().displayed_node(), Some("dome"));
    }

    #[test]
    fn test_360_first_item_is_not_auto_shown() {
        let (executor, mut dispatcher) = dispatcher();
        let category = Category::new(
            "Clips",
            CategoryKind::Video,
            vec![item("v", "v.mp4").panoramic(), item("w", "w.mp4")],
        );

        let tiles = dispatcher.open_category(&category).unwrap();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].class, Some(MediaClass::PanoramaVideo));
        assert_eq!(dispatcher.navigator().state(), &TourState::Idle);
        assert!(dispatcher.fullscreen().is_none());
        assert_eq!(executor.pending_count(), 0);

        dispatcher.open_item(&category, "w").unwrap();
        assert_eq!(dispatcher.fullscreen().unwrap().item_id, "w");
    }

    #[test]
    fn test_unknown_kind_lists_without_view() {
        let (executor, mut dispatcher) = dispatcher();
        let category = Category::new(
            "Mystery",
            CategoryKind::from_tag("Q"),
            vec![item("a", "a.jpg")],
        );

        let tiles = dispatcher.open_category(&category).unwrap();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].class, None);
        dispatcher.open_item(&category, "a").unwrap();
        assert!(dispatcher.fullscreen().is_none());
        assert_eq!(executor.pending_count(), 0);
    }

    #[test]
    fn test_open_missing_item() {
        let (_, mut dispatcher) = dispatcher();
        let category = Category::new("P", CategoryKind::Image, vec![item("a", "a.jpg")]);
        assert!(matches!(
            dispatcher.open_item(&category, "b"),
            Err(GalleryError::UnknownNode { .. })
        ));
    }
}
