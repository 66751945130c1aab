use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec3;

use super::*;
use crate::error::GalleryError;
use crate::hotspot::{HotspotPlacer, HotspotVisual, Icon, IconRegistry, PlacementConfig};
use crate::loader::{ManualExecutor, MemorySource, PanoramaLoader, mp4_bytes, png_bytes};
use crate::model::{Annotation, CatalogItem, Category, CategoryKind, HotspotSpec, MediaKind};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Navigate(String),
    Exit,
    LoadError(String),
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<Event>>>);

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }
}

impl TourListener for Recorder {
    fn on_navigate(&mut self, node_id: &str) {
        self.0.borrow_mut().push(Event::Navigate(node_id.to_string()));
    }

    fn on_tour_exit(&mut self) {
        self.0.borrow_mut().push(Event::Exit);
    }

    fn on_load_error(&mut self, error: &GalleryError) {
        self.0.borrow_mut().push(Event::LoadError(error.to_string()));
    }
}

struct Harness {
    executor: Arc<ManualExecutor>,
    navigator: TourNavigator,
    events: Recorder,
}

impl Harness {
    fn new() -> Self {
        let source = MemorySource::new()
            .with("a.png", png_bytes(2, 1, [255, 0, 0, 255]))
            .with("b.png", png_bytes(2, 1, [0, 255, 0, 255]))
            .with("c.png", png_bytes(2, 1, [0, 0, 255, 255]))
            .with("d.mp4", mp4_bytes(3840, 1920))
            .with("broken.png", b"not an image".to_vec());

        let executor = Arc::new(ManualExecutor::new());
        let loader = PanoramaLoader::new(executor.clone(), Arc::new(source));

        let mut icons = IconRegistry::new();
        let arrow = Icon::from_bytes("arrow", &png_bytes(4, 4, [255, 255, 255, 255])).unwrap();
        icons.insert("arrow", arrow);
        let placer = HotspotPlacer::new(icons, PlacementConfig::default());

        let events = Recorder::default();
        let navigator = TourNavigator::new(loader, placer, Vec3::ZERO).with_listener(events.clone());
        Self {
            executor,
            navigator,
            events,
        }
    }

    /// Run every queued load and apply the results.
    fn settle(&mut self) {
        self.executor.run_all();
        self.navigator.poll();
    }
}

fn node(id: &str, url: &str) -> CatalogItem {
    CatalogItem::new(id, id, url, MediaKind::from_url(url)).panoramic()
}

fn house_tour() -> Category {
    let b_hotspots = vec![
        HotspotSpec::new(Vec3::new(1.0, 0.0, 5.0))
            .with_icon("icons/arrow.png")
            .with_target("C"),
        HotspotSpec::new(Vec3::new(-1.0, 1.0, 5.0))
            .with_annotation(Annotation::new("Kitchen", "#ZZZZZZ", 0.0)),
        HotspotSpec::new(Vec3::new(0.0, 0.0, -5.0))
            .with_icon("arrow")
            .with_target("Z"),
    ];
    let c_hotspots = vec![
        HotspotSpec::new(Vec3::new(0.0, 0.0, 5.0))
            .with_icon("arrow")
            .with_target("B"),
        HotspotSpec::new(Vec3::new(0.0, 0.0, -5.0))
            .with_icon("arrow")
            .with_target("broken"),
    ];
    Category::new(
        "House",
        CategoryKind::Tour,
        vec![
            node("A", "a.png"),
            node("B", "b.png").as_default().with_hotspots(b_hotspots),
            node("C", "c.png").with_hotspots(c_hotspots),
            node("broken", "broken.png"),
            node("D", "d.mp4"),
        ],
    )
}

fn displaying(node: &str) -> TourState {
    TourState::Displaying {
        node: node.to_string(),
    }
}

#[test]
fn test_start_tour_shows_default_node() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();

    assert!(matches!(h.navigator.state(), TourState::Loading { node, previous: None } if node == "B"));
    assert!(h.navigator.stage().hotspots().is_empty());
    assert_eq!(h.navigator.stage().background(), &Background::Scene);

    h.settle();
    assert_eq!(h.navigator.state(), &displaying("B"));
    assert_eq!(h.navigator.stage().displayed_node(), Some("B"));
    assert_eq!(h.navigator.session().unwrap().current_node_id(), Some("B"));
    assert_eq!(h.events.events(), vec![Event::Navigate("B".into())]);
}

#[test]
fn test_hotspots_installed_after_background() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.settle();

    let hotspots = h.navigator.stage().hotspots();
    assert_eq!(hotspots.len(), 3);
    assert_eq!(h.navigator.stage().target_of(0), Some("C"));
    assert!(matches!(hotspots[0].visual, HotspotVisual::Icon(_)));
    assert_eq!(hotspots[0].position, Vec3::new(-1.0, 0.0, 5.0));
}

#[test]
fn test_invalid_annotation_color_falls_back_to_white() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.settle();

    let text = &h.navigator.stage().hotspots()[1];
    assert_eq!(text.text(), Some("Kitchen"));
    assert!(!text.is_interactive());
    match &text.visual {
        HotspotVisual::Text {
            color, font_size, ..
        } => {
            assert_eq!(*color, [255, 255, 255, 255]);
            assert_eq!(*font_size, PlacementConfig::default().default_font_size);
        }
        other => panic!("expected text billboard, got {:?}", other),
    }
}

#[test]
fn test_click_through_to_next_node() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.settle();

    let target = h.navigator.stage().target_of(0).unwrap().to_string();
    h.navigator.select_hotspot(&target).unwrap();
    assert!(h.navigator.stage().hotspots().is_empty());
    assert!(matches!(
        h.navigator.state(),
        TourState::Loading { node, previous: Some(prev) } if node == "C" && prev == "B"
    ));
    // The old panorama stays up while the next one loads
    assert_eq!(h.navigator.stage().displayed_node(), Some("B"));

    h.settle();
    assert_eq!(h.navigator.state(), &displaying("C"));
    assert_eq!(h.navigator.stage().displayed_node(), Some("C"));
    assert_eq!(h.navigator.stage().target_of(0), Some("B"));
    assert_eq!(
        h.events.events(),
        vec![Event::Navigate("B".into()), Event::Navigate("C".into())]
    );
}

#[test]
fn test_unknown_target_is_ignored() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.settle();

    let before = h.navigator.stage().hotspots().to_vec();
    let err = h.navigator.select_hotspot("Z").unwrap_err();
    assert_eq!(err, GalleryError::unknown_node("Z"));
    assert_eq!(h.navigator.state(), &displaying("B"));
    assert_eq!(h.navigator.stage().hotspots(), before.as_slice());
    assert_eq!(h.executor.pending_count(), 0);
}

#[test]
fn test_select_while_loading_is_rejected() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();

    let err = h.navigator.select_hotspot("C").unwrap_err();
    assert_eq!(
        err,
        GalleryError::InvalidState {
            operation: "select a hotspot",
            state: "loading",
        }
    );
}

#[test]
fn test_stale_load_does_not_show() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.settle();

    // Leave C's load pending, then restart the tour at B
    h.navigator.select_hotspot("C").unwrap();
    h.navigator.start_tour(&house_tour()).unwrap();

    // The newest job (B) finishes first, the stale one (C) afterwards
    h.executor.run_latest();
    h.executor.run_all();
    h.navigator.poll();

    assert_eq!(h.navigator.state(), &displaying("B"));
    assert_eq!(h.navigator.stage().displayed_node(), Some("B"));
    assert_eq!(h.navigator.stage().hotspots().len(), 3);
}

#[test]
fn test_masked_load_failure_stays_on_previous() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.settle();
    h.navigator.select_hotspot("C").unwrap();
    h.settle();

    h.navigator.select_hotspot("broken").unwrap();
    assert!(h.navigator.stage().hotspots().is_empty());
    h.settle();

    assert_eq!(h.navigator.state(), &displaying("C"));
    assert_eq!(h.navigator.stage().displayed_node(), Some("C"));
    assert_eq!(h.navigator.stage().hotspots().len(), 2);
    assert!(!h.events.events().iter().any(|e| matches!(e, Event::LoadError(_))));
}

#[test]
fn test_initial_load_failure_returns_to_idle() {
    let mut h = Harness::new();
    let tour = Category::new(
        "Broken",
        CategoryKind::Tour,
        vec![node("X", "missing.png").as_default()],
    );
    h.navigator.start_tour(&tour).unwrap();
    h.settle();

    assert_eq!(h.navigator.state(), &TourState::Idle);
    assert!(!h.navigator.is_active());
    assert_eq!(h.navigator.stage().background(), &Background::Scene);
    let events = h.events.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Event::LoadError(msg) if msg.contains("missing.png")));
}

#[test]
fn test_exit_restores_scene() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.settle();

    h.navigator.exit();
    assert_eq!(h.navigator.state(), &TourState::Idle);
    assert!(h.navigator.session().is_none());
    assert_eq!(h.navigator.stage().background(), &Background::Scene);
    assert_eq!(h.navigator.stage().playback(), &Playback::Stopped);
    assert!(h.navigator.stage().hotspots().is_empty());
    assert_eq!(h.events.events().last(), Some(&Event::Exit));
}

#[test]
fn test_exit_after_navigating_while_next_node_loads() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.settle();
    h.navigator.select_hotspot("C").unwrap();
    h.settle();

    // C's panorama is still on the background while B loads
    h.navigator.select_hotspot("B").unwrap();
    assert!(matches!(
        h.navigator.state(),
        TourState::Loading { previous: Some(prev), .. } if prev == "C"
    ));
    h.navigator.exit();
    h.settle();

    assert_eq!(h.navigator.state(), &TourState::Idle);
    assert_eq!(h.navigator.stage().background(), &Background::Scene);
    assert_eq!(h.navigator.stage().playback(), &Playback::Stopped);
    assert!(h.navigator.stage().hotspots().is_empty());
    assert_eq!(
        h.events.events(),
        vec![
            Event::Navigate("B".into()),
            Event::Navigate("C".into()),
            Event::Exit
        ]
    );
}

#[test]
fn test_exit_while_loading_drops_the_load() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.navigator.exit();
    h.settle();

    assert_eq!(h.navigator.state(), &TourState::Idle);
    assert_eq!(h.navigator.stage().background(), &Background::Scene);
    assert_eq!(h.events.events(), vec![Event::Exit]);
}

#[test]
fn test_exit_when_idle_is_noop() {
    let mut h = Harness::new();
    h.navigator.exit();
    assert!(h.events.events().is_empty());
}

#[test]
fn test_video_node_loops_and_stops_on_exit() {
    let mut h = Harness::new();
    let tour = Category::new(
        "Video tour",
        CategoryKind::Tour,
        vec![node("D", "d.mp4").as_default()],
    );
    h.navigator.start_tour(&tour).unwrap();
    h.settle();

    assert_eq!(
        h.navigator.stage().playback(),
        &Playback::Looping {
            url: "d.mp4".to_string()
        }
    );
    h.navigator.exit();
    assert_eq!(h.navigator.stage().playback(), &Playback::Stopped);
}

#[test]
fn test_start_tour_rejects_non_tours() {
    let mut h = Harness::new();
    let gallery = Category::new("Photos", CategoryKind::Image, vec![node("A", "a.png")]);
    assert!(matches!(
        h.navigator.start_tour(&gallery),
        Err(GalleryError::NotATour { .. })
    ));

    let empty = Category::new("Empty", CategoryKind::Tour, Vec::new());
    assert!(matches!(
        h.navigator.start_tour(&empty),
        Err(GalleryError::EmptyCategory { .. })
    ));
    assert_eq!(h.navigator.state(), &TourState::Idle);
}

#[test]
fn test_first_item_is_default_when_none_flagged() {
    let mut h = Harness::new();
    let tour = Category::new(
        "Flat",
        CategoryKind::Tour,
        vec![node("A", "a.png"), node("C", "c.png")],
    );
    h.navigator.start_tour(&tour).unwrap();
    h.settle();
    assert_eq!(h.navigator.state(), &displaying("A"));
}

#[test]
fn test_start_panorama_is_single_node_session() {
    let mut h = Harness::new();
    h.navigator.start_panorama(&node("A", "a.png")).unwrap();
    h.settle();

    assert_eq!(h.navigator.state(), &displaying("A"));
    assert_eq!(h.navigator.session().unwrap().graph().len(), 1);
    assert!(h.navigator.stage().hotspots().is_empty());
}

#[test]
fn test_refresh_uses_current_viewer_position() {
    let mut h = Harness::new();
    h.navigator.start_tour(&house_tour()).unwrap();
    h.settle();
    let before = h.navigator.stage().hotspots()[0].rotation;

    h.navigator.set_viewer(Vec3::new(-1.0, 0.0, 0.0));
    h.navigator.refresh_hotspots().unwrap();
    let after = h.navigator.stage().hotspots()[0].rotation;
    assert_ne!(before, after);
    assert_eq!(h.navigator.stage().hotspots().len(), 3);
}
