//! The tour state machine.
//!
//! ```text
//! Idle --start_tour--> Loading(default) --load ok--> Displaying(n)
//! Displaying(n) --select_hotspot(t)--> Loading(t, previous = n)
//! Loading(t) --load failed--> Displaying(previous) | Idle (no previous)
//! any --exit--> Idle
//! ```
//!
//! Hotspots for a node are only installed after that node's panorama is on the
//! background, and they are removed the moment a different node starts loading.

use glam::Vec3;

use super::session::TourSession;
use super::stage::Stage;
use crate::error::GalleryError;
use crate::hotspot::HotspotPlacer;
use crate::loader::{LoadCompletion, PanoramaLoader};
use crate::model::{CatalogItem, Category, CategoryKind, TourGraph};

/// Where the viewer's eye is, in the panorama frame.
pub trait ViewerPosition {
    /// Current eye position. Queried once per placement.
    fn viewer_position(&self) -> Vec3;
}

impl ViewerPosition for Vec3 {
    fn viewer_position(&self) -> Vec3 {
        *self
    }
}

impl<F: Fn() -> Vec3> ViewerPosition for F {
    fn viewer_position(&self) -> Vec3 {
        self()
    }
}

/// Notifications for the surrounding UI.
pub trait TourListener {
    /// A node became the displayed node.
    fn on_navigate(&mut self, _node_id: &str) {}

    /// `exit()` finished; the UI can restore its previous panels.
    fn on_tour_exit(&mut self) {}

    /// A load failed and there was no previous node to fall back to.
    fn on_load_error(&mut self, _error: &GalleryError) {}
}

/// Listener that ignores everything.
pub struct NoopListener;

impl TourListener for NoopListener {}

/// Navigator state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TourState {
    /// No tour active
    #[default]
    Idle,
    /// Waiting for a node's panorama
    Loading {
        /// Node being loaded
        node: String,
        /// Node still on screen, if any
        previous: Option<String>,
    },
    /// A node's panorama and hotspots are on screen
    Displaying {
        /// Displayed node
        node: String,
    },
}

impl TourState {
    /// Short state name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            TourState::Idle => "idle",
            TourState::Loading { .. } => "loading",
            TourState::Displaying { .. } => "displaying",
        }
    }
}

/// Drives a tour: owns the session, the loader and the stage.
pub struct TourNavigator {
    loader: PanoramaLoader,
    placer: HotspotPlacer,
    viewer: Box<dyn ViewerPosition>,
    listener: Box<dyn TourListener>,
    state: TourState,
    session: Option<TourSession>,
    stage: Stage,
}

impl TourNavigator {
    /// Create an idle navigator.
    pub fn new(
        loader: PanoramaLoader,
        placer: HotspotPlacer,
        viewer: impl ViewerPosition + 'static,
    ) -> Self {
        Self {
            loader,
            placer,
            viewer: Box::new(viewer),
            listener: Box::new(NoopListener),
            state: TourState::Idle,
            session: None,
            stage: Stage::new(),
        }
    }

    /// Attach a listener (builder style).
    pub fn with_listener(mut self, listener: impl TourListener + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    /// Replace the listener.
    pub fn set_listener(&mut self, listener: impl TourListener + 'static) {
        self.listener = Box::new(listener);
    }

    /// Replace the viewer position provider.
    pub fn set_viewer(&mut self, viewer: impl ViewerPosition + 'static) {
        self.viewer = Box::new(viewer);
    }

    /// Current state.
    pub fn state(&self) -> &TourState {
        &self.state
    }

    /// Render-facing state.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<&TourSession> {
        self.session.as_ref()
    }

    /// Whether a tour is live.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The hotspot placer (and its icon registry).
    pub fn placer(&self) -> &HotspotPlacer {
        &self.placer
    }

    /// Open a tour category at its default node.
    ///
    /// Any live tour is torn down first, together with its pending load.
    pub fn start_tour(&mut self, category: &Category) -> Result<(), GalleryError> {
        if category.kind != CategoryKind::Tour {
            return Err(GalleryError::NotATour {
                category: category.name.clone(),
            });
        }
        if category.is_empty() {
            return Err(GalleryError::EmptyCategory {
                category: category.name.clone(),
            });
        }

        let graph = TourGraph::from_items(&category.items);
        graph.log_diagnostics();
        log::info!(
            "Starting tour '{}' with {} nodes",
            category.name,
            graph.len()
        );
        self.begin_session(&category.name, graph)
    }

    /// Show a standalone panoramic item as a single-node tour.
    pub fn start_panorama(&mut self, item: &CatalogItem) -> Result<(), GalleryError> {
        if !item.is_panoramic {
            log::warn!("Showing non-panoramic item '{}' on the sky-sphere", item.id);
        }
        log::info!("Opening panorama '{}'", item.id);
        self.begin_session(&item.display_name, TourGraph::from_items(std::slice::from_ref(item)))
    }

    /// Apply finished loads. Returns true if the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(completion) = self.loader.poll() {
            changed |= self.apply_completion(completion);
        }
        changed
    }

    /// Follow a hotspot to `target_node_id`.
    ///
    /// Only valid while displaying. An unknown target is logged and leaves the
    /// state untouched.
    pub fn select_hotspot(&mut self, target_node_id: &str) -> Result<(), GalleryError> {
        let TourState::Displaying { node } = &self.state else {
            return Err(GalleryError::InvalidState {
                operation: "select a hotspot",
                state: self.state.name(),
            });
        };
        let current = node.clone();

        let known = self
            .session
            .as_ref()
            .is_some_and(|s| s.graph().contains(target_node_id));
        if !known {
            let err = GalleryError::unknown_node(target_node_id);
            log::warn!("{} (staying on '{}')", err, current);
            return Err(err);
        }

        log::debug!("Hotspot selected: '{}' -> '{}'", current, target_node_id);
        // Stale click handlers must not outlive the node they belong to
        self.stage.clear_hotspots();
        self.begin_load(target_node_id, Some(current));
        Ok(())
    }

    /// Re-place the current node's hotspots from a fresh viewer position.
    pub fn refresh_hotspots(&mut self) -> Result<(), GalleryError> {
        let TourState::Displaying { node } = &self.state else {
            return Err(GalleryError::InvalidState {
                operation: "refresh hotspots",
                state: self.state.name(),
            });
        };
        let node = node.clone();
        self.install_hotspots_for(&node);
        Ok(())
    }

    /// Leave the tour and restore the pre-tour background. No-op when idle.
    pub fn exit(&mut self) {
        if self.state == TourState::Idle && self.session.is_none() {
            log::debug!("exit() while idle, nothing to do");
            return;
        }
        log::info!("Exiting tour");
        self.teardown();
        self.listener.on_tour_exit();
    }

    fn begin_session(&mut self, name: &str, graph: TourGraph) -> Result<(), GalleryError> {
        if self.session.is_some() {
            log::debug!("Replacing live tour session");
            self.teardown();
        }

        let Some(entry) = graph.default_node().map(|n| n.id.clone()) else {
            return Err(GalleryError::EmptyCategory {
                category: name.to_string(),
            });
        };

        self.session = Some(TourSession::new(name, graph));
        self.begin_load(&entry, None);
        Ok(())
    }

    fn begin_load(&mut self, node_id: &str, previous: Option<String>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(node) = session.graph().node(node_id) else {
            return;
        };

        let token = self.loader.load(&node.media_url, node.media_kind);
        session.set_active_load(token.id());
        log::debug!(
            "Loading node '{}' (previous: {:?})",
            node_id,
            previous.as_deref()
        );
        self.state = TourState::Loading {
            node: node_id.to_string(),
            previous,
        };
    }

    fn apply_completion(&mut self, completion: LoadCompletion) -> bool {
        let TourState::Loading { node, previous } = self.state.clone() else {
            log::debug!("Ignoring load completion while {}", self.state.name());
            return false;
        };
        let expected = self.session.as_ref().and_then(|s| s.active_load());
        if expected != Some(completion.token_id) {
            log::debug!("Ignoring completion of superseded load {}", completion.token_id);
            return false;
        }

        match completion.result {
            Ok(texture) => {
                self.stage.show_panorama(&node, texture);
                if let Some(session) = self.session.as_mut() {
                    session.set_current_node(&node);
                }
                self.state = TourState::Displaying { node: node.clone() };
                self.install_hotspots_for(&node);
                log::info!("Displaying node '{}'", node);
                self.listener.on_navigate(&node);
            }
            Err(err) => match previous {
                Some(previous) => {
                    log::warn!("{}; staying on '{}'", err, previous);
                    self.state = TourState::Displaying {
                        node: previous.clone(),
                    };
                    self.install_hotspots_for(&previous);
                }
                None => {
                    log::error!("{}; closing tour", err);
                    self.teardown();
                    self.listener.on_load_error(&err);
                }
            },
        }
        true
    }

    fn install_hotspots_for(&mut self, node_id: &str) {
        let Some(node) = self.session.as_ref().and_then(|s| s.graph().node(node_id)) else {
            self.stage.clear_hotspots();
            return;
        };

        let viewer = self.viewer.viewer_position();
        let placed = self.placer.place_hotspots(&node.hotspots, viewer);
        if placed.is_empty() {
            log::debug!("Node '{}' has no hotspots", node_id);
        } else {
            log::debug!("Installing {} hotspots on '{}'", placed.len(), node_id);
        }
        self.stage.install_hotspots(placed);
    }

    fn teardown(&mut self) {
        self.loader.cancel();
        self.stage.clear_hotspots();
        self.stage.restore_background();
        self.session = None;
        self.state = TourState::Idle;
    }
}
