//! Runtime data of the live tour.

use crate::model::{CatalogItem, TourGraph};

/// A live tour: its node graph, the node on screen and the load it waits for.
#[derive(Debug)]
pub struct TourSession {
    name: String,
    graph: TourGraph,
    current_node: Option<String>,
    active_load: Option<u64>,
}

impl TourSession {
    pub(crate) fn new(name: &str, graph: TourGraph) -> Self {
        Self {
            name: name.to_string(),
            graph,
            current_node: None,
            active_load: None,
        }
    }

    /// Name of the category (or item) the tour was opened from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tour's node graph.
    pub fn graph(&self) -> &TourGraph {
        &self.graph
    }

    /// Node whose panorama was last displayed successfully.
    pub fn current_node_id(&self) -> Option<&str> {
        self.current_node.as_deref()
    }

    /// Catalog item of the current node.
    pub fn current_node(&self) -> Option<&CatalogItem> {
        self.graph.node(self.current_node.as_deref()?)
    }

    /// Token id of the in-flight (or most recent) load.
    pub fn active_load(&self) -> Option<u64> {
        self.active_load
    }

    pub(crate) fn set_current_node(&mut self, node_id: &str) {
        self.current_node = Some(node_id.to_string());
    }

    pub(crate) fn set_active_load(&mut self, token_id: u64) {
        self.active_load = Some(token_id);
    }
}
