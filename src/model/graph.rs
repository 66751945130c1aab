//! Explicit node graph of a VR tour.
//!
//! Nodes are the tour's panoramic items; edges come from each node's navigable
//! hotspots. Keeping the graph explicit lets reachability, cycles and dangling
//! hotspot targets be checked without any rendering.

use std::collections::{BTreeSet, HashMap, VecDeque};

use super::category::{CatalogItem, default_node};

/// A hotspot target that does not name a node of the tour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Node carrying the hotspot
    pub from: String,
    /// Target that could not be resolved
    pub target: String,
}

/// Mapping from node id to node, plus the adjacency implied by hotspots.
#[derive(Debug, Clone, Default)]
pub struct TourGraph {
    nodes: Vec<CatalogItem>,
    index: HashMap<String, usize>,
}

impl TourGraph {
    /// Build a graph from items in catalog order.
    ///
    /// When ids collide the first item keeps the id and later ones are skipped.
    pub fn from_items(items: &[CatalogItem]) -> Self {
        let mut graph = Self::default();
        for item in items {
            if graph.index.contains_key(&item.id) {
                log::warn!("Duplicate tour node id '{}', keeping the first", item.id);
                continue;
            }
            if !item.is_panoramic {
                log::warn!("Tour node '{}' is not panoramic", item.id);
            }
            graph.index.insert(item.id.clone(), graph.nodes.len());
            graph.nodes.push(item.clone());
        }
        graph
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&CatalogItem> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in catalog order.
    pub fn nodes(&self) -> impl Iterator<Item = &CatalogItem> {
        self.nodes.iter()
    }

    /// Entry node chosen by the default-node rule.
    pub fn default_node(&self) -> Option<&CatalogItem> {
        default_node(&self.nodes)
    }

    /// Distinct existing nodes reachable in one click from `id`, in hotspot order.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        let mut seen = BTreeSet::new();
        node.hotspots
            .iter()
            .filter_map(|h| h.navigation_target())
            .filter(|target| self.contains(target))
            .filter(|target| seen.insert(*target))
            .collect()
    }

    /// All nodes reachable from `start`, including `start` itself.
    pub fn reachable_from(&self, start: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        if !self.contains(start) {
            return visited;
        }

        let mut queue = VecDeque::from([start]);
        visited.insert(start.to_string());
        while let Some(id) = queue.pop_front() {
            for next in self.neighbors(id) {
                if visited.insert(next.to_string()) {
                    queue.push_back(next);
                }
            }
        }
        visited
    }

    /// Nodes that can never be visited when entering at the default node.
    pub fn unreachable_from_default(&self) -> Vec<&str> {
        let Some(entry) = self.default_node() else {
            return Vec::new();
        };
        let reachable = self.reachable_from(&entry.id);
        self.nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| !reachable.contains(*id))
            .collect()
    }

    /// Hotspot targets that do not name a node.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.hotspots
                    .iter()
                    .filter_map(|h| h.navigation_target())
                    .filter(move |target| !self.contains(target))
                    .map(move |target| DanglingReference {
                        from: node.id.clone(),
                        target: target.to_string(),
                    })
            })
            .collect()
    }

    /// Whether any sequence of clicks can return to a node already visited.
    pub fn has_cycle(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];

        // Iterative DFS; the stack holds (node index, next neighbor position)
        for root in 0..self.nodes.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            let mut stack = vec![(root, 0usize)];
            marks[root] = Mark::InProgress;

            while let Some((current, position)) = stack.pop() {
                let neighbors = self.neighbors(&self.nodes[current].id);
                if let Some(next_id) = neighbors.get(position) {
                    stack.push((current, position + 1));
                    let next = self.index[*next_id];
                    match marks[next] {
                        Mark::InProgress => return true,
                        Mark::Unvisited => {
                            marks[next] = Mark::InProgress;
                            stack.push((next, 0));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[current] = Mark::Done;
                }
            }
        }
        false
    }

    /// Log graph problems that do not stop the tour from working.
    pub fn log_diagnostics(&self) {
        for dangling in self.dangling_references() {
            log::warn!(
                "Hotspot on '{}' targets unknown node '{}'",
                dangling.from,
                dangling.target
            );
        }
        let unreachable = self.unreachable_from_default();
        if !unreachable.is_empty() {
            log::debug!("Tour nodes unreachable from entry: {:?}", unreachable);
        }
    }
}
