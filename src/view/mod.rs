//! # Graph View Trait
//!
//! The contract between the metric engine and whatever owns the graph.
//! The engine only reads through this trait; it never mutates the graph.
//!
//! ## Implementations
//!
//! | View | Module | Description |
//! |------|--------|-------------|
//! | `MemoryGraph` | `memory` | In-memory adjacency lists for testing/embedding |
//! | `Excluding` | here | Any view with one node (and its edges) removed |
//! | `DiGraph<Topic, E>` | `petgraph` | `petgraph` directed graphs (feature `petgraph`) |

pub mod memory;
#[cfg(feature = "petgraph")]
pub mod petgraph;

use std::collections::VecDeque;
use hashbrown::HashMap;

use crate::model::*;
use crate::{Error, Result};

pub use memory::MemoryGraph;

// ============================================================================
// GraphView Trait
// ============================================================================

/// Read-only access to a static directed graph.
///
/// Edge `(a, b)` means "a feeds information to b". Views must report
/// unknown nodes as [`Error::NodeNotFound`] rather than answering with an
/// empty default, since an empty answer silently skews every metric.
pub trait GraphView {
    /// Whether `node` is part of this view.
    fn contains(&self, node: NodeId) -> bool;

    /// All nodes, in a stable order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Direct out-neighbours of `node`.
    fn successors(&self, node: NodeId) -> Result<Vec<NodeId>>;

    /// Direct in-neighbours of `node`, in a stable order.
    fn predecessors(&self, node: NodeId) -> Result<Vec<NodeId>>;

    /// The topic stored on `node` under attribute `key`.
    fn topic(&self, node: NodeId, key: &str) -> Result<&Topic>;

    /// Shortest path by edge count. Returns [`Path::none`] when `target`
    /// is unreachable; errors only for unknown endpoints.
    fn shortest_path(&self, source: NodeId, target: NodeId) -> Result<Path> {
        bfs_shortest_path(self, source, target)
    }

    /// This view with `hole` and all its incident edges removed.
    fn subgraph_excluding(&self, hole: NodeId) -> Excluding<'_, Self> {
        Excluding { inner: self, hole }
    }

    /// Shortest path on the view with `hole` removed.
    fn conditional_shortest_path(
        &self,
        hole: NodeId,
        source: NodeId,
        target: NodeId,
    ) -> Result<Path> {
        self.subgraph_excluding(hole).shortest_path(source, target)
    }
}

// ============================================================================
// Excluding view
// ============================================================================

/// A view over `inner` with a single node removed.
///
/// Asking the view about the removed node is an error, exactly as for any
/// other node the view does not contain.
pub struct Excluding<'g, G: ?Sized> {
    inner: &'g G,
    hole: NodeId,
}

impl<'g, G: GraphView + ?Sized> Excluding<'g, G> {
    pub fn hole(&self) -> NodeId {
        self.hole
    }

    fn check(&self, node: NodeId) -> Result<()> {
        if node == self.hole {
            return Err(Error::NodeNotFound(node));
        }
        Ok(())
    }
}

impl<'g, G: GraphView + ?Sized> GraphView for Excluding<'g, G> {
    fn contains(&self, node: NodeId) -> bool {
        node != self.hole && self.inner.contains(node)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        let mut ids = self.inner.node_ids();
        ids.retain(|id| *id != self.hole);
        ids
    }

    fn successors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.check(node)?;
        let mut out = self.inner.successors(node)?;
        out.retain(|id| *id != self.hole);
        Ok(out)
    }

    fn predecessors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.check(node)?;
        let mut out = self.inner.predecessors(node)?;
        out.retain(|id| *id != self.hole);
        Ok(out)
    }

    fn topic(&self, node: NodeId, key: &str) -> Result<&Topic> {
        self.check(node)?;
        self.inner.topic(node, key)
    }
}

// ============================================================================
// Breadth-first shortest path
// ============================================================================

/// Unweighted shortest path from `source` to `target` over `successors`.
///
/// Ties between equal-length paths go to the path discovered first, which
/// follows each view's successor order.
pub fn bfs_shortest_path<G: GraphView + ?Sized>(
    graph: &G,
    source: NodeId,
    target: NodeId,
) -> Result<Path> {
    if !graph.contains(source) {
        return Err(Error::NodeNotFound(source));
    }
    if !graph.contains(target) {
        return Err(Error::NodeNotFound(target));
    }
    if source == target {
        return Ok(Path::single(source));
    }

    // node -> node it was reached from
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
    came_from.insert(source, source);
    let mut queue = VecDeque::from([source]);

    while let Some(current) = queue.pop_front() {
        for next in graph.successors(current)? {
            if came_from.contains_key(&next) {
                continue;
            }
            came_from.insert(next, current);

            if next == target {
                let mut nodes = vec![target];
                let mut cursor = target;
                while cursor != source {
                    cursor = *came_from.get(&cursor).ok_or_else(|| {
                        Error::PathError(format!("broken back-pointer at node {cursor}"))
                    })?;
                    nodes.push(cursor);
                }
                nodes.reverse();
                return Ok(Path::from_nodes(nodes));
            }
            queue.push_back(next);
        }
    }

    Ok(Path::none())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> MemoryGraph {
        // 1 -> 2 -> 3 -> 4, plus shortcut 1 -> 3
        MemoryGraph::from_edges([(1, 2), (2, 3), (3, 4), (1, 3)]).unwrap()
    }

    #[test]
    fn test_bfs_prefers_fewest_edges() {
        let g = chain();
        let path = g.shortest_path(NodeId(1), NodeId(4)).unwrap();
        assert_eq!(path.nodes(), &[NodeId(1), NodeId(3), NodeId(4)]);
        assert_eq!(path.length(), PathLength::Finite(2));
    }

    #[test]
    fn test_bfs_respects_direction() {
        let g = chain();
        let path = g.shortest_path(NodeId(4), NodeId(1)).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_bfs_same_endpoint() {
        let g = chain();
        let path = g.shortest_path(NodeId(2), NodeId(2)).unwrap();
        assert_eq!(path.nodes(), &[NodeId(2)]);
    }

    #[test]
    fn test_bfs_unknown_endpoint_errors() {
        let g = chain();
        assert!(matches!(
            g.shortest_path(NodeId(1), NodeId(99)),
            Err(Error::NodeNotFound(NodeId(99)))
        ));
    }

    #[test]
    fn test_excluding_reroutes() {
        let g = chain();
        let path = g.conditional_shortest_path(NodeId(3), NodeId(1), NodeId(4)).unwrap();
        assert!(path.is_empty(), "4 is only reachable through 3");

        let path = g.conditional_shortest_path(NodeId(2), NodeId(1), NodeId(4)).unwrap();
        assert_eq!(path.nodes(), &[NodeId(1), NodeId(3), NodeId(4)]);
    }

    #[test]
    fn test_excluding_hides_hole() {
        let g = chain();
        let sub = g.subgraph_excluding(NodeId(3));
        assert_eq!(sub.hole(), NodeId(3));
        assert!(!sub.contains(NodeId(3)));
        assert!(sub.predecessors(NodeId(3)).is_err());
        assert_eq!(sub.successors(NodeId(2)).unwrap(), Vec::<NodeId>::new());
        assert_eq!(sub.node_ids(), vec![NodeId(1), NodeId(2), NodeId(4)]);
    }
}
