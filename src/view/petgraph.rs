//! `GraphView` for `petgraph` directed graphs.
//!
//! The node weight *is* the topic, so the attribute key passed to
//! [`GraphView::topic`] is ignored. `NodeId(i)` maps to `NodeIndex::new(i)`.
//!
//! Only `Graph` (not `StableGraph`) is supported: its indices are dense,
//! which keeps the id mapping a plain cast. Do not remove nodes from the
//! graph while a `Crowd` is looking at it.

use ::petgraph::Direction;
use ::petgraph::graph::{DiGraph, IndexType, NodeIndex};
use hashbrown::HashSet;

use crate::model::*;
use crate::{Error, Result};
use super::GraphView;

fn index<Ix: IndexType>(graph_len: usize, node: NodeId) -> Result<NodeIndex<Ix>> {
    let raw = usize::try_from(node.0).map_err(|_| Error::NodeNotFound(node))?;
    if raw >= graph_len {
        return Err(Error::NodeNotFound(node));
    }
    Ok(NodeIndex::new(raw))
}

fn id<Ix: IndexType>(idx: NodeIndex<Ix>) -> NodeId {
    NodeId(idx.index() as u64)
}

/// Distinct neighbours in edge insertion order (petgraph walks newest-first).
///
/// Self-loops are skipped: a node is never its own source.
fn neighbors<E, Ix: IndexType>(
    graph: &DiGraph<Topic, E, Ix>,
    idx: NodeIndex<Ix>,
    dir: Direction,
) -> Vec<NodeId> {
    let mut seen: HashSet<NodeIndex<Ix>> = HashSet::new();
    let mut out: Vec<NodeId> = graph
        .neighbors_directed(idx, dir)
        .filter(|n| *n != idx && seen.insert(*n))
        .map(id)
        .collect();
    out.reverse();
    out
}

impl<E, Ix: IndexType> GraphView for DiGraph<Topic, E, Ix> {
    fn contains(&self, node: NodeId) -> bool {
        index::<Ix>(self.node_count(), node).is_ok()
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.node_indices().map(id).collect()
    }

    fn successors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let idx = index::<Ix>(self.node_count(), node)?;
        Ok(neighbors(self, idx, Direction::Outgoing))
    }

    fn predecessors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let idx = index::<Ix>(self.node_count(), node)?;
        Ok(neighbors(self, idx, Direction::Incoming))
    }

    fn topic(&self, node: NodeId, _key: &str) -> Result<&Topic> {
        let idx = index::<Ix>(self.node_count(), node)?;
        self.node_weight(idx).ok_or(Error::NodeNotFound(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_petgraph_view() {
        let mut g: DiGraph<Topic, ()> = DiGraph::new();
        let a = g.add_node(Topic::label("x"));
        let b = g.add_node(Topic::label("y"));
        let v = g.add_node(Topic::label("z"));
        g.add_edge(a, v, ());
        g.add_edge(b, v, ());

        assert_eq!(g.predecessors(NodeId(2)).unwrap(), vec![NodeId(0), NodeId(1)]);
        assert_eq!(g.successors(NodeId(0)).unwrap(), vec![NodeId(2)]);
        assert_eq!(g.topic(NodeId(1), "ignored").unwrap(), &Topic::label("y"));
        assert!(g.predecessors(NodeId(3)).is_err());
        assert!(g.shortest_path(NodeId(0), NodeId(1)).unwrap().is_empty());
    }

    #[test]
    fn test_petgraph_parallel_edges_reported_once() {
        let mut g: DiGraph<Topic, ()> = DiGraph::new();
        let a = g.add_node(Topic::label("x"));
        let b = g.add_node(Topic::label("y"));
        let v = g.add_node(Topic::label("z"));
        g.add_edge(a, v, ());
        g.add_edge(b, v, ());
        g.add_edge(a, v, ());

        assert_eq!(g.predecessors(NodeId(2)).unwrap(), vec![NodeId(0), NodeId(1)]);
        assert_eq!(g.successors(NodeId(0)).unwrap(), vec![NodeId(2)]);
    }

    #[test]
    fn test_petgraph_self_loop_is_not_a_source() {
        let mut g: DiGraph<Topic, ()> = DiGraph::new();
        let a = g.add_node(Topic::label("x"));
        let v = g.add_node(Topic::label("z"));
        g.add_edge(a, v, ());
        g.add_edge(v, v, ());

        assert_eq!(g.predecessors(NodeId(1)).unwrap(), vec![NodeId(0)]);
        assert_eq!(g.successors(NodeId(1)).unwrap(), Vec::<NodeId>::new());

        let crowd = crate::Crowd::new(&g);
        let scores = crowd.scores(NodeId(1)).unwrap();
        assert_eq!((scores.s, scores.d, scores.h), (0, 1, 1));
    }
}
