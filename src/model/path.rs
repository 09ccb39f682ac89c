//! Path — an ordered node sequence, plus the edge-count length derived from it.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// A shortest path: source first, target last, endpoints inclusive.
///
/// An empty path means "no path exists". A single-node path is the
/// trivial path from a node to itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    nodes: Vec<NodeId>,
}

impl Path {
    /// The "no path" marker.
    pub fn none() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn single(node: NodeId) -> Self {
        Self { nodes: vec![node] }
    }

    pub fn from_nodes(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// True when this is the "no path" marker.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn start(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn end(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Edge count, or [`PathLength::Infinite`] for the "no path" marker.
    pub fn length(&self) -> PathLength {
        match self.nodes.len() {
            0 => PathLength::Infinite,
            n => PathLength::Finite(n - 1),
        }
    }
}

impl From<Vec<NodeId>> for Path {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }
}

/// Shortest-path distance in edges. Unreachable targets are infinitely far.
///
/// `Finite` sorts before `Infinite`, so `PathLength::Infinite >= anything`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PathLength {
    Finite(usize),
    Infinite,
}

impl PathLength {
    /// True when this distance is at least `m` hops.
    pub fn at_least(self, m: usize) -> bool {
        match self {
            PathLength::Finite(len) => len >= m,
            PathLength::Infinite => true,
        }
    }
}

impl std::fmt::Display for PathLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathLength::Finite(len) => write!(f, "{len}"),
            PathLength::Infinite => write!(f, "inf"),
        }
    }
}
