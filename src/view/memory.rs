//! In-memory graph view.
//!
//! This is the reference implementation of `GraphView`.
//! It keeps per-node adjacency lists in a HashMap.
//!
//! ## Limitations
//!
//! - **Append-only**: nodes and edges can be added but never removed.
//!   Metric engines assume a static graph, so build the graph fully before
//!   handing it to a `Crowd`.
//! - **Simple graph**: duplicate edges are ignored and self-loops rejected.
//! - **No bulk loading**: construction is one node/edge at a time.
//!
//! Use this view for:
//! - Testing the path cache, observer evaluator and metric engine
//! - Embedding crowd-rs in applications that already hold their graph in memory

use hashbrown::HashMap;

use crate::model::*;
use crate::{Error, Result};
use super::GraphView;

// ============================================================================
// MemoryGraph
// ============================================================================

/// In-memory directed graph with per-node topic attributes.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    nodes: HashMap<NodeId, NodeEntry>,
    /// Insertion order, for stable `node_ids()`.
    order: Vec<NodeId>,
    edge_count: usize,
}

#[derive(Debug, Clone, Default)]
struct NodeEntry {
    /// attribute key → topic
    topics: HashMap<String, Topic>,
    successors: Vec<NodeId>,
    /// in edge insertion order
    predecessors: Vec<NodeId>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(src, dst)` pairs, creating nodes on first sight.
    pub fn from_edges<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut graph = Self::new();
        for (src, dst) in edges {
            let (src, dst) = (NodeId::from(src), NodeId::from(dst));
            graph.add_node(src);
            graph.add_node(dst);
            graph.add_edge(src, dst)?;
        }
        Ok(graph)
    }

    /// Add a node. Returns `false` if it already existed.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, NodeEntry::default());
        self.order.push(id);
        true
    }

    /// Add a node carrying `topic` under attribute `key`.
    pub fn add_node_with_topic(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        topic: impl Into<Topic>,
    ) -> Result<()> {
        self.add_node(id);
        self.set_topic(id, key, topic)
    }

    /// Set (or replace) the topic stored under `key` on an existing node.
    pub fn set_topic(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        topic: impl Into<Topic>,
    ) -> Result<()> {
        let entry = self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))?;
        entry.topics.insert(key.into(), topic.into());
        Ok(())
    }

    /// Add the edge `src -> dst`. Returns `false` if it already existed.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId) -> Result<bool> {
        if src == dst {
            return Err(Error::InvalidEdge(format!("self-loop on node {src}")));
        }
        if !self.nodes.contains_key(&dst) {
            return Err(Error::NodeNotFound(dst));
        }
        let source = self.nodes.get_mut(&src).ok_or(Error::NodeNotFound(src))?;
        if source.successors.contains(&dst) {
            return Ok(false);
        }
        source.successors.push(dst);

        if let Some(target) = self.nodes.get_mut(&dst) {
            target.predecessors.push(src);
        }
        self.edge_count += 1;
        Ok(true)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn entry(&self, id: NodeId) -> Result<&NodeEntry> {
        self.nodes.get(&id).ok_or(Error::NodeNotFound(id))
    }
}

// ============================================================================
// GraphView impl
// ============================================================================

impl GraphView for MemoryGraph {
    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    fn successors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.entry(node)?.successors.clone())
    }

    fn predecessors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.entry(node)?.predecessors.clone())
    }

    fn topic(&self, node: NodeId, key: &str) -> Result<&Topic> {
        self.entry(node)?
            .topics
            .get(key)
            .ok_or_else(|| Error::MissingTopic { node, key: key.to_string() })
    }
}

// ============================================================================
// Tests
// ============================================================================
