//! # crowd-rs — Wisdom-of-Crowds Observability Metrics
//!
//! Scores how trustworthy an aggregator each node of a directed
//! information-flow graph is: how many independent sources corroborate what
//! it hears, and how topically diverse those sources are.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphView` is the contract between the engine and the graph
//! 2. **Read-only graph**: the engine never mutates what it is scoring
//! 3. **Owned caches**: every `Crowd` owns its path cache; nothing is global
//! 4. **Loud failures**: unknown nodes and missing topics are errors, not zeros
//!
//! ## Quick Start
//!
//! ```rust
//! use crowd_rs::{Crowd, MemoryGraph, NodeId, Topic};
//!
//! # fn example() -> crowd_rs::Result<()> {
//! // a, b, c all feed v and cannot reach each other
//! let mut graph = MemoryGraph::from_edges([(1, 9), (2, 9), (3, 9)])?;
//! for id in [1, 2, 3] {
//!     graph.set_topic(NodeId(id), "T", Topic::label("news"))?;
//! }
//!
//! let crowd = Crowd::new(&graph);
//! let v = NodeId(9);
//! assert!(crowd.is_mk_observer(v, 1, 3)?);
//! assert_eq!(crowd.d(v)?, 1);
//! assert_eq!(crowd.s(v)?, 15);
//! assert_eq!(crowd.pi(v)?, 15);
//! assert_eq!(crowd.h_measure(v)?, 3);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Graph Views
//!
//! | View | Feature | Description |
//! |------|---------|-------------|
//! | `MemoryGraph` | (default) | In-memory adjacency lists |
//! | `DiGraph<Topic, E>` | `petgraph` | petgraph directed graphs |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod view;
pub mod cache;
pub mod observer;
pub mod metrics;
pub mod config;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{NodeId, Path, PathLength, Topic};

// ============================================================================
// Re-exports: Graph views
// ============================================================================

pub use view::{GraphView, Excluding, MemoryGraph};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use cache::{PathCache, CacheStats};
pub use observer::{Observer, Clique};
pub use metrics::{Metric, NodeScores};
pub use config::CrowdConfig;

// ============================================================================
// Top-level Crowd handle
// ============================================================================

/// The primary entry point. A `Crowd` borrows a graph view, owns a path
/// cache for it, and computes per-node metrics.
///
/// The cache lives as long as the `Crowd`. The graph must not change in the
/// meantime; build a fresh `Crowd` (or call [`Crowd::clear_cache`]) if it does.
pub struct Crowd<'g, G: ?Sized> {
    graph: &'g G,
    config: CrowdConfig,
    cache: PathCache,
}

impl<'g, G: GraphView + ?Sized> Crowd<'g, G> {
    /// A crowd with the default parameter ranges.
    pub fn new(graph: &'g G) -> Self {
        Self { graph, config: CrowdConfig::default(), cache: PathCache::new() }
    }

    /// A crowd with custom parameter ranges. Invalid ranges are rejected.
    pub fn with_config(graph: &'g G, config: CrowdConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { graph, config, cache: PathCache::new() })
    }

    pub fn config(&self) -> &CrowdConfig {
        &self.config
    }

    /// Access the underlying graph view.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// An observer evaluator sharing this crowd's cache.
    pub fn observer(&self) -> Observer<'_, G> {
        Observer::new(self.graph, &self.cache)
    }

    /// Whether `v` hears from at least `k` predecessors that are pairwise at
    /// least `m` hops apart once `v` itself is removed.
    pub fn is_mk_observer(&self, v: NodeId, m: usize, k: usize) -> Result<bool> {
        self.observer().is_observer(v, m, k)
    }

    /// `S(v)`: largest `m * k` in the configured ranges for which `v` is an
    /// (m,k)-observer, or 0.
    pub fn s(&self, v: NodeId) -> Result<usize> {
        metrics::strength(&self.observer(), &self.config, v)
    }

    /// The `(m, k)` pair behind [`s`](Self::s).
    pub fn strongest_pair(&self, v: NodeId) -> Result<Option<(usize, usize)>> {
        metrics::strongest_pair(&self.observer(), &self.config, v)
    }

    /// `D(v)`: distinct topic labels among `v`'s direct predecessors.
    pub fn d(&self, v: NodeId) -> Result<usize> {
        metrics::diversity(self.graph, &self.config.topic_key, v)
    }

    /// `pi(v) = D(v) * S(v)`.
    pub fn pi(&self, v: NodeId) -> Result<usize> {
        Ok(self.d(v)? * self.s(v)?)
    }

    /// Largest `h <= max_h` (from the config) with `v` an (h,h)-observer, or 0.
    pub fn h_measure(&self, v: NodeId) -> Result<usize> {
        self.h_measure_up_to(v, self.config.max_h)
    }

    /// Largest `h <= max_h` with `v` an (h,h)-observer, or 0.
    pub fn h_measure_up_to(&self, v: NodeId, max_h: usize) -> Result<usize> {
        metrics::h_measure(&self.observer(), v, max_h)
    }

    /// All four metrics for `v`, computing `S` once.
    pub fn scores(&self, v: NodeId) -> Result<NodeScores> {
        let s = self.s(v)?;
        let d = self.d(v)?;
        Ok(NodeScores { node: v, s, d, pi: d * s, h: self.h_measure(v)? })
    }

    /// Score `nodes` and sort them by `metric`, best first.
    pub fn rank<I>(&self, nodes: I, metric: Metric) -> Result<Vec<NodeScores>>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut scores = nodes
            .into_iter()
            .map(|v| self.scores(v))
            .collect::<Result<Vec<_>>>()?;
        metrics::sort_by_metric(&mut scores, metric);
        Ok(scores)
    }

    /// Score and rank every node in the graph.
    pub fn rank_all(&self, metric: Metric) -> Result<Vec<NodeScores>> {
        self.rank(self.graph.node_ids(), metric)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Forget every cached path.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {node} has no topic attribute '{key}'")]
    MissingTopic { node: NodeId, key: String },

    #[error("Invalid edge: {0}")]
    InvalidEdge(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Path error: {0}")]
    PathError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
