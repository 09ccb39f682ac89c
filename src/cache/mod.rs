//! # Path Cache
//!
//! Memoizes shortest paths for one static graph.
//!
//! Two families are kept apart:
//!
//! | Family | Key | Computed on |
//! |--------|-----|-------------|
//! | unconditional | `(source, target)` | the full graph |
//! | conditional | `hole → (source, target)` | the graph with `hole` removed |
//!
//! Entries are only ever added. A "no path" answer is cached as an empty
//! [`Path`], never as an error. Build a new cache (or call [`PathCache::clear`])
//! if the graph changes.
//!
//! Each map sits behind its own `RwLock` so one cache can be shared across
//! threads. Two threads missing on the same key may both compute the path;
//! the first insert wins and both see the same answer.

use std::sync::atomic::{AtomicU64, Ordering};
use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::*;
use crate::view::GraphView;
use crate::Result;

type PairMap = HashMap<(NodeId, NodeId), Path>;

// ============================================================================
// CacheStats
// ============================================================================

/// Snapshot of cache activity since construction (or the last `clear`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub unconditional_hits: u64,
    pub unconditional_misses: u64,
    pub conditional_hits: u64,
    pub conditional_misses: u64,
    /// Conditional lookups answered by an unconditional path that already
    /// avoids the hole.
    pub shortcut_hits: u64,
    pub unconditional_entries: usize,
    pub conditional_entries: usize,
}

impl CacheStats {
    /// Shortest-path searches actually run against the graph.
    pub fn computations(&self) -> u64 {
        self.unconditional_misses + self.conditional_misses
    }
}

#[derive(Default)]
struct Counters {
    unconditional_hits: AtomicU64,
    unconditional_misses: AtomicU64,
    conditional_hits: AtomicU64,
    conditional_misses: AtomicU64,
    shortcut_hits: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&self) {
        for c in [
            &self.unconditional_hits,
            &self.unconditional_misses,
            &self.conditional_hits,
            &self.conditional_misses,
            &self.shortcut_hits,
        ] {
            c.store(0, Ordering::Relaxed);
        }
    }
}

// ============================================================================
// PathCache
// ============================================================================

/// Lazily filled shortest-path memo for one graph.
#[derive(Default)]
pub struct PathCache {
    unconditional: RwLock<PairMap>,
    /// hole node → paths computed without it
    conditional: RwLock<HashMap<NodeId, PairMap>>,
    counters: Counters,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortest path from `source` to `target` on the full graph.
    ///
    /// Empty when `target` is unreachable.
    pub fn path<G: GraphView + ?Sized>(
        &self,
        graph: &G,
        source: NodeId,
        target: NodeId,
    ) -> Result<Path> {
        if let Some(path) = self.unconditional.read().get(&(source, target)) {
            Counters::bump(&self.counters.unconditional_hits);
            return Ok(path.clone());
        }

        Counters::bump(&self.counters.unconditional_misses);
        let path = graph.shortest_path(source, target)?;
        trace!(%source, %target, length = %path.length(), "unconditional path computed");

        Ok(self
            .unconditional
            .write()
            .entry((source, target))
            .or_insert(path)
            .clone())
    }

    /// Shortest path from `source` to `target` on the graph without `hole`.
    ///
    /// Empty when unreachable, or when `hole` is one of the endpoints.
    pub fn conditional_path<G: GraphView + ?Sized>(
        &self,
        graph: &G,
        hole: NodeId,
        source: NodeId,
        target: NodeId,
    ) -> Result<Path> {
        if hole == source || hole == target {
            return Ok(Path::none());
        }

        // Removing a node never shortens a path, so an unconditional path
        // that already avoids the hole is the conditional answer too. No
        // unconditional path means no conditional path either.
        let direct = self.path(graph, source, target)?;
        if direct.is_empty() || !direct.contains(hole) {
            Counters::bump(&self.counters.shortcut_hits);
            return Ok(direct);
        }

        if let Some(path) = self
            .conditional
            .read()
            .get(&hole)
            .and_then(|paths| paths.get(&(source, target)))
        {
            Counters::bump(&self.counters.conditional_hits);
            return Ok(path.clone());
        }

        Counters::bump(&self.counters.conditional_misses);
        let path = graph.conditional_shortest_path(hole, source, target)?;
        trace!(%hole, %source, %target, length = %path.length(), "conditional path computed");

        Ok(self
            .conditional
            .write()
            .entry(hole)
            .or_default()
            .entry((source, target))
            .or_insert(path)
            .clone())
    }

    /// Edge count of [`conditional_path`](Self::conditional_path), or
    /// [`PathLength::Infinite`] when there is none.
    pub fn conditional_path_length<G: GraphView + ?Sized>(
        &self,
        graph: &G,
        hole: NodeId,
        source: NodeId,
        target: NodeId,
    ) -> Result<PathLength> {
        Ok(self.conditional_path(graph, hole, source, target)?.length())
    }

    pub fn stats(&self) -> CacheStats {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CacheStats {
            unconditional_hits: load(&self.counters.unconditional_hits),
            unconditional_misses: load(&self.counters.unconditional_misses),
            conditional_hits: load(&self.counters.conditional_hits),
            conditional_misses: load(&self.counters.conditional_misses),
            shortcut_hits: load(&self.counters.shortcut_hits),
            unconditional_entries: self.unconditional.read().len(),
            conditional_entries: self.conditional.read().values().map(HashMap::len).sum(),
        }
    }

    /// Drop every cached path and reset the counters.
    pub fn clear(&self) {
        self.unconditional.write().clear();
        self.conditional.write().clear();
        self.counters.reset();
    }
}

// ============================================================================
// Tests
// ============================================================================
