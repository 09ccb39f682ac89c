//! # (m,k)-Observer Evaluator
//!
//! A node `v` is an *(m,k)-observer* when at least `k` of its direct
//! predecessors are pairwise *independent at m*: with `v` removed from the
//! graph, neither member of a pair reaches the other in fewer than `m` hops.
//!
//! The search walks predecessor pairs once. Every independent pair is a
//! 2-clique; two recorded cliques of equal size `n` that share `n - 1`
//! members are merged into an `n + 1` clique when the two members they do
//! not share are themselves a known independent pair. The first clique to
//! reach size `k` ends the search.
//!
//! ```text
//!   pair (a,b) independent
//!        │
//!        ├─ k <= 2 ───────────────────────────────► observer
//!        │
//!        └─ record {a,b}; for A ∋ a, B ∋ b, |A| = |B|, |A ∪ B| = |A| + 1:
//!               A \ B, B \ A independent? ── no ──► skip
//!                        │ yes
//!               |A ∪ B| >= k ? ── yes ─────────────► observer
//!                        │ no
//!               record A ∪ B for each member
//! ```
//!
//! Every k-clique is complete once its last pair has been enumerated, and
//! by then its two (k-1)-sub-cliques missing one endpoint each of that pair
//! are already recorded, so pair order never changes the answer.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::cache::PathCache;
use crate::model::*;
use crate::view::GraphView;
use crate::{Error, Result};

/// A set of mutually independent predecessors, kept sorted.
pub type Clique = SmallVec<[NodeId; 8]>;

// ============================================================================
// Observer
// ============================================================================

/// Evaluates the (m,k)-observer predicate against one graph and cache.
pub struct Observer<'a, G: ?Sized> {
    graph: &'a G,
    cache: &'a PathCache,
}

impl<'a, G: GraphView + ?Sized> Observer<'a, G> {
    pub fn new(graph: &'a G, cache: &'a PathCache) -> Self {
        Self { graph, cache }
    }

    /// Whether `v` is an (m,k)-observer.
    pub fn is_observer(&self, v: NodeId, m: usize, k: usize) -> Result<bool> {
        Ok(self.witness(v, m, k)?.is_some())
    }

    /// The first set of predecessors proving `v` is an (m,k)-observer.
    ///
    /// For `k <= 2` this is the first independent pair; a lone predecessor
    /// witnesses the (1,1) case on its own.
    pub fn witness(&self, v: NodeId, m: usize, k: usize) -> Result<Option<Clique>> {
        if m < 1 || k < 1 {
            return Err(Error::InvalidParameter(format!(
                "observer parameters must be at least 1, got m={m} k={k}"
            )));
        }

        let sources = self.graph.predecessors(v)?;
        if sources.len() < k {
            trace!(%v, m, k, sources = sources.len(), "too few predecessors");
            return Ok(None);
        }
        if sources.len() == 1 && m == 1 && k == 1 {
            return Ok(Some(Clique::from_slice(&sources)));
        }

        let mut search = CliqueSearch::new(k);
        for (a, b) in source_pairs(&sources) {
            if !self.independent(v, a, b, m)? {
                continue;
            }
            if k <= 2 {
                debug!(%v, m, k, %a, %b, "observer via independent pair");
                return Ok(Some(sorted([a, b])));
            }
            if let Some(clique) = search.add_pair(a, b) {
                debug!(%v, m, k, clique = ?clique, "observer via clique");
                return Ok(Some(clique));
            }
        }

        trace!(%v, m, k, cliques = search.len(), "no qualifying clique");
        Ok(None)
    }

    /// Neither `a` nor `b` reaches the other in under `m` hops once `v` is gone.
    fn independent(&self, v: NodeId, a: NodeId, b: NodeId, m: usize) -> Result<bool> {
        let ab = self.cache.conditional_path_length(self.graph, v, a, b)?;
        let ba = self.cache.conditional_path_length(self.graph, v, b, a)?;
        Ok(ab.at_least(m) && ba.at_least(m))
    }
}

/// Every unordered pair once: `(s[i], s[j])` for `j < i`, `i` ascending.
///
/// Each new predecessor is paired with all earlier ones before the next is
/// touched, so cliques among early predecessors close as soon as possible.
pub fn source_pairs(sources: &[NodeId]) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
    (1..sources.len()).flat_map(move |i| (0..i).map(move |j| (sources[i], sources[j])))
}

fn sorted<const N: usize>(nodes: [NodeId; N]) -> Clique {
    let mut clique = Clique::from_slice(&nodes);
    clique.sort_unstable();
    clique
}

// ============================================================================
// Clique candidates (ephemeral, one per evaluation)
// ============================================================================

/// Cliques found so far during one evaluation, indexed by member.
struct CliqueSearch {
    k: usize,
    cliques: Vec<Clique>,
    /// clique → its slot in `cliques`
    seen: HashMap<Clique, usize>,
    /// member → slots of every clique containing it, in discovery order
    by_node: HashMap<NodeId, Vec<usize>>,
    /// normalized (min, max) independent pairs
    independent: HashSet<(NodeId, NodeId)>,
}

impl CliqueSearch {
    fn new(k: usize) -> Self {
        Self {
            k,
            cliques: Vec::new(),
            seen: HashMap::new(),
            by_node: HashMap::new(),
            independent: HashSet::new(),
        }
    }

    fn len(&self) -> usize {
        self.cliques.len()
    }

    /// Register the independent pair `{a, b}` and grow cliques through it.
    ///
    /// Returns the first clique of size `k`, if one closes.
    fn add_pair(&mut self, a: NodeId, b: NodeId) -> Option<Clique> {
        self.independent.insert(pair_key(a, b));
        let pair_slot = self.record(sorted([a, b]));

        // Unions found in this round seed later pairs, not this one.
        let with_a = self.by_node.get(&a).cloned().unwrap_or_default();
        let with_b = self.by_node.get(&b).cloned().unwrap_or_default();

        for &sa in &with_a {
            for &sb in &with_b {
                if sa == pair_slot || sb == pair_slot {
                    continue;
                }
                let Some(union) = self.merge(sa, sb) else {
                    continue;
                };
                if union.len() >= self.k {
                    return Some(union);
                }
                trace!(size = union.len(), clique = ?union, "clique grown");
                self.record(union);
            }
        }
        None
    }

    /// Union of two same-size cliques differing by one member each,
    /// provided those two members are independent.
    fn merge(&self, sa: usize, sb: usize) -> Option<Clique> {
        let (left, right) = (&self.cliques[sa], &self.cliques[sb]);
        if left.len() != right.len() {
            return None;
        }

        let only_left: SmallVec<[NodeId; 2]> =
            left.iter().copied().filter(|n| !right.contains(n)).take(2).collect();
        let only_right: SmallVec<[NodeId; 2]> =
            right.iter().copied().filter(|n| !left.contains(n)).take(2).collect();
        if only_left.len() != 1 || only_right.len() != 1 {
            return None;
        }
        if !self.independent.contains(&pair_key(only_left[0], only_right[0])) {
            return None;
        }

        let mut union = left.clone();
        union.push(only_right[0]);
        union.sort_unstable();
        Some(union)
    }

    /// Store a clique under each member. Returns its slot; a clique that was
    /// already recorded keeps its original slot.
    fn record(&mut self, clique: Clique) -> usize {
        if let Some(&slot) = self.seen.get(&clique) {
            return slot;
        }
        let slot = self.cliques.len();
        for &node in &clique {
            self.by_node.entry(node).or_default().push(slot);
        }
        self.seen.insert(clique.clone(), slot);
        self.cliques.push(clique);
        slot
    }
}

fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::MemoryGraph;
    use pretty_assertions::assert_eq;

    fn ids(raw: &[u64]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn test_source_pairs_order() {
        let s = ids(&[1, 2, 3]);
        let pairs: Vec<_> = source_pairs(&s).collect();
        assert_eq!(
            pairs,
            vec![
                (NodeId(2), NodeId(1)),
                (NodeId(3), NodeId(1)),
                (NodeId(3), NodeId(2)),
            ]
        );
    }

    #[test]
    fn test_source_pairs_small() {
        assert_eq!(source_pairs(&[]).count(), 0);
        assert_eq!(source_pairs(&ids(&[1])).count(), 0);
        assert_eq!(source_pairs(&ids(&[1, 2, 3, 4, 5])).count(), 10);
    }

    #[test]
    fn test_search_grows_triangle() {
        let mut search = CliqueSearch::new(3);
        assert!(search.add_pair(NodeId(2), NodeId(1)).is_none());
        assert!(search.add_pair(NodeId(3), NodeId(1)).is_none());
        let clique = search.add_pair(NodeId(3), NodeId(2)).unwrap();
        assert_eq!(clique.as_slice(), ids(&[1, 2, 3]).as_slice());
    }

    #[test]
    fn test_search_needs_every_edge() {
        // path 1-2-3 (no 1-3 edge) is not a triangle
        let mut search = CliqueSearch::new(3);
        assert!(search.add_pair(NodeId(2), NodeId(1)).is_none());
        assert!(search.add_pair(NodeId(3), NodeId(2)).is_none());
        assert_eq!(search.len(), 2);
    }

    #[test]
    fn test_search_grows_four_clique() {
        let s = ids(&[1, 2, 3, 4]);
        let mut search = CliqueSearch::new(4);
        let mut found = None;
        for (a, b) in source_pairs(&s) {
            if let Some(c) = search.add_pair(a, b) {
                found = Some(c);
                break;
            }
        }
        assert_eq!(found.unwrap().as_slice(), s.as_slice());
    }

    #[test]
    fn test_search_rejects_unverified_union() {
        // Triangles {1,2,3} and {1,2,4} share two members but 3-4 was never
        // found independent, so {1,2,3,4} must not be formed.
        let mut search = CliqueSearch::new(4);
        for (a, b) in [(2, 1), (3, 1), (3, 2), (4, 1), (4, 2)] {
            assert!(search.add_pair(NodeId(a), NodeId(b)).is_none());
        }
        assert!(search.seen.keys().all(|c| c.len() <= 3));
    }

    #[test]
    fn test_star_is_observer() {
        let g = MemoryGraph::from_edges([(1, 9), (2, 9), (3, 9)]).unwrap();
        let cache = PathCache::new();
        let obs = Observer::new(&g, &cache);

        assert!(obs.is_observer(NodeId(9), 1, 2).unwrap());
        assert!(obs.is_observer(NodeId(9), 5, 3).unwrap());
        assert!(!obs.is_observer(NodeId(9), 1, 4).unwrap());
    }

    #[test]
    fn test_witness_for_pair_is_sorted() {
        let g = MemoryGraph::from_edges([(5, 9), (2, 9)]).unwrap();
        let cache = PathCache::new();
        let obs = Observer::new(&g, &cache);

        let w = obs.witness(NodeId(9), 1, 2).unwrap().unwrap();
        assert_eq!(w.as_slice(), &[NodeId(2), NodeId(5)]);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let g = MemoryGraph::from_edges([(1, 9)]).unwrap();
        let cache = PathCache::new();
        let obs = Observer::new(&g, &cache);

        assert!(matches!(obs.is_observer(NodeId(9), 0, 2), Err(Error::InvalidParameter(_))));
        assert!(matches!(obs.is_observer(NodeId(9), 1, 0), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_unknown_node_errors() {
        let g = MemoryGraph::from_edges([(1, 9)]).unwrap();
        let cache = PathCache::new();
        let obs = Observer::new(&g, &cache);
        assert!(matches!(obs.is_observer(NodeId(7), 1, 1), Err(Error::NodeNotFound(_))));
    }
}
