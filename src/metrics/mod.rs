//! Node metrics built on the observer predicate.
//!
//! | Metric | Meaning |
//! |--------|---------|
//! | `S` | largest `m * k` such that the node is an (m,k)-observer |
//! | `D` | distinct topic labels among direct predecessors |
//! | `pi` | `D * S` |
//! | `h` | largest `h` such that the node is an (h,h)-observer |

use std::cmp::Reverse;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CrowdConfig;
use crate::model::NodeId;
use crate::observer::Observer;
use crate::view::GraphView;
use crate::Result;

// ============================================================================
// Scores
// ============================================================================

/// Which score to rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    S,
    D,
    Pi,
    H,
}

/// Every metric for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeScores {
    pub node: NodeId,
    pub s: usize,
    pub d: usize,
    pub pi: usize,
    pub h: usize,
}

impl NodeScores {
    pub fn get(&self, metric: Metric) -> usize {
        match metric {
            Metric::S => self.s,
            Metric::D => self.d,
            Metric::Pi => self.pi,
            Metric::H => self.h,
        }
    }
}

/// Sort by `metric` descending, ties by node id ascending.
pub fn sort_by_metric(scores: &mut [NodeScores], metric: Metric) {
    scores.sort_by_key(|s| (Reverse(s.get(metric)), s.node));
}

// ============================================================================
// S: observer strength
// ============================================================================

/// The strongest `(m, k)` in the configured ranges for which `v` is an
/// (m,k)-observer, trying pairs in descending `(m * k, m, k)` order.
pub fn strongest_pair<G: GraphView + ?Sized>(
    observer: &Observer<'_, G>,
    config: &CrowdConfig,
    v: NodeId,
) -> Result<Option<(usize, usize)>> {
    for (m, k) in config.mk_candidates() {
        if observer.is_observer(v, m, k)? {
            debug!(%v, m, k, s = m * k, "strongest observer level");
            return Ok(Some((m, k)));
        }
    }
    debug!(%v, "not an observer at any configured level");
    Ok(None)
}

/// `S(v)`: the product `m * k` of [`strongest_pair`], or 0.
pub fn strength<G: GraphView + ?Sized>(
    observer: &Observer<'_, G>,
    config: &CrowdConfig,
    v: NodeId,
) -> Result<usize> {
    Ok(strongest_pair(observer, config, v)?.map_or(0, |(m, k)| m * k))
}

// ============================================================================
// D: topic diversity
// ============================================================================

/// `D(v)`: distinct labels across the topics of `v`'s predecessors.
///
/// Every predecessor must carry a topic under `key`; a missing one is an
/// error rather than a silent zero.
pub fn diversity<G: GraphView + ?Sized>(graph: &G, key: &str, v: NodeId) -> Result<usize> {
    let mut labels: HashSet<&str> = HashSet::new();
    for source in graph.predecessors(v)? {
        labels.extend(graph.topic(source, key)?.iter());
    }
    Ok(labels.len())
}

// ============================================================================
// h-measure
// ============================================================================

/// Largest `h` in `[1, max_h]` for which `v` is an (h,h)-observer, or 0.
pub fn h_measure<G: GraphView + ?Sized>(
    observer: &Observer<'_, G>,
    v: NodeId,
    max_h: usize,
) -> Result<usize> {
    for h in (1..=max_h).rev() {
        if observer.is_observer(v, h, h)? {
            debug!(%v, h, "h-measure");
            return Ok(h);
        }
    }
    Ok(0)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PathCache;
    use crate::model::Topic;
    use crate::view::MemoryGraph;
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn topical(edges: &[(u64, u64)], topics: &[(u64, Topic)]) -> MemoryGraph {
        let mut g = MemoryGraph::from_edges(edges.iter().copied()).unwrap();
        for (id, topic) in topics {
            g.set_topic(NodeId(*id), "T", topic.clone()).unwrap();
        }
        g
    }

    #[test]
    fn test_diversity_mixes_labels_and_sets() {
        let g = topical(
            &[(1, 9), (2, 9), (3, 9)],
            &[
                (1, Topic::label("x")),
                (2, Topic::labels(["x", "y"])),
                (3, Topic::labels(["z"])),
            ],
        );
        assert_eq!(diversity(&g, "T", NodeId(9)).unwrap(), 3);
    }

    #[test]
    fn test_diversity_without_predecessors() {
        let g = topical(&[(1, 9)], &[(9, Topic::label("x"))]);
        assert_eq!(diversity(&g, "T", NodeId(1)).unwrap(), 0);
    }

    #[test]
    fn test_diversity_missing_topic_errors() {
        let g = topical(&[(1, 9), (2, 9)], &[(1, Topic::label("x"))]);
        assert!(matches!(
            diversity(&g, "T", NodeId(9)),
            Err(Error::MissingTopic { node: NodeId(2), .. })
        ));
    }

    #[test]
    fn test_strength_of_star() {
        // three mutually unreachable sources: observer at every m, k <= 3
        let g = MemoryGraph::from_edges([(1, 9), (2, 9), (3, 9)]).unwrap();
        let cache = PathCache::new();
        let obs = Observer::new(&g, &cache);
        let config = CrowdConfig::default();

        assert_eq!(strongest_pair(&obs, &config, NodeId(9)).unwrap(), Some((5, 3)));
        assert_eq!(strength(&obs, &config, NodeId(9)).unwrap(), 15);
    }

    #[test]
    fn test_strength_zero_for_single_source() {
        let g = MemoryGraph::from_edges([(1, 9)]).unwrap();
        let cache = PathCache::new();
        let obs = Observer::new(&g, &cache);
        assert_eq!(strength(&obs, &CrowdConfig::default(), NodeId(9)).unwrap(), 0);
    }

    #[test]
    fn test_h_measure_star() {
        let g = MemoryGraph::from_edges([(1, 9), (2, 9), (3, 9)]).unwrap();
        let cache = PathCache::new();
        let obs = Observer::new(&g, &cache);

        assert_eq!(h_measure(&obs, NodeId(9), 6).unwrap(), 3);
        assert_eq!(h_measure(&obs, NodeId(9), 2).unwrap(), 2);
        assert_eq!(h_measure(&obs, NodeId(9), 0).unwrap(), 0);
    }

    #[test]
    fn test_sort_by_metric_ties_by_node() {
        let mut scores = vec![
            NodeScores { node: NodeId(3), s: 2, d: 1, pi: 2, h: 1 },
            NodeScores { node: NodeId(1), s: 2, d: 4, pi: 8, h: 2 },
            NodeScores { node: NodeId(2), s: 6, d: 1, pi: 6, h: 2 },
        ];
        sort_by_metric(&mut scores, Metric::S);
        let order: Vec<_> = scores.iter().map(|s| s.node.0).collect();
        assert_eq!(order, vec![2, 1, 3]);

        sort_by_metric(&mut scores, Metric::Pi);
        let order: Vec<_> = scores.iter().map(|s| s.node.0).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_metric_serde_names() {
        assert_eq!(serde_json::to_string(&Metric::Pi).unwrap(), "\"pi\"");
        let m: Metric = serde_json::from_str("\"h\"").unwrap();
        assert_eq!(m, Metric::H);
    }
}
