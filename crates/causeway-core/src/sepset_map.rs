//! Concurrent map from unordered node pairs to the set that separated them.
//!
//! Written by FAS workers, read-only afterwards. A missing entry means no
//! separating set was found within the depth bound, which is not the same as
//! a known dependence.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::graph::{Graph, NodeId};

/// Unordered pair, stored low id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePair(NodeId, NodeId);

impl NodePair {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn first(&self) -> NodeId {
        self.0
    }

    pub fn second(&self) -> NodeId {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sepset {
    /// Conditioning nodes, ascending.
    pub nodes: Vec<NodeId>,
    /// p-value of the test that found the independence, when known.
    pub p_value: Option<f64>,
}

impl Sepset {
    pub fn new(mut nodes: Vec<NodeId>, p_value: Option<f64>) -> Self {
        nodes.sort_unstable();
        nodes.dedup();
        Self { nodes, p_value }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.binary_search(&node).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct SepsetMap {
    inner: DashMap<NodePair, Sepset>,
}

impl SepsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the separating set for `{a, b}`. A second write for the same
    /// pair replaces the first.
    pub fn set(&self, a: NodeId, b: NodeId, nodes: Vec<NodeId>, p_value: Option<f64>) {
        self.inner.insert(NodePair::new(a, b), Sepset::new(nodes, p_value));
    }

    pub fn get(&self, a: NodeId, b: NodeId) -> Option<Sepset> {
        self.inner.get(&NodePair::new(a, b)).map(|s| s.value().clone())
    }

    /// Conditioning nodes only.
    pub fn sepset(&self, a: NodeId, b: NodeId) -> Option<Vec<NodeId>> {
        self.inner.get(&NodePair::new(a, b)).map(|s| s.nodes.clone())
    }

    pub fn contains(&self, a: NodeId, b: NodeId) -> bool {
        self.inner.contains_key(&NodePair::new(a, b))
    }

    /// Whether `z` is in the recorded sepset of `{a, b}`. `None` without a sepset.
    pub fn is_in_sepset(&self, a: NodeId, b: NodeId, z: NodeId) -> Option<bool> {
        self.inner.get(&NodePair::new(a, b)).map(|s| s.contains(z))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Snapshot sorted by pair.
    pub fn entries(&self) -> Vec<(NodePair, Sepset)> {
        let mut out: Vec<_> = self
            .inner
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        out.sort_by_key(|(pair, _)| *pair);
        out
    }

    /// Snapshot with node names, for reports and fixtures.
    pub fn named_entries(&self, graph: &Graph) -> Vec<(String, String, Vec<String>)> {
        self.entries()
            .into_iter()
            .map(|(pair, sepset)| {
                (
                    graph.name(pair.first()).to_string(),
                    graph.name(pair.second()).to_string(),
                    sepset
                        .nodes
                        .iter()
                        .map(|&n| graph.name(n).to_string())
                        .collect(),
                )
            })
            .collect()
    }
}

impl Clone for SepsetMap {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl PartialEq for SepsetMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries() == other.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_keys() {
        let map = SepsetMap::new();
        map.set(3, 1, vec![2, 0], Some(0.4));
        assert!(map.contains(1, 3));
        assert_eq!(map.sepset(1, 3), Some(vec![0, 2]));
        assert_eq!(map.is_in_sepset(3, 1, 2), Some(true));
        assert_eq!(map.is_in_sepset(3, 1, 4), Some(false));
        assert_eq!(map.is_in_sepset(0, 1, 2), None);
    }

    #[test]
    fn concurrent_writes_are_idempotent() {
        let map = SepsetMap::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for i in 0..50 {
                        map.set(i, i + 1, vec![], None);
                    }
                });
            }
        });
        assert_eq!(map.len(), 50);
        let entries = map.entries();
        assert_eq!(entries[0].0, NodePair::new(0, 1));
        assert_eq!(entries[49].0, NodePair::new(49, 50));
    }
}
