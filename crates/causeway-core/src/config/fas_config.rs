use serde::{Deserialize, Serialize};

use super::defaults;

/// Ordering heuristics for adjacency search. Every mode is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PcHeuristic {
    #[default]
    None,
    /// Variables processed in name order.
    SortVariables,
    /// Deeper levels visit edges by descending depth-0 p-value.
    SortEdgesByPValue,
    /// Conditioning candidates ordered by ascending depth-0 p-value with the tested node.
    SortParentsByPValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FasConfig {
    /// Largest conditioning set size, `-1` for unbounded.
    pub depth: i64,
    /// Snapshot adjacency per depth so results do not depend on order.
    pub stable: bool,
    /// Worker threads, 0 for one per logical CPU.
    pub parallelism: usize,
    pub heuristic: PcHeuristic,
}

impl Default for FasConfig {
    fn default() -> Self {
        Self {
            depth: defaults::DEFAULT_DEPTH,
            stable: defaults::DEFAULT_STABLE,
            parallelism: defaults::DEFAULT_PARALLELISM,
            heuristic: PcHeuristic::default(),
        }
    }
}
