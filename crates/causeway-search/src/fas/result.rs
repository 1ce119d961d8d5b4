use std::time::Duration;

use serde::Serialize;

use causeway_core::graph::Graph;
use causeway_core::sepset_map::SepsetMap;

/// Counters collected during one adjacency search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FasStats {
    /// Last depth that ran to completion.
    pub depth_reached: usize,
    pub tests_run: usize,
    /// Tests that errored and were counted as dependent.
    pub oracle_failures: usize,
    /// Edge count after each completed depth, indexed by depth.
    pub edge_counts: Vec<usize>,
    pub elapsed: Duration,
}

/// Undirected skeleton plus the separating sets that pruned it.
#[derive(Debug, Clone)]
pub struct FasResult {
    pub graph: Graph,
    pub sepsets: SepsetMap,
    pub stats: FasStats,
}
