//! Sepset producers: where collider orientation and discriminating paths get
//! their separating sets.
//!
//! - [`FasSepsets`] replays what adjacency search recorded.
//! - [`MaxPSepsets`] re-searches the current graph, greedy or by largest p-value.
//! - [`ConservativeSepsets`] collects every separating set and demands agreement.
//!
//! The re-searching producers assume graph node ids are the oracle's variable
//! ids, which holds for every graph built by [`crate::fas::Fas`].

mod conservative;
mod fas_sepsets;
mod max_p;

pub use conservative::ConservativeSepsets;
pub use fas_sepsets::FasSepsets;
pub use max_p::{MaxPMode, MaxPSepsets};

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use causeway_core::combinatorics::choose;
use causeway_core::graph::{Graph, NodeId};
use causeway_core::observe::SearchObserver;
use causeway_core::traits::IndependenceTest;

/// Every conditioning set of size `0..=depth` drawn from the neighbours of
/// `x` (minus `y`) and then of `y` (minus `x`), each tested once, smaller
/// sizes first. `visit` sees each set that tests independent with its p-value.
/// Failed tests count as dependent and go to `observer`.
pub(crate) fn for_each_separating_set<F>(
    test: &dyn IndependenceTest,
    observer: &dyn SearchObserver,
    graph: &Graph,
    x: NodeId,
    y: NodeId,
    depth: usize,
    mut visit: F,
) where
    F: FnMut(&[NodeId], f64) -> ControlFlow<()>,
{
    let adj_x: Vec<NodeId> = graph.neighbors(x).filter(|&n| n != y).collect();
    let adj_y: Vec<NodeId> = graph.neighbors(y).filter(|&n| n != x).collect();
    let mut seen: BTreeSet<Vec<NodeId>> = BTreeSet::new();

    for d in 0..=depth.min(adj_x.len().max(adj_y.len())) {
        for side in [&adj_x, &adj_y] {
            for set in choose(side, d) {
                if !seen.insert(set.clone()) {
                    continue;
                }
                let result = match test.check_independence(x, y, &set) {
                    Ok(result) => result,
                    Err(e) => {
                        observer.oracle_failed(graph.name(x), graph.name(y), &e);
                        continue;
                    }
                };
                if result.independent && visit(&set, result.p_value).is_break() {
                    return;
                }
            }
        }
    }
}
