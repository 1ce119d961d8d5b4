use std::ops::ControlFlow;
use std::sync::Arc;

use causeway_core::constants::resolve_depth;
use causeway_core::graph::{Graph, NodeId};
use causeway_core::observe::{NoopObserver, SearchObserver};
use causeway_core::traits::{IndependenceTest, SepsetDecision, SepsetProducer};

use super::for_each_separating_set;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxPMode {
    /// First separating set in enumeration order.
    Greedy,
    /// Separating set with the largest p-value.
    MaxP,
}

/// Re-searches conditioning sets over the adjacencies of the current graph.
pub struct MaxPSepsets {
    test: Arc<dyn IndependenceTest>,
    observer: Arc<dyn SearchObserver>,
    depth: usize,
    mode: MaxPMode,
    margin: f64,
}

impl MaxPSepsets {
    /// `depth` of `-1` searches sets of every size.
    pub fn new(test: Arc<dyn IndependenceTest>, depth: i64, mode: MaxPMode) -> Self {
        Self {
            test,
            observer: Arc::new(NoopObserver),
            depth: resolve_depth(depth),
            mode,
            margin: 0.0,
        }
    }

    /// A positive margin turns near ties with opposite membership of the
    /// middle node into [`SepsetDecision::NoDecision`].
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin.max(0.0);
        self
    }

    /// Failed oracle calls are reported here.
    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Every separating set with its p-value, in enumeration order.
    fn candidates(&self, graph: &Graph, x: NodeId, y: NodeId) -> Vec<(Vec<NodeId>, f64)> {
        let mut out = Vec::new();
        let greedy = self.mode == MaxPMode::Greedy;
        let observer = self.observer.as_ref();
        for_each_separating_set(self.test.as_ref(), observer, graph, x, y, self.depth, |set, p| {
            out.push((set.to_vec(), p));
            if greedy {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        out
    }
}

/// Largest p-value; the earliest candidate wins ties.
fn best(candidates: &[(Vec<NodeId>, f64)]) -> Option<&(Vec<NodeId>, f64)> {
    candidates
        .iter()
        .reduce(|best, c| if c.1 > best.1 { c } else { best })
}

impl SepsetProducer for MaxPSepsets {
    fn name(&self) -> &'static str {
        match self.mode {
            MaxPMode::Greedy => "greedy",
            MaxPMode::MaxP => "max_p",
        }
    }

    fn sepset(&self, graph: &Graph, x: NodeId, y: NodeId) -> Option<Vec<NodeId>> {
        best(&self.candidates(graph, x, y)).map(|(set, _)| set.clone())
    }

    fn decide(&self, graph: &Graph, x: NodeId, middle: NodeId, y: NodeId) -> SepsetDecision {
        let candidates = self.candidates(graph, x, y);
        let Some((set, p)) = best(&candidates) else {
            return SepsetDecision::NoDecision;
        };
        let includes = set.contains(&middle);
        if self.margin > 0.0 {
            let contested = candidates
                .iter()
                .any(|(s, q)| s.contains(&middle) != includes && p - q <= self.margin);
            if contested {
                return SepsetDecision::NoDecision;
            }
        }
        SepsetDecision::from_sepset(Some(set.clone()), middle)
    }
}
