use std::ops::ControlFlow;
use std::sync::Arc;

use causeway_core::constants::resolve_depth;
use causeway_core::graph::{Graph, NodeId};
use causeway_core::observe::{NoopObserver, SearchObserver};
use causeway_core::traits::{IndependenceTest, SepsetDecision, SepsetProducer};

use super::for_each_separating_set;

/// Collects every separating set from both sides and only decides when they
/// agree on the middle node.
pub struct ConservativeSepsets {
    test: Arc<dyn IndependenceTest>,
    observer: Arc<dyn SearchObserver>,
    depth: usize,
}

impl ConservativeSepsets {
    pub fn new(test: Arc<dyn IndependenceTest>, depth: i64) -> Self {
        Self {
            test,
            observer: Arc::new(NoopObserver),
            depth: resolve_depth(depth),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn all_sets(&self, graph: &Graph, x: NodeId, y: NodeId) -> Vec<Vec<NodeId>> {
        let mut out = Vec::new();
        let observer = self.observer.as_ref();
        for_each_separating_set(self.test.as_ref(), observer, graph, x, y, self.depth, |set, _| {
            out.push(set.to_vec());
            ControlFlow::Continue(())
        });
        out
    }
}

impl SepsetProducer for ConservativeSepsets {
    fn name(&self) -> &'static str {
        "conservative"
    }

    /// First separating set found.
    fn sepset(&self, graph: &Graph, x: NodeId, y: NodeId) -> Option<Vec<NodeId>> {
        let mut first = None;
        let observer = self.observer.as_ref();
        for_each_separating_set(self.test.as_ref(), observer, graph, x, y, self.depth, |set, _| {
            first = Some(set.to_vec());
            ControlFlow::Break(())
        });
        first
    }

    fn decide(&self, graph: &Graph, x: NodeId, middle: NodeId, y: NodeId) -> SepsetDecision {
        let sets = self.all_sets(graph, x, y);
        let Some(first) = sets.first() else {
            return SepsetDecision::NoDecision;
        };
        let containing = sets.iter().filter(|s| s.contains(&middle)).count();
        if containing == sets.len() {
            SepsetDecision::Dependent(first.clone())
        } else if containing == 0 {
            SepsetDecision::Independent(first.clone())
        } else {
            SepsetDecision::NoDecision
        }
    }
}
