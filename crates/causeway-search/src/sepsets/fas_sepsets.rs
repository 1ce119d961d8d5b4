use causeway_core::graph::{Graph, NodeId};
use causeway_core::sepset_map::SepsetMap;
use causeway_core::traits::SepsetProducer;

/// Separating sets exactly as adjacency search recorded them.
#[derive(Debug, Clone, Copy)]
pub struct FasSepsets<'a> {
    map: &'a SepsetMap,
}

impl<'a> FasSepsets<'a> {
    pub fn new(map: &'a SepsetMap) -> Self {
        Self { map }
    }
}

impl SepsetProducer for FasSepsets<'_> {
    fn name(&self) -> &'static str {
        "fas"
    }

    /// `None` for pairs that are still adjacent, even if a stale entry exists.
    fn sepset(&self, graph: &Graph, x: NodeId, y: NodeId) -> Option<Vec<NodeId>> {
        if graph.is_adjacent(x, y) {
            return None;
        }
        self.map.sepset(x, y)
    }
}
