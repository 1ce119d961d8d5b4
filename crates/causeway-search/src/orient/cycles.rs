//! Directed-cycle checks over immutable petgraph snapshots.

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graphmap::DiGraphMap;

use causeway_core::graph::{Graph, NodeId};

/// Directed edges of `graph` as a petgraph map. Every node is present.
pub fn directed_snapshot(graph: &Graph) -> DiGraphMap<NodeId, ()> {
    let mut snapshot = DiGraphMap::with_capacity(graph.node_count(), graph.edge_count());
    for node in graph.node_ids() {
        snapshot.add_node(node);
    }
    for (from, to) in graph.directed_edges() {
        snapshot.add_edge(from, to, ());
    }
    snapshot
}

/// Would orienting `from --> to` close a directed cycle?
pub fn would_create_cycle(graph: &Graph, from: NodeId, to: NodeId) -> bool {
    if from == to {
        return true;
    }
    has_path_connecting(&directed_snapshot(graph), to, from, None)
}

/// Every strongly connected component of the directed part with more than
/// one node, each sorted, in ascending order of first node.
pub fn find_directed_cycles(graph: &Graph) -> Vec<Vec<NodeId>> {
    let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(&directed_snapshot(graph))
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|mut scc| {
            scc.sort_unstable();
            scc
        })
        .collect();
    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_closing_edge() {
        let mut g = Graph::from_names(["A", "B", "C"]).unwrap();
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_undirected_edge(0, 2).unwrap();
        assert!(would_create_cycle(&g, 2, 0));
        assert!(!would_create_cycle(&g, 0, 2));
        assert!(find_directed_cycles(&g).is_empty());
    }

    #[test]
    fn reports_cycle_members() {
        let mut g = Graph::from_names(["A", "B", "C", "D"]).unwrap();
        g.add_directed_edge(0, 1).unwrap();
        g.add_directed_edge(1, 2).unwrap();
        g.add_directed_edge(2, 0).unwrap();
        g.add_directed_edge(2, 3).unwrap();
        assert_eq!(find_directed_cycles(&g), vec![vec![0, 1, 2]]);
    }
}
