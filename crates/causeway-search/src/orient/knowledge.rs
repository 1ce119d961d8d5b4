//! Realizing background knowledge on a graph before rule propagation.

use causeway_core::graph::{Endpoint, Graph};
use causeway_core::knowledge::{Knowledge, KnowledgeEdge};
use causeway_core::observe::SearchObserver;
use serde::Serialize;

use super::{arrowpoint_allowed, can_set};

const RULE: &str = "knowledge";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KnowledgeReport {
    /// Endpoint changes made.
    pub oriented: usize,
    /// Constraints that could not be realized on this graph.
    pub unsatisfied: Vec<KnowledgeEdge>,
}

/// CPDAG pass: a forbidden `a --> b` over an undirected edge becomes
/// `b --> a`; a required `a --> b` becomes `a --> b`.
pub fn orient_required(
    graph: &mut Graph,
    knowledge: &Knowledge,
    observer: &dyn SearchObserver,
) -> KnowledgeReport {
    let mut report = KnowledgeReport::default();

    for edge in knowledge.forbidden_edges() {
        let (Some(from), Some(to)) = (graph.node_id(&edge.from), graph.node_id(&edge.to)) else {
            continue;
        };
        if !graph.is_undirected(from, to) || !arrowpoint_allowed(graph, knowledge, to, from) {
            continue;
        }
        if let Ok(true) = graph.orient(to, from) {
            observer.edge_oriented(RULE, &edge.to, &edge.from, Endpoint::Arrow);
            report.oriented += 1;
        }
    }

    for edge in knowledge.required_edges() {
        let (Some(from), Some(to)) = (graph.node_id(&edge.from), graph.node_id(&edge.to)) else {
            continue;
        };
        if graph.is_directed_from_to(from, to) {
            continue;
        }
        if !graph.is_adjacent(from, to) {
            report.unsatisfied.push(edge.clone());
            continue;
        }
        match graph.orient(from, to) {
            Ok(true) => {
                observer.edge_oriented(RULE, &edge.from, &edge.to, Endpoint::Arrow);
                report.oriented += 1;
            }
            Ok(false) => {}
            Err(e) => {
                observer.orientation_rejected(RULE, &edge.from, &edge.to, &e.to_string());
                report.unsatisfied.push(edge.clone());
            }
        }
    }
    report
}

/// PAG pass: a forbidden `a --> b` puts an arrowhead at `a`; a required
/// `a --> b` puts a tail at `a` and an arrowhead at `b`.
pub fn fci_orient_knowledge(
    graph: &mut Graph,
    knowledge: &Knowledge,
    observer: &dyn SearchObserver,
) -> KnowledgeReport {
    let mut report = KnowledgeReport::default();

    for edge in knowledge.forbidden_edges() {
        let (Some(from), Some(to)) = (graph.node_id(&edge.from), graph.node_id(&edge.to)) else {
            continue;
        };
        if !graph.is_adjacent(from, to) {
            continue;
        }
        match graph.set_endpoint(to, from, Endpoint::Arrow) {
            Ok(true) => {
                observer.edge_oriented(RULE, &edge.to, &edge.from, Endpoint::Arrow);
                report.oriented += 1;
            }
            Ok(false) => {}
            Err(_) => report.unsatisfied.push(edge.clone()),
        }
    }

    for edge in knowledge.required_edges() {
        let (Some(from), Some(to)) = (graph.node_id(&edge.from), graph.node_id(&edge.to)) else {
            continue;
        };
        if !graph.is_adjacent(from, to) {
            report.unsatisfied.push(edge.clone());
            continue;
        }
        if !can_set(graph, to, from, Endpoint::Tail) || !can_set(graph, from, to, Endpoint::Arrow) {
            report.unsatisfied.push(edge.clone());
            continue;
        }
        let tail = graph.set_endpoint(to, from, Endpoint::Tail).unwrap_or(false);
        let arrow = graph.set_endpoint(from, to, Endpoint::Arrow).unwrap_or(false);
        if tail || arrow {
            observer.edge_oriented(RULE, &edge.from, &edge.to, Endpoint::Arrow);
            report.oriented += 1;
        }
    }
    report
}
