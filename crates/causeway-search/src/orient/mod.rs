//! Orientation: knowledge passes, collider orientation, and the Meek and FCI
//! rule engines.

pub mod colliders;
pub mod cycles;
pub mod fci;
pub mod knowledge;
pub mod meek;

pub use colliders::{ArrowheadPolicy, ColliderOrienter, ColliderReport};
pub use cycles::{find_directed_cycles, would_create_cycle};
pub use fci::{FciOrient, FciReport};
pub use knowledge::{fci_orient_knowledge, orient_required, KnowledgeReport};
pub use meek::{MeekReport, MeekRule, MeekRules};

use causeway_core::errors::{GraphError, SearchError};
use causeway_core::graph::{Endpoint, Graph, NodeId};
use causeway_core::knowledge::Knowledge;

/// May `from *-* to` get an arrowhead at `to` in a CPDAG?
///
/// An existing arrowhead is always fine. Otherwise knowledge must neither
/// require `to --> from` nor forbid `from --> to`.
pub fn arrowpoint_allowed(graph: &Graph, knowledge: &Knowledge, from: NodeId, to: NodeId) -> bool {
    if graph.endpoint(from, to) == Some(Endpoint::Arrow) {
        return true;
    }
    let (f, t) = (graph.name(from), graph.name(to));
    !knowledge.is_required(t, f) && !knowledge.is_forbidden(f, t)
}

/// May `x *-o y` get an arrowhead at `y` in a PAG?
///
/// Only a circle can become an arrowhead. Knowledge requiring `y --> x`
/// blocks it, and knowledge forbidding `x --> y` blocks it unless `x`
/// already carries an arrowhead.
pub fn arrowhead_allowed(graph: &Graph, knowledge: &Knowledge, x: NodeId, y: NodeId) -> bool {
    match graph.endpoint(x, y) {
        Some(Endpoint::Arrow) => return true,
        Some(Endpoint::Tail) | None => return false,
        Some(Endpoint::Circle) => {}
    }
    let (nx, ny) = (graph.name(x), graph.name(y));
    if knowledge.is_required(ny, nx) {
        return false;
    }
    if knowledge.is_forbidden(nx, ny) && graph.endpoint(y, x) != Some(Endpoint::Arrow) {
        return false;
    }
    true
}

/// Whether `graph.set_endpoint(a, b, mark)` would succeed.
pub(crate) fn can_set(graph: &Graph, a: NodeId, b: NodeId, mark: Endpoint) -> bool {
    match (graph.endpoint(a, b), graph.endpoint(b, a)) {
        (Some(current), Some(opposite)) => current.can_escalate_to(mark, opposite),
        _ => false,
    }
}

/// Endpoint writes on edges the caller just checked cannot fail; if one
/// does, the graph no longer matches the pass that was running.
pub(crate) fn graph_error(e: GraphError) -> SearchError {
    SearchError::invalid(format!("graph changed during orientation: {e}"))
}
