//! Discriminating paths.
//!
//! A discriminating path for `v` is `x, ..., w, v, y` of at least four
//! nodes where `x` is not adjacent to `y` and every node between `x` and `v`
//! is a collider on the path and a parent of `y`. It is searched backwards
//! from `w` breadth first over an arena of path steps, so the shortest
//! origin is found first and the visited set is a plain vector.

use causeway_core::cancel::CancellationToken;
use causeway_core::constants::{stages, MIN_DISCRIMINATING_PATH_LENGTH};
use causeway_core::errors::SearchError;
use causeway_core::graph::{Endpoint, Graph, NodeId};

struct Step {
    node: NodeId,
    /// Nodes from this one to `y`, inclusive.
    len: usize,
}

/// Origin `x` of the shortest discriminating path `x, ..., w, v, y`, if any.
///
/// Expects `w --> y` and an arrowhead at `w` on `v *-> w`. `max_len` caps
/// the path length in nodes.
pub(crate) fn find_origin(
    graph: &Graph,
    w: NodeId,
    v: NodeId,
    y: NodeId,
    max_len: Option<usize>,
    cancel: &CancellationToken,
) -> Result<Option<NodeId>, SearchError> {
    let min_len = MIN_DISCRIMINATING_PATH_LENGTH as usize;
    let mut visited = vec![false; graph.node_count()];
    for node in [w, v, y] {
        visited[node] = true;
    }
    let mut arena = vec![Step { node: w, len: min_len - 1 }];
    let mut head = 0;

    while let Some(&Step { node: t, len }) = arena.get(head) {
        head += 1;
        cancel.check(stages::FCI, len)?;
        let next_len = len + 1;
        if max_len.is_some_and(|max| next_len > max) {
            continue;
        }
        for d in graph.adjacent_nodes(t) {
            if visited[d] || graph.endpoint(d, t) != Some(Endpoint::Arrow) {
                continue;
            }
            if !graph.is_adjacent(d, y) {
                return Ok(Some(d));
            }
            if graph.is_parent_of(d, y) && graph.endpoint(t, d) == Some(Endpoint::Arrow) {
                visited[d] = true;
                arena.push(Step { node: d, len: next_len });
            }
        }
    }
    Ok(None)
}
