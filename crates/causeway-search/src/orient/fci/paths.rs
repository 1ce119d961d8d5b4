//! Uncovered path search for the FCI tail rules.
//!
//! Iterative depth-first search with an explicit frame stack and an
//! index-based on-path set, so long paths cost no call stack and the search
//! can stop on cancellation between expansions.

use causeway_core::cancel::CancellationToken;
use causeway_core::constants::stages;
use causeway_core::errors::SearchError;
use causeway_core::graph::{Endpoint, Graph, NodeId};

/// Is `a *-* b` potentially directed from `a` to `b`? No arrowhead at `a`
/// and no tail at `b`.
pub(crate) fn potentially_directed(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    graph.is_adjacent(a, b)
        && graph.endpoint(b, a) != Some(Endpoint::Arrow)
        && graph.endpoint(a, b) != Some(Endpoint::Tail)
}

/// Where a path search may go and what counts as success.
pub(crate) struct PathQuery<'q> {
    /// First two nodes of the path. The caller checks the edge between them.
    pub start: [NodeId; 2],
    pub target: NodeId,
    /// Nodes the path may not visit.
    pub avoid: &'q [NodeId],
    /// Longest path allowed, in nodes.
    pub max_len: Option<usize>,
}

struct Frame {
    candidates: Vec<NodeId>,
    next: usize,
}

/// First simple uncovered path `start[0], start[1], ..., target` whose
/// steps all pass `step` and whose full node list passes `accept`.
///
/// Uncovered: for every three consecutive nodes, the outer two are not
/// adjacent.
pub(crate) fn find_uncovered_path(
    graph: &Graph,
    query: &PathQuery<'_>,
    step: impl Fn(NodeId, NodeId) -> bool,
    accept: impl Fn(&[NodeId]) -> bool,
    cancel: &CancellationToken,
) -> Result<Option<Vec<NodeId>>, SearchError> {
    let [first, second] = query.start;
    let mut path = vec![first, second];
    if second == query.target {
        return Ok(accept(&path).then_some(path));
    }

    let mut on_path = vec![false; graph.node_count()];
    for &node in query.avoid.iter().chain(&path) {
        if let Some(flag) = on_path.get_mut(node) {
            *flag = true;
        }
    }

    let extensions = |path: &[NodeId], on_path: &[bool]| -> Vec<NodeId> {
        let (prev, last) = (path[path.len() - 2], path[path.len() - 1]);
        graph
            .neighbors(last)
            .filter(|&n| !on_path.get(n).copied().unwrap_or(true))
            .filter(|&n| n != prev && !graph.is_adjacent(prev, n) && step(last, n))
            .collect()
    };

    let mut frames = vec![Frame {
        candidates: extensions(&path, &on_path),
        next: 0,
    }];

    while let Some(frame) = frames.last_mut() {
        cancel.check(stages::FCI, path.len())?;
        let Some(&node) = frame.candidates.get(frame.next) else {
            frames.pop();
            if let Some(done) = path.pop() {
                on_path[done] = false;
            }
            continue;
        };
        frame.next += 1;

        let len = path.len() + 1;
        if node == query.target {
            if query.max_len.map_or(true, |max| len <= max) {
                path.push(node);
                if accept(&path) {
                    return Ok(Some(path));
                }
                path.pop();
            }
            continue;
        }
        // The target still has to follow.
        if query.max_len.is_some_and(|max| len >= max) {
            continue;
        }
        path.push(node);
        on_path[node] = true;
        let candidates = extensions(&path, &on_path);
        frames.push(Frame { candidates, next: 0 });
    }
    Ok(None)
}
