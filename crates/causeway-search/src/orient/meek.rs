//! Meek's rules R1-R4 over a pattern, driven by a work queue.
//!
//! A node is queued whenever an edge at it or next to it changes, and each
//! visit re-examines its undirected edges. The pass ends when the queue
//! drains, at which point no rule applies anywhere. R4 only fires when
//! background knowledge is present; without it R1-R3 are complete.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use causeway_core::cancel::CancellationToken;
use causeway_core::constants::stages;
use causeway_core::errors::SearchError;
use causeway_core::graph::{Endpoint, Graph, NodeId};
use causeway_core::knowledge::Knowledge;
use causeway_core::observe::{NoopObserver, SearchObserver};
use serde::Serialize;

use super::arrowpoint_allowed;
use super::cycles::would_create_cycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeekRule {
    R1,
    R2,
    R3,
    R4,
}

impl MeekRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::R1 => "meek_r1",
            Self::R2 => "meek_r2",
            Self::R3 => "meek_r3",
            Self::R4 => "meek_r4",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeekReport {
    /// Orientations made, in order, with the rule that made each.
    pub oriented: Vec<(NodeId, NodeId, MeekRule)>,
    /// Orientations a rule asked for but knowledge or cycle checks refused.
    pub rejected: usize,
}

impl MeekReport {
    pub fn count(&self, rule: MeekRule) -> usize {
        self.oriented.iter().filter(|(_, _, r)| *r == rule).count()
    }
}

pub struct MeekRules<'a> {
    knowledge: &'a Knowledge,
    aggressive_cycle_prevention: bool,
    observer: Arc<dyn SearchObserver>,
    cancel: CancellationToken,
}

impl<'a> MeekRules<'a> {
    pub fn new(knowledge: &'a Knowledge) -> Self {
        Self {
            knowledge,
            aggressive_cycle_prevention: false,
            observer: Arc::new(NoopObserver),
            cancel: CancellationToken::new(),
        }
    }

    /// Refuse any orientation that would close a directed cycle.
    pub fn with_aggressive_cycle_prevention(mut self, enabled: bool) -> Self {
        self.aggressive_cycle_prevention = enabled;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Apply R1-R4 until nothing changes.
    pub fn orient_implied(&self, graph: &mut Graph) -> Result<MeekReport, SearchError> {
        let seeds: Vec<NodeId> = graph.node_ids().collect();
        self.orient_from(graph, seeds)
    }

    /// Same as [`Self::orient_implied`], starting the queue at `seeds`.
    /// Enough when the graph was already closed before edges at the seeds changed.
    pub fn orient_from(
        &self,
        graph: &mut Graph,
        seeds: impl IntoIterator<Item = NodeId>,
    ) -> Result<MeekReport, SearchError> {
        let started = Instant::now();
        self.observer.stage_started(stages::MEEK, graph.node_count());

        let mut queue = WorkQueue::new(graph.node_count());
        for seed in seeds {
            queue.push(seed);
        }

        let mut report = MeekReport::default();
        while let Some(b) = queue.pop() {
            if let Err(e) = self.cancel.check(stages::MEEK, 0) {
                self.observer.cancelled(stages::MEEK, 0);
                return Err(e);
            }
            for c in graph.adjacent_nodes(b) {
                // A refused direction still leaves the reverse to try.
                for (from, to) in [(b, c), (c, b)] {
                    if !graph.is_undirected(from, to) {
                        break;
                    }
                    let Some(rule) = self.implied(graph, from, to) else {
                        continue;
                    };
                    if self.commit(graph, from, to, rule) {
                        report.oriented.push((from, to, rule));
                        for node in [from, to] {
                            queue.push(node);
                            for n in graph.neighbors(node) {
                                queue.push(n);
                            }
                        }
                        break;
                    }
                    report.rejected += 1;
                }
            }
        }

        self.observer.stage_finished(stages::MEEK, started.elapsed());
        tracing::debug!(
            oriented = report.oriented.len(),
            rejected = report.rejected,
            "meek rules complete"
        );
        Ok(report)
    }

    /// First rule forcing `from --> to` on the undirected edge `from --- to`.
    fn implied(&self, graph: &Graph, from: NodeId, to: NodeId) -> Option<MeekRule> {
        if r1(graph, from, to) {
            Some(MeekRule::R1)
        } else if r2(graph, from, to) {
            Some(MeekRule::R2)
        } else if r3(graph, from, to) {
            Some(MeekRule::R3)
        } else if !self.knowledge.is_empty() && r4(graph, from, to) {
            Some(MeekRule::R4)
        } else {
            None
        }
    }

    fn commit(&self, graph: &mut Graph, from: NodeId, to: NodeId, rule: MeekRule) -> bool {
        let reason = if !arrowpoint_allowed(graph, self.knowledge, from, to) {
            Some("forbidden by knowledge".to_string())
        } else if self.aggressive_cycle_prevention && would_create_cycle(graph, from, to) {
            Some("would create a directed cycle".to_string())
        } else {
            match graph.orient(from, to) {
                Ok(true) => None,
                Ok(false) => Some("already oriented".to_string()),
                Err(e) => Some(e.to_string()),
            }
        };
        let (f, t) = (graph.name(from), graph.name(to));
        match reason {
            None => {
                self.observer.edge_oriented(rule.as_str(), f, t, Endpoint::Arrow);
                true
            }
            Some(reason) => {
                self.observer.orientation_rejected(rule.as_str(), f, t, &reason);
                false
            }
        }
    }
}

/// FIFO of nodes; a node already waiting is not queued twice.
struct WorkQueue {
    queue: VecDeque<NodeId>,
    waiting: Vec<bool>,
}

impl WorkQueue {
    fn new(nodes: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            waiting: vec![false; nodes],
        }
    }

    fn push(&mut self, node: NodeId) {
        if let Some(flag) = self.waiting.get_mut(node) {
            if !*flag {
                *flag = true;
                self.queue.push_back(node);
            }
        }
    }

    fn pop(&mut self) -> Option<NodeId> {
        let node = self.queue.pop_front()?;
        self.waiting[node] = false;
        Some(node)
    }
}

/// R1: `a --> b --- c`, `a` and `c` not adjacent.
fn r1(graph: &Graph, b: NodeId, c: NodeId) -> bool {
    graph
        .parents(b)
        .into_iter()
        .any(|a| a != c && !graph.is_adjacent(a, c) && !graph.is_ambiguous_triple(a, b, c))
}

/// R2: `a --> m --> c` with `a --- c`.
fn r2(graph: &Graph, a: NodeId, c: NodeId) -> bool {
    graph
        .children(a)
        .into_iter()
        .any(|m| m != c && graph.is_directed_from_to(m, c))
}

/// R3: `a --- c1 --> b`, `a --- c2 --> b`, `c1` and `c2` not adjacent, `a --- b`.
fn r3(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    let sides: Vec<NodeId> = graph
        .neighbors(a)
        .filter(|&c| c != b && graph.is_undirected(a, c) && graph.is_directed_from_to(c, b))
        .collect();
    sides.iter().enumerate().any(|(i, &c1)| {
        sides[i + 1..]
            .iter()
            .any(|&c2| !graph.is_adjacent(c1, c2) && !graph.is_ambiguous_triple(c1, a, c2))
    })
}

/// R4: `a --- c --> d --> b` with `a` adjacent to `d`, `c` not adjacent to
/// `b`, and `a --- b`.
fn r4(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    graph
        .neighbors(a)
        .filter(|&c| c != b && graph.is_undirected(a, c) && !graph.is_adjacent(c, b))
        .any(|c| {
            graph.children(c).into_iter().any(|d| {
                d != a && d != b && graph.is_directed_from_to(d, b) && graph.is_adjacent(a, d)
            })
        })
}
