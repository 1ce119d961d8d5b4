//! Unshielded-collider orientation.
//!
//! Every unshielded triple `a - b - c` gets a three-valued decision from the
//! sepset producer. Decisions are computed in parallel against the graph as
//! it stood when the pass began, then applied one triple at a time in node
//! order, so the conflict rule sees a deterministic sequence.

use std::sync::Arc;
use std::time::Instant;

use causeway_core::cancel::CancellationToken;
use causeway_core::combinatorics::choose;
use causeway_core::config::ConflictRule;
use causeway_core::constants::stages;
use causeway_core::errors::SearchError;
use causeway_core::graph::{Endpoint, Graph, NodeId, Triple};
use causeway_core::knowledge::Knowledge;
use causeway_core::observe::{NoopObserver, SearchObserver};
use causeway_core::traits::{SepsetDecision, SepsetProducer};
use serde::Serialize;

use super::{arrowhead_allowed, arrowpoint_allowed, can_set, graph_error};
use crate::pool::{build_pool, map_ordered};

const RULE: &str = "collider";

/// Which knowledge check guards a new arrowhead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrowheadPolicy {
    /// Pattern semantics: [`arrowpoint_allowed`].
    #[default]
    Cpdag,
    /// Partial ancestral graph semantics: [`arrowhead_allowed`].
    Pag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColliderReport {
    pub colliders: Vec<Triple>,
    pub noncolliders: Vec<Triple>,
    pub ambiguous: Vec<Triple>,
    /// Colliders the producer asked for but knowledge or the conflict rule refused.
    pub rejected: Vec<Triple>,
}

pub struct ColliderOrienter<'a> {
    producer: &'a dyn SepsetProducer,
    knowledge: &'a Knowledge,
    conflict_rule: ConflictRule,
    policy: ArrowheadPolicy,
    reference: Option<&'a Graph>,
    parallelism: usize,
    observer: Arc<dyn SearchObserver>,
    cancel: CancellationToken,
}

impl<'a> ColliderOrienter<'a> {
    pub fn new(producer: &'a dyn SepsetProducer, knowledge: &'a Knowledge) -> Self {
        Self {
            producer,
            knowledge,
            conflict_rule: ConflictRule::default(),
            policy: ArrowheadPolicy::default(),
            reference: None,
            parallelism: 1,
            observer: Arc::new(NoopObserver),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_conflict_rule(mut self, rule: ConflictRule) -> Self {
        self.conflict_rule = rule;
        self
    }

    pub fn with_arrowhead_policy(mut self, policy: ArrowheadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Only triples unshielded in `reference` as well are considered.
    pub fn with_reference(mut self, reference: &'a Graph) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
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

    /// Orient every unshielded collider of `graph`, recording noncolliders
    /// and ambiguous triples on it as well.
    pub fn orient(&self, graph: &mut Graph) -> Result<ColliderReport, SearchError> {
        let started = Instant::now();
        let _span = causeway_core::collider_span!(self.producer.name(), self.conflict_rule).entered();
        self.observer.stage_started(stages::COLLIDERS, graph.node_count());

        let triples = self.unshielded_triples(graph);
        let pool = build_pool(self.parallelism)?;
        let decisions = {
            let snapshot: &Graph = graph;
            map_ordered(&pool, &triples, |&(a, b, c)| {
                self.cancel.check(stages::COLLIDERS, 0)?;
                Ok(self.producer.decide(snapshot, a, b, c))
            })
        };
        let decisions = match decisions {
            Ok(decisions) => decisions,
            Err(e) => {
                self.observer.cancelled(stages::COLLIDERS, 0);
                return Err(e);
            }
        };

        let mut report = ColliderReport::default();
        for (&(a, b, c), decision) in triples.iter().zip(decisions) {
            let triple = Triple::new(a, b, c);
            match decision {
                SepsetDecision::Independent(_) => {
                    if self.orient_collider(graph, a, b, c)? {
                        self.observer.collider_oriented(graph.name(a), graph.name(b), graph.name(c));
                        report.colliders.push(triple);
                    } else {
                        report.rejected.push(triple);
                    }
                }
                SepsetDecision::Dependent(_) => {
                    self.observer
                        .noncollider_recorded(graph.name(a), graph.name(b), graph.name(c));
                    graph.add_underline_triple(a, b, c);
                    report.noncolliders.push(triple);
                }
                SepsetDecision::NoDecision => {
                    self.observer
                        .triple_ambiguous(graph.name(a), graph.name(b), graph.name(c));
                    graph.add_ambiguous_triple(a, b, c);
                    report.ambiguous.push(triple);
                }
            }
        }

        self.observer.stage_finished(stages::COLLIDERS, started.elapsed());
        tracing::debug!(
            colliders = report.colliders.len(),
            noncolliders = report.noncolliders.len(),
            ambiguous = report.ambiguous.len(),
            rejected = report.rejected.len(),
            "collider orientation complete"
        );
        Ok(report)
    }

    /// `(a, b, c)` with `a < c`, both adjacent to `b` and not to each other,
    /// ordered by `b` and then by `(a, c)`.
    fn unshielded_triples(&self, graph: &Graph) -> Vec<(NodeId, NodeId, NodeId)> {
        let mut out = Vec::new();
        for b in graph.node_ids() {
            let adjacent = graph.adjacent_nodes(b);
            for pair in choose(&adjacent, 2) {
                let (a, c) = (pair[0], pair[1]);
                if graph.is_adjacent(a, c) {
                    continue;
                }
                if let Some(reference) = self.reference {
                    if reference.is_adjacent(a, c)
                        || !reference.is_adjacent(a, b)
                        || !reference.is_adjacent(c, b)
                    {
                        continue;
                    }
                }
                out.push((a, b, c));
            }
        }
        out
    }

    fn arrow_allowed(&self, graph: &Graph, from: NodeId, to: NodeId) -> bool {
        match self.policy {
            ArrowheadPolicy::Cpdag => arrowpoint_allowed(graph, self.knowledge, from, to),
            ArrowheadPolicy::Pag => arrowhead_allowed(graph, self.knowledge, from, to),
        }
    }

    /// Put arrowheads at `b` on `a *-* b` and `c *-* b`. Returns whether the
    /// collider now stands.
    fn orient_collider(
        &self,
        graph: &mut Graph,
        a: NodeId,
        b: NodeId,
        c: NodeId,
    ) -> Result<bool, SearchError> {
        if !self.arrow_allowed(graph, a, b) || !self.arrow_allowed(graph, c, b) {
            self.reject(graph, a, b, c, "forbidden by knowledge");
            return Ok(false);
        }

        match self.conflict_rule {
            ConflictRule::Priority => {
                // In a PAG an arrowhead at `a` or `c` only makes the edge bidirected.
                let earlier = self.policy == ArrowheadPolicy::Cpdag
                    && (graph.endpoint(b, a) == Some(Endpoint::Arrow)
                        || graph.endpoint(b, c) == Some(Endpoint::Arrow));
                if earlier {
                    self.reject(graph, a, b, c, "conflicts with an earlier collider");
                    return Ok(false);
                }
                if !can_set(graph, a, b, Endpoint::Arrow) || !can_set(graph, c, b, Endpoint::Arrow) {
                    self.reject(graph, a, b, c, "endpoint already committed");
                    return Ok(false);
                }
                graph.set_endpoint(a, b, Endpoint::Arrow).map_err(graph_error)?;
                graph.set_endpoint(c, b, Endpoint::Arrow).map_err(graph_error)?;
            }
            ConflictRule::Bidirected => {
                for side in [a, c] {
                    if graph.set_endpoint(side, b, Endpoint::Arrow).is_err() {
                        graph
                            .force_endpoint(side, b, Endpoint::Arrow)
                            .map_err(graph_error)?;
                    }
                }
            }
            ConflictRule::Overwrite => {
                for side in [a, c] {
                    graph
                        .force_endpoint(side, b, Endpoint::Arrow)
                        .map_err(graph_error)?;
                    if self.policy == ArrowheadPolicy::Cpdag {
                        graph
                            .force_endpoint(b, side, Endpoint::Tail)
                            .map_err(graph_error)?;
                    }
                }
            }
        }
        Ok(graph.is_def_collider(a, b, c))
    }

    fn reject(&self, graph: &Graph, a: NodeId, b: NodeId, c: NodeId, reason: &str) {
        let (na, nb, nc) = (graph.name(a), graph.name(b), graph.name(c));
        self.observer
            .orientation_rejected(RULE, na, nb, &format!("{reason} ({na}, {nb}, {nc})"));
    }
}
