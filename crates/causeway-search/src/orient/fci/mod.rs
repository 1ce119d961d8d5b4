//! FCI orientation over a partial ancestral graph.
//!
//! R0 turns every edge into `o-o`, applies background knowledge, and orients
//! unshielded colliders with PAG arrowhead rules. The final orientation then
//! sweeps R1-R4, plus R5-R10 when the complete rule set is enabled, until a
//! full sweep changes nothing. Only circle marks are ever rewritten, so the
//! sweep terminates.

mod discriminating;
mod paths;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use causeway_core::cancel::CancellationToken;
use causeway_core::combinatorics::choose;
use causeway_core::config::{ConflictRule, OrientationConfig, RuleSet};
use causeway_core::constants::{stages, MIN_DISCRIMINATING_PATH_LENGTH};
use causeway_core::errors::SearchError;
use causeway_core::graph::{Endpoint, Graph, NodeId};
use causeway_core::knowledge::Knowledge;
use causeway_core::observe::{NoopObserver, SearchObserver};
use causeway_core::traits::{SepsetDecision, SepsetProducer};
use serde::Serialize;

use self::paths::{find_uncovered_path, potentially_directed, PathQuery};
use super::colliders::{ArrowheadPolicy, ColliderOrienter, ColliderReport};
use super::knowledge::{fci_orient_knowledge, KnowledgeReport};
use super::arrowhead_allowed;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FciReport {
    pub knowledge: KnowledgeReport,
    pub colliders: ColliderReport,
    /// Endpoint changes per rule, keyed `fci_r1` to `fci_r10`.
    pub rule_counts: BTreeMap<&'static str, usize>,
    /// Sweeps of the final orientation, the last one unchanged.
    pub passes: usize,
}

impl FciReport {
    pub fn count(&self, rule: &str) -> usize {
        self.rule_counts.get(rule).copied().unwrap_or(0)
    }
}

type Counts = BTreeMap<&'static str, usize>;

pub struct FciOrient<'a> {
    producer: &'a dyn SepsetProducer,
    knowledge: &'a Knowledge,
    complete_rule_set: bool,
    max_path_length: i64,
    conflict_rule: ConflictRule,
    parallelism: usize,
    observer: Arc<dyn SearchObserver>,
    cancel: CancellationToken,
}

impl<'a> FciOrient<'a> {
    pub fn new(producer: &'a dyn SepsetProducer, knowledge: &'a Knowledge) -> Self {
        Self::from_config(producer, knowledge, &OrientationConfig::default())
    }

    pub fn from_config(
        producer: &'a dyn SepsetProducer,
        knowledge: &'a Knowledge,
        config: &OrientationConfig,
    ) -> Self {
        Self {
            producer,
            knowledge,
            complete_rule_set: config.complete_rule_set,
            max_path_length: config.max_path_length,
            conflict_rule: config.conflict_rule,
            parallelism: 1,
            observer: Arc::new(NoopObserver),
            cancel: CancellationToken::new(),
        }
    }

    /// R5-R10 on top of R1-R4.
    pub fn with_complete_rule_set(mut self, complete: bool) -> Self {
        self.complete_rule_set = complete;
        self
    }

    /// `-1` for unbounded, otherwise at least four nodes.
    pub fn with_max_path_length(mut self, max_path_length: i64) -> Self {
        self.max_path_length = max_path_length;
        self
    }

    pub fn with_conflict_rule(mut self, rule: ConflictRule) -> Self {
        self.conflict_rule = rule;
        self
    }

    /// Workers for the collider decisions.
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

    fn max_len(&self) -> Result<Option<usize>, SearchError> {
        match self.max_path_length {
            -1 => Ok(None),
            n if n >= MIN_DISCRIMINATING_PATH_LENGTH => Ok(usize::try_from(n).ok()),
            n => Err(SearchError::invalid(format!(
                "max path length must be -1 or at least {MIN_DISCRIMINATING_PATH_LENGTH}, got {n}"
            ))),
        }
    }

    /// R0 followed by the final orientation.
    pub fn orient(&self, graph: &mut Graph) -> Result<FciReport, SearchError> {
        let max_len = self.max_len()?;
        let started = Instant::now();
        let _span = causeway_core::orientation_span!(RuleSet::Fci).entered();
        self.observer.stage_started(stages::FCI, graph.node_count());

        graph.reorient_all_with(Endpoint::Circle);
        let knowledge = fci_orient_knowledge(graph, self.knowledge, self.observer.as_ref());
        let colliders = ColliderOrienter::new(self.producer, self.knowledge)
            .with_arrowhead_policy(ArrowheadPolicy::Pag)
            .with_conflict_rule(self.conflict_rule)
            .with_parallelism(self.parallelism)
            .with_observer(Arc::clone(&self.observer))
            .with_cancellation(self.cancel.clone())
            .orient(graph)?;

        let mut report = FciReport {
            knowledge,
            colliders,
            ..FciReport::default()
        };
        self.sweep(graph, max_len, &mut report)?;

        self.observer.stage_finished(stages::FCI, started.elapsed());
        tracing::debug!(passes = report.passes, "fci orientation complete");
        Ok(report)
    }

    /// The final orientation alone, for a graph whose colliders are already set.
    pub fn final_orientation(&self, graph: &mut Graph) -> Result<FciReport, SearchError> {
        let max_len = self.max_len()?;
        let mut report = FciReport::default();
        self.sweep(graph, max_len, &mut report)?;
        Ok(report)
    }

    fn sweep(
        &self,
        graph: &mut Graph,
        max_len: Option<usize>,
        report: &mut FciReport,
    ) -> Result<(), SearchError> {
        let counts = &mut report.rule_counts;
        loop {
            report.passes += 1;
            if let Err(e) = self.cancel.check(stages::FCI, report.passes) {
                self.observer.cancelled(stages::FCI, report.passes);
                return Err(e);
            }
            let mut changed = false;
            changed |= self.rule_r1(graph, counts);
            changed |= self.rule_r2(graph, counts);
            changed |= self.rule_r3(graph, counts);
            changed |= self.rule_r4(graph, max_len, counts)?;
            if self.complete_rule_set {
                changed |= self.rule_r5(graph, counts)?;
                changed |= self.rule_r6(graph, counts);
                changed |= self.rule_r7(graph, counts);
                changed |= self.rule_r8(graph, counts);
                changed |= self.rule_r9(graph, counts)?;
                changed |= self.rule_r10(graph, counts)?;
            }
            if !changed {
                return Ok(());
            }
        }
    }

    // ---- endpoint writes -------------------------------------------------

    fn write(
        &self,
        graph: &mut Graph,
        x: NodeId,
        y: NodeId,
        mark: Endpoint,
        rule: &'static str,
        counts: &mut Counts,
    ) -> bool {
        match graph.set_endpoint(x, y, mark) {
            Ok(true) => {
                self.observer.edge_oriented(rule, graph.name(x), graph.name(y), mark);
                *counts.entry(rule).or_default() += 1;
                true
            }
            Ok(false) => false,
            Err(e) => {
                self.observer
                    .orientation_rejected(rule, graph.name(x), graph.name(y), &e.to_string());
                false
            }
        }
    }

    /// Arrowhead at `y` on `x *-o y`, if knowledge allows it.
    fn put_arrow(&self, graph: &mut Graph, x: NodeId, y: NodeId, rule: &'static str, counts: &mut Counts) -> bool {
        if !arrowhead_allowed(graph, self.knowledge, x, y) {
            return false;
        }
        self.write(graph, x, y, Endpoint::Arrow, rule, counts)
    }

    /// Tail at `y` on `x *-o y`. Refused when it would complete a forbidden `y --> x`.
    fn put_tail(&self, graph: &mut Graph, x: NodeId, y: NodeId, rule: &'static str, counts: &mut Counts) -> bool {
        if graph.endpoint(x, y) != Some(Endpoint::Circle) {
            return false;
        }
        if graph.endpoint(y, x) == Some(Endpoint::Arrow)
            && self.knowledge.is_forbidden(graph.name(y), graph.name(x))
        {
            self.observer.orientation_rejected(
                rule,
                graph.name(y),
                graph.name(x),
                "forbidden by knowledge",
            );
            return false;
        }
        self.write(graph, x, y, Endpoint::Tail, rule, counts)
    }

    fn is_circle(graph: &Graph, x: NodeId, y: NodeId) -> bool {
        graph.endpoint(x, y) == Some(Endpoint::Circle)
    }

    fn is_arrow(graph: &Graph, x: NodeId, y: NodeId) -> bool {
        graph.endpoint(x, y) == Some(Endpoint::Arrow)
    }

    fn is_tail(graph: &Graph, x: NodeId, y: NodeId) -> bool {
        graph.endpoint(x, y) == Some(Endpoint::Tail)
    }

    /// `a o-> c`
    fn is_partially_oriented(graph: &Graph, a: NodeId, c: NodeId) -> bool {
        Self::is_circle(graph, c, a) && Self::is_arrow(graph, a, c)
    }

    // ---- R1-R4 -----------------------------------------------------------

    /// `a *-> b o-* c`, `a` and `c` not adjacent: `b --> c`.
    fn rule_r1(&self, graph: &mut Graph, counts: &mut Counts) -> bool {
        let mut changed = false;
        for b in graph.node_ids() {
            for a in graph.adjacent_nodes(b) {
                if !Self::is_arrow(graph, a, b) {
                    continue;
                }
                for c in graph.adjacent_nodes(b) {
                    if c == a
                        || !Self::is_circle(graph, c, b)
                        || graph.is_adjacent(a, c)
                        || graph.is_ambiguous_triple(a, b, c)
                        || !arrowhead_allowed(graph, self.knowledge, b, c)
                    {
                        continue;
                    }
                    changed |= self.put_arrow(graph, b, c, "fci_r1", counts);
                    changed |= self.put_tail(graph, c, b, "fci_r1", counts);
                }
            }
        }
        changed
    }

    /// `a --> b *-> c` or `a *-> b --> c`, with `a *-o c`: arrowhead at `c`.
    fn rule_r2(&self, graph: &mut Graph, counts: &mut Counts) -> bool {
        let mut changed = false;
        for a in graph.node_ids() {
            for c in graph.adjacent_nodes(a) {
                if !Self::is_circle(graph, a, c) {
                    continue;
                }
                let implied = graph.adjacent_nodes(a).into_iter().any(|b| {
                    b != c
                        && graph.is_adjacent(b, c)
                        && ((graph.is_directed_from_to(a, b) && Self::is_arrow(graph, b, c))
                            || (Self::is_arrow(graph, a, b) && graph.is_directed_from_to(b, c)))
                });
                if implied {
                    changed |= self.put_arrow(graph, a, c, "fci_r2", counts);
                }
            }
        }
        changed
    }

    /// `a *-> b <-* c`, `a *-o d o-* c`, `a` and `c` not adjacent,
    /// `d *-o b`: arrowhead at `b` on `d *-> b`.
    fn rule_r3(&self, graph: &mut Graph, counts: &mut Counts) -> bool {
        let mut changed = false;
        for b in graph.node_ids() {
            let adjacent = graph.adjacent_nodes(b);
            for &d in &adjacent {
                if !Self::is_circle(graph, d, b) {
                    continue;
                }
                let implied = choose(&adjacent, 2).any(|pair| {
                    let (a, c) = (pair[0], pair[1]);
                    a != d
                        && c != d
                        && graph.is_def_collider(a, b, c)
                        && !graph.is_adjacent(a, c)
                        && Self::is_circle(graph, a, d)
                        && Self::is_circle(graph, c, d)
                        && !graph.is_ambiguous_triple(a, d, c)
                });
                if implied {
                    changed |= self.put_arrow(graph, d, b, "fci_r3", counts);
                }
            }
        }
        changed
    }

    /// Discriminating paths `x, ..., w, v, y` with `v o-> y`: a tail at `v`
    /// when `v` separates `x` and `y`, otherwise `w <-> v <-> y`.
    fn rule_r4(
        &self,
        graph: &mut Graph,
        max_len: Option<usize>,
        counts: &mut Counts,
    ) -> Result<bool, SearchError> {
        let mut changed = false;
        for y in graph.node_ids() {
            for v in graph.adjacent_nodes(y) {
                if !Self::is_partially_oriented(graph, v, y) {
                    continue;
                }
                for w in graph.adjacent_nodes(y) {
                    if w == v
                        || !graph.is_parent_of(w, y)
                        || !graph.is_adjacent(w, v)
                        || !Self::is_arrow(graph, v, w)
                    {
                        continue;
                    }
                    let Some(x) = discriminating::find_origin(graph, w, v, y, max_len, &self.cancel)? else {
                        continue;
                    };
                    match self.producer.decide(graph, x, v, y) {
                        SepsetDecision::Dependent(_) => {
                            changed |= self.put_tail(graph, y, v, "fci_r4", counts);
                        }
                        SepsetDecision::Independent(_) => {
                            changed |= self.put_arrow(graph, w, v, "fci_r4", counts);
                            changed |= self.put_arrow(graph, y, v, "fci_r4", counts);
                        }
                        SepsetDecision::NoDecision => {
                            self.observer.triple_ambiguous(graph.name(w), graph.name(v), graph.name(y));
                        }
                    }
                    // The marks at v are settled either way.
                    break;
                }
            }
        }
        Ok(changed)
    }

    // ---- R5-R10 ----------------------------------------------------------

    /// `a o-o b` closed by an uncovered circle path `a, c, ..., d, b`: every
    /// edge on the cycle becomes `---`.
    fn rule_r5(&self, graph: &mut Graph, counts: &mut Counts) -> Result<bool, SearchError> {
        let mut changed = false;
        let pairs: Vec<(NodeId, NodeId)> = graph.edge_pairs().collect();
        for (a, b) in pairs {
            if !graph.is_nondirected(a, b) {
                continue;
            }
            let found = self.uncovered_circle_cycle(graph, a, b)?;
            let Some(mut cycle) = found else {
                continue;
            };
            cycle.push(b);
            cycle.push(a);
            for pair in cycle.windows(2) {
                changed |= self.write(graph, pair[0], pair[1], Endpoint::Tail, "fci_r5", counts);
                changed |= self.write(graph, pair[1], pair[0], Endpoint::Tail, "fci_r5", counts);
            }
        }
        Ok(changed)
    }

    fn uncovered_circle_cycle(
        &self,
        graph: &Graph,
        a: NodeId,
        b: NodeId,
    ) -> Result<Option<Vec<NodeId>>, SearchError> {
        for c in graph.adjacent_nodes(a) {
            if c == b || !graph.is_nondirected(a, c) || graph.is_adjacent(c, b) {
                continue;
            }
            for d in graph.adjacent_nodes(b) {
                if d == a || !graph.is_nondirected(b, d) || graph.is_adjacent(d, a) {
                    continue;
                }
                let query = PathQuery {
                    start: [a, c],
                    target: d,
                    avoid: &[b],
                    max_len: None,
                };
                let path = find_uncovered_path(
                    graph,
                    &query,
                    |from, to| graph.is_nondirected(from, to),
                    |path| path.len() < 3 || !graph.is_adjacent(path[path.len() - 2], b),
                    &self.cancel,
                )?;
                if path.is_some() {
                    return Ok(path);
                }
            }
        }
        Ok(None)
    }

    /// `a --- b o-* c`: tail at `b`.
    fn rule_r6(&self, graph: &mut Graph, counts: &mut Counts) -> bool {
        let mut changed = false;
        for b in graph.node_ids() {
            for a in graph.adjacent_nodes(b) {
                if !graph.is_undirected(a, b) {
                    continue;
                }
                for c in graph.adjacent_nodes(b) {
                    if c != a && Self::is_circle(graph, c, b) {
                        changed |= self.put_tail(graph, c, b, "fci_r6", counts);
                    }
                }
            }
        }
        changed
    }

    /// `a -o b o-* c`, `a` and `c` not adjacent: tail at `b`.
    fn rule_r7(&self, graph: &mut Graph, counts: &mut Counts) -> bool {
        let mut changed = false;
        for b in graph.node_ids() {
            for a in graph.adjacent_nodes(b) {
                if !(Self::is_tail(graph, b, a) && Self::is_circle(graph, a, b)) {
                    continue;
                }
                for c in graph.adjacent_nodes(b) {
                    if c != a
                        && Self::is_circle(graph, c, b)
                        && !graph.is_adjacent(a, c)
                        && !graph.is_ambiguous_triple(a, b, c)
                    {
                        changed |= self.put_tail(graph, c, b, "fci_r7", counts);
                    }
                }
            }
        }
        changed
    }

    /// `a --> b --> c` or `a -o b --> c`, with `a o-> c`: `a --> c`.
    fn rule_r8(&self, graph: &mut Graph, counts: &mut Counts) -> bool {
        let mut changed = false;
        for a in graph.node_ids() {
            for c in graph.adjacent_nodes(a) {
                if !Self::is_partially_oriented(graph, a, c) {
                    continue;
                }
                let implied = graph.adjacent_nodes(a).into_iter().any(|b| {
                    b != c
                        && graph.is_directed_from_to(b, c)
                        && (graph.is_directed_from_to(a, b)
                            || (Self::is_tail(graph, b, a) && Self::is_circle(graph, a, b)))
                });
                if implied {
                    changed |= self.put_tail(graph, c, a, "fci_r8", counts);
                }
            }
        }
        changed
    }

    /// `a o-> c` with an uncovered potentially directed path `a, b, ..., c`,
    /// `b` and `c` not adjacent: `a --> c`.
    fn rule_r9(&self, graph: &mut Graph, counts: &mut Counts) -> Result<bool, SearchError> {
        let mut changed = false;
        for a in graph.node_ids() {
            for c in graph.adjacent_nodes(a) {
                if !Self::is_partially_oriented(graph, a, c) {
                    continue;
                }
                let mut found = false;
                for b in graph.adjacent_nodes(a) {
                    if b == c || graph.is_adjacent(b, c) || !potentially_directed(graph, a, b) {
                        continue;
                    }
                    let query = PathQuery {
                        start: [a, b],
                        target: c,
                        avoid: &[],
                        max_len: None,
                    };
                    let path = find_uncovered_path(
                        graph,
                        &query,
                        |from, to| potentially_directed(graph, from, to),
                        |_| true,
                        &self.cancel,
                    )?;
                    if path.is_some() {
                        found = true;
                        break;
                    }
                }
                if found {
                    changed |= self.put_tail(graph, c, a, "fci_r9", counts);
                }
            }
        }
        Ok(changed)
    }

    /// `a o-> c <-- b`, `c <-- d`, with uncovered potentially directed paths
    /// from `a` to `b` and to `d` whose first steps `m` and `w` are distinct
    /// and not adjacent: `a --> c`.
    fn rule_r10(&self, graph: &mut Graph, counts: &mut Counts) -> Result<bool, SearchError> {
        let mut changed = false;
        for a in graph.node_ids() {
            for c in graph.adjacent_nodes(a) {
                if !Self::is_partially_oriented(graph, a, c) {
                    continue;
                }
                let parents: Vec<NodeId> = graph.parents(c).into_iter().filter(|&p| p != a).collect();
                let mut found = false;
                for pair in choose(&parents, 2) {
                    if self.r10_paths(graph, a, c, pair[0], pair[1])? {
                        found = true;
                        break;
                    }
                }
                if found {
                    changed |= self.put_tail(graph, c, a, "fci_r10", counts);
                }
            }
        }
        Ok(changed)
    }

    fn r10_paths(
        &self,
        graph: &Graph,
        a: NodeId,
        c: NodeId,
        b: NodeId,
        d: NodeId,
    ) -> Result<bool, SearchError> {
        let firsts: Vec<NodeId> = graph
            .adjacent_nodes(a)
            .into_iter()
            .filter(|&m| m != c && potentially_directed(graph, a, m))
            .collect();
        for &m in &firsts {
            if !self.pd_path_exists(graph, a, m, b, c)? {
                continue;
            }
            for &w in &firsts {
                if w != m && !graph.is_adjacent(m, w) && self.pd_path_exists(graph, a, w, d, c)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Uncovered potentially directed path `a, first, ..., target` avoiding `c`.
    fn pd_path_exists(
        &self,
        graph: &Graph,
        a: NodeId,
        first: NodeId,
        target: NodeId,
        c: NodeId,
    ) -> Result<bool, SearchError> {
        let query = PathQuery {
            start: [a, first],
            target,
            avoid: &[c],
            max_len: None,
        };
        let path = find_uncovered_path(
            graph,
            &query,
            |from, to| potentially_directed(graph, from, to),
            |_| true,
            &self.cancel,
        )?;
        Ok(path.is_some())
    }
}
