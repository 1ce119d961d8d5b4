//! Fast Adjacency Search.
//!
//! Starts from a complete (or supplied) undirected graph and removes an edge
//! `x - y` as soon as some conditioning set drawn from the possible parents of
//! `x` or of `y` separates them. Depth `d` tests sets of size `d`; the search
//! stops once no node has enough neighbours left to build a set of the next size.
//!
//! The stable variant decides every removal of a depth against a snapshot
//! taken when the depth starts and commits them together afterwards, so the
//! result does not depend on scheduling. The live variant removes edges as
//! soon as they are found, letting later edges of the same depth see it.

mod result;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use rayon::ThreadPool;

use causeway_core::cancel::CancellationToken;
use causeway_core::combinatorics::choose;
use causeway_core::config::{FasConfig, PcHeuristic};
use causeway_core::constants::{resolve_depth, stages};
use causeway_core::errors::SearchError;
use causeway_core::graph::{Graph, Node, NodeId};
use causeway_core::knowledge::Knowledge;
use causeway_core::observe::{NoopObserver, SearchObserver};
use causeway_core::sepset_map::{NodePair, SepsetMap};
use causeway_core::traits::{validate_conditioning_set, IndependenceResult, IndependenceTest};

pub use result::{FasResult, FasStats};

use crate::pool::{build_pool, map_ordered};

type Adjacency = Vec<BTreeSet<NodeId>>;

/// Outcome for one edge at one depth.
#[derive(Debug, Clone, PartialEq)]
enum Verdict {
    Keep,
    Separated { set: Vec<NodeId>, p_value: f64 },
    /// Both directions forbidden by knowledge. Removed untested, with an
    /// empty sepset.
    Forbidden,
}

/// Shared, thread-safe state of one run.
struct RunState<'a> {
    variables: &'a [Node],
    tests_run: AtomicUsize,
    failures: AtomicUsize,
    /// p-values of the depth-0 tests, for the ordering heuristics.
    marginal_p: DashMap<NodePair, f64>,
}

impl RunState<'_> {
    fn name(&self, id: NodeId) -> &str {
        self.variables.get(id).map_or("?", |n| n.name.as_str())
    }

    fn marginal_p(&self, a: NodeId, b: NodeId) -> f64 {
        self.marginal_p
            .get(&NodePair::new(a, b))
            .map_or(0.0, |p| *p.value())
    }
}

pub struct Fas {
    test: Arc<dyn IndependenceTest>,
    knowledge: Knowledge,
    depth: i64,
    stable: bool,
    parallelism: usize,
    heuristic: PcHeuristic,
    observer: Arc<dyn SearchObserver>,
    cancel: CancellationToken,
}

impl Fas {
    pub fn new(test: Arc<dyn IndependenceTest>) -> Self {
        Self::from_config(test, &FasConfig::default())
    }

    pub fn from_config(test: Arc<dyn IndependenceTest>, config: &FasConfig) -> Self {
        Self {
            test,
            knowledge: Knowledge::new(),
            depth: config.depth,
            stable: config.stable,
            parallelism: config.parallelism,
            heuristic: config.heuristic,
            observer: Arc::new(NoopObserver),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_knowledge(mut self, knowledge: Knowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// `-1` for unbounded; anything below that fails when the search starts.
    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_stable(mut self, stable: bool) -> Self {
        self.stable = stable;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_heuristic(mut self, heuristic: PcHeuristic) -> Self {
        self.heuristic = heuristic;
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

    /// Search from the complete graph over the oracle's variables.
    pub fn search(&self) -> Result<FasResult, SearchError> {
        let n = self.test.variables().len();
        let adjacency = (0..n)
            .map(|x| (0..n).filter(|&y| y != x).collect())
            .collect();
        self.run(adjacency)
    }

    /// Search from the adjacencies of `prior`. Its nodes are matched to the
    /// oracle's variables by name; edge marks are ignored.
    pub fn search_from(&self, prior: &Graph) -> Result<FasResult, SearchError> {
        let variables = self.test.variables();
        let mut ids = Vec::with_capacity(prior.node_count());
        for node in prior.nodes() {
            let id = variables
                .iter()
                .position(|v| v.name == node.name)
                .ok_or_else(|| {
                    SearchError::invalid(format!("prior graph node {} is not a test variable", node.name))
                })?;
            ids.push(id);
        }
        let mut adjacency: Adjacency = vec![BTreeSet::new(); variables.len()];
        for (a, b) in prior.edge_pairs() {
            let (x, y) = (ids[a], ids[b]);
            adjacency[x].insert(y);
            adjacency[y].insert(x);
        }
        self.run(adjacency)
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.depth < -1 {
            return Err(SearchError::invalid(format!(
                "depth must be -1 or non-negative, got {}",
                self.depth
            )));
        }
        Ok(())
    }

    fn run(&self, mut adjacency: Adjacency) -> Result<FasResult, SearchError> {
        self.validate()?;
        let started = Instant::now();
        let variables = self.test.variables();
        let _span = causeway_core::fas_span!(variables.len(), self.depth, self.stable).entered();
        self.observer.stage_started(stages::FAS, variables.len());

        let pool = build_pool(self.parallelism)?;
        let state = RunState {
            variables,
            tests_run: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            marginal_p: DashMap::new(),
        };
        let sepsets = SepsetMap::new();
        let mut edge_counts = Vec::new();
        let mut depth_reached = 0;

        for depth in 0..=resolve_depth(self.depth) {
            if depth > 0 && max_free_degree(&adjacency) < depth {
                break;
            }
            let removed = match self.search_depth(&pool, &state, &mut adjacency, &sepsets, depth) {
                Ok(removed) => removed,
                Err(e) => {
                    if matches!(e, SearchError::Cancelled { .. }) {
                        self.observer.cancelled(stages::FAS, depth);
                    }
                    return Err(e);
                }
            };
            let edges = edge_count(&adjacency);
            edge_counts.push(edges);
            depth_reached = depth;
            self.observer.depth_finished(depth, edges, removed);
        }

        let mut graph = Graph::from_nodes(variables.iter().cloned())
            .map_err(|e| SearchError::invalid(e.to_string()))?;
        for (x, neighbours) in adjacency.iter().enumerate() {
            for &y in neighbours.range((x + 1)..) {
                graph
                    .add_undirected_edge(x, y)
                    .map_err(|e| SearchError::invalid(e.to_string()))?;
            }
        }

        let stats = FasStats {
            depth_reached,
            tests_run: state.tests_run.load(Ordering::Relaxed),
            oracle_failures: state.failures.load(Ordering::Relaxed),
            edge_counts,
            elapsed: started.elapsed(),
        };
        self.observer.stage_finished(stages::FAS, stats.elapsed);
        tracing::info!(
            edges = graph.edge_count(),
            sepsets = sepsets.len(),
            tests = stats.tests_run,
            depth = stats.depth_reached,
            "adjacency search complete"
        );
        Ok(FasResult {
            graph,
            sepsets,
            stats,
        })
    }

    /// One depth: decide every edge, then commit. Returns the number removed.
    fn search_depth(
        &self,
        pool: &ThreadPool,
        state: &RunState<'_>,
        adjacency: &mut Adjacency,
        sepsets: &SepsetMap,
        depth: usize,
    ) -> Result<usize, SearchError> {
        self.cancel.check(stages::FAS, depth)?;
        let edges = self.edge_order(state, adjacency, depth);
        self.observer.depth_started(depth, edges.len());

        let verdicts = if depth == 0 {
            map_ordered(pool, &edges, |&(x, y)| self.test_marginal(state, x, y))?
        } else if self.stable {
            let snapshot: &Adjacency = adjacency;
            map_ordered(pool, &edges, |&(x, y)| {
                self.test_edge(state, x, y, depth, &snapshot[x], &snapshot[y])
            })?
        } else {
            let live: DashMap<NodeId, BTreeSet<NodeId>> =
                adjacency.iter().cloned().enumerate().collect();
            map_ordered(pool, &edges, |&(x, y)| {
                let adj_x = live.get(&x).map(|s| s.value().clone()).unwrap_or_default();
                let adj_y = live.get(&y).map(|s| s.value().clone()).unwrap_or_default();
                let verdict = self.test_edge(state, x, y, depth, &adj_x, &adj_y)?;
                if verdict != Verdict::Keep {
                    if let Some(mut s) = live.get_mut(&x) {
                        s.remove(&y);
                    }
                    if let Some(mut s) = live.get_mut(&y) {
                        s.remove(&x);
                    }
                }
                Ok(verdict)
            })?
        };

        let mut removed = 0;
        for (&(x, y), verdict) in edges.iter().zip(verdicts) {
            match verdict {
                Verdict::Keep => continue,
                Verdict::Separated { set, p_value } => {
                    let names: Vec<&str> = set.iter().map(|&n| state.name(n)).collect();
                    self.observer.edge_removed(state.name(x), state.name(y), &names, depth);
                    sepsets.set(x, y, set, Some(p_value));
                }
                Verdict::Forbidden => {
                    self.observer.edge_removed(state.name(x), state.name(y), &[], depth);
                    sepsets.set(x, y, Vec::new(), None);
                }
            }
            adjacency[x].remove(&y);
            adjacency[y].remove(&x);
            removed += 1;
        }
        Ok(removed)
    }

    /// Edges to visit at `depth`, in a deterministic order.
    fn edge_order(&self, state: &RunState<'_>, adjacency: &Adjacency, depth: usize) -> Vec<(NodeId, NodeId)> {
        let mut order: Vec<NodeId> = (0..adjacency.len()).collect();
        if self.heuristic == PcHeuristic::SortVariables {
            order.sort_by(|&a, &b| state.name(a).cmp(state.name(b)).then(a.cmp(&b)));
        }
        let mut position = vec![0; order.len()];
        for (i, &node) in order.iter().enumerate() {
            position[node] = i;
        }

        let mut edges = Vec::new();
        for &x in &order {
            let mut later: Vec<NodeId> = adjacency[x]
                .iter()
                .copied()
                .filter(|&y| position[y] > position[x])
                .collect();
            later.sort_by_key(|&y| position[y]);
            edges.extend(later.into_iter().map(|y| (x, y)));
        }

        if depth > 0 && self.heuristic == PcHeuristic::SortEdgesByPValue {
            edges.sort_by(|&(a, b), &(c, d)| state.marginal_p(c, d).total_cmp(&state.marginal_p(a, b)));
        }
        edges
    }

    fn names(&self, state: &RunState<'_>, x: NodeId, y: NodeId) -> (String, String) {
        (state.name(x).to_string(), state.name(y).to_string())
    }

    fn test_marginal(&self, state: &RunState<'_>, x: NodeId, y: NodeId) -> Result<Verdict, SearchError> {
        self.cancel.check(stages::FAS, 0)?;
        let (nx, ny) = self.names(state, x, y);
        if self.knowledge.is_forbidden(&nx, &ny)
            && self.knowledge.is_forbidden(&ny, &nx)
            && self.knowledge.no_edge_required(&nx, &ny)
        {
            return Ok(Verdict::Forbidden);
        }
        if !self.knowledge.no_edge_required(&nx, &ny) {
            return Ok(Verdict::Keep);
        }
        match self.run_test(state, x, y, &[])? {
            Some(result) => {
                state.marginal_p.insert(NodePair::new(x, y), result.p_value);
                Ok(separated_or_keep(result, Vec::new()))
            }
            None => Ok(Verdict::Keep),
        }
    }

    /// First conditioning set, x's side before y's, that separates `x` and `y`.
    fn test_edge(
        &self,
        state: &RunState<'_>,
        x: NodeId,
        y: NodeId,
        depth: usize,
        adj_x: &BTreeSet<NodeId>,
        adj_y: &BTreeSet<NodeId>,
    ) -> Result<Verdict, SearchError> {
        let (nx, ny) = self.names(state, x, y);
        if !self.knowledge.no_edge_required(&nx, &ny) {
            return Ok(Verdict::Keep);
        }
        for (a, b, adj_a) in [(x, y, adj_x), (y, x, adj_y)] {
            let candidates = self.possible_parents(state, a, b, adj_a);
            if candidates.len() < depth {
                continue;
            }
            for set in choose(&candidates, depth) {
                self.cancel.check(stages::FAS, depth)?;
                if let Some(result) = self.run_test(state, a, b, &set)? {
                    if result.independent {
                        return Ok(separated_or_keep(result, set));
                    }
                }
            }
        }
        Ok(Verdict::Keep)
    }

    /// Neighbours of `a` other than `b` that knowledge lets be a parent of `a`.
    fn possible_parents(
        &self,
        state: &RunState<'_>,
        a: NodeId,
        b: NodeId,
        adj_a: &BTreeSet<NodeId>,
    ) -> Vec<NodeId> {
        let name_a = state.name(a);
        let mut out: Vec<NodeId> = adj_a
            .iter()
            .copied()
            .filter(|&z| z != b)
            .filter(|&z| {
                let name_z = state.name(z);
                !self.knowledge.is_forbidden(name_z, name_a) && !self.knowledge.is_required(name_a, name_z)
            })
            .collect();
        if self.heuristic == PcHeuristic::SortParentsByPValue {
            out.sort_by(|&p, &q| state.marginal_p(a, p).total_cmp(&state.marginal_p(a, q)));
        }
        out
    }

    /// Run one test. A failing oracle counts as "dependent" and is reported.
    fn run_test(
        &self,
        state: &RunState<'_>,
        x: NodeId,
        y: NodeId,
        set: &[NodeId],
    ) -> Result<Option<IndependenceResult>, SearchError> {
        validate_conditioning_set(x, y, set)?;
        state.tests_run.fetch_add(1, Ordering::Relaxed);
        match self.test.check_independence(x, y, set) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                state.failures.fetch_add(1, Ordering::Relaxed);
                self.observer.oracle_failed(state.name(x), state.name(y), &e);
                Ok(None)
            }
        }
    }
}

fn separated_or_keep(result: IndependenceResult, set: Vec<NodeId>) -> Verdict {
    if result.independent {
        Verdict::Separated {
            set,
            p_value: result.p_value,
        }
    } else {
        Verdict::Keep
    }
}

/// Largest neighbourhood size minus one.
fn max_free_degree(adjacency: &Adjacency) -> usize {
    adjacency
        .iter()
        .map(|s| s.len().saturating_sub(1))
        .max()
        .unwrap_or(0)
}

fn edge_count(adjacency: &Adjacency) -> usize {
    adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
}
