use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use causeway_core::cancel::CancellationToken;
use causeway_core::graph::{Graph, Node, NodeId};
use causeway_core::traits::{IndependenceResult, IndependenceTest, OracleError};

/// Exact oracle: d-separation in a known DAG. Latent nodes of the DAG are
/// hidden from [`IndependenceTest::variables`].
///
/// Independent answers carry p = 1.0, dependent ones p = 0.0.
#[derive(Debug)]
pub struct DSeparationOracle {
    dag: Graph,
    variables: Vec<Node>,
    /// Oracle id -> DAG id.
    to_dag: Vec<NodeId>,
    calls: AtomicUsize,
}

impl DSeparationOracle {
    pub fn new(dag: &Graph) -> Self {
        let to_dag: Vec<NodeId> = dag
            .node_ids()
            .filter(|&id| dag.node(id).is_some_and(|n| !n.is_latent()))
            .collect();
        let variables = to_dag.iter().map(|&id| dag.nodes()[id].clone()).collect();
        Self {
            dag: dag.clone(),
            variables,
            to_dag,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Whether `x` and `y` are d-separated by `z`, all as DAG ids.
    pub fn d_separated(&self, x: NodeId, y: NodeId, z: &[NodeId]) -> bool {
        !self.reachable(x, z).contains(&y)
    }

    /// Nodes reachable from `source` along active trails given `z`.
    fn reachable(&self, source: NodeId, z: &[NodeId]) -> HashSet<NodeId> {
        let z: HashSet<NodeId> = z.iter().copied().collect();

        // Ancestors of the conditioning set, including itself.
        let mut ancestors: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<NodeId> = z.iter().copied().collect();
        while let Some(n) = stack.pop() {
            if ancestors.insert(n) {
                stack.extend(self.dag.parents(n));
            }
        }

        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        enum Dir {
            /// Arrived from a child.
            Up,
            /// Arrived from a parent.
            Down,
        }

        let mut visited: HashSet<(NodeId, Dir)> = HashSet::new();
        let mut reachable = HashSet::new();
        let mut queue = VecDeque::from([(source, Dir::Up)]);

        while let Some((n, dir)) = queue.pop_front() {
            if !visited.insert((n, dir)) {
                continue;
            }
            let observed = z.contains(&n);
            if !observed {
                reachable.insert(n);
            }
            match dir {
                Dir::Up if !observed => {
                    queue.extend(self.dag.parents(n).into_iter().map(|p| (p, Dir::Up)));
                    queue.extend(self.dag.children(n).into_iter().map(|c| (c, Dir::Down)));
                }
                Dir::Up => {}
                Dir::Down => {
                    if !observed {
                        queue.extend(self.dag.children(n).into_iter().map(|c| (c, Dir::Down)));
                    }
                    if ancestors.contains(&n) {
                        queue.extend(self.dag.parents(n).into_iter().map(|p| (p, Dir::Up)));
                    }
                }
            }
        }
        reachable
    }

    fn dag_id(&self, id: NodeId) -> Result<NodeId, OracleError> {
        self.to_dag
            .get(id)
            .copied()
            .ok_or(OracleError::UnknownVariable(id))
    }
}

impl IndependenceTest for DSeparationOracle {
    fn variables(&self) -> &[Node] {
        &self.variables
    }

    fn check_independence(
        &self,
        x: NodeId,
        y: NodeId,
        z: &[NodeId],
    ) -> Result<IndependenceResult, OracleError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let x = self.dag_id(x)?;
        let y = self.dag_id(y)?;
        let z = z
            .iter()
            .map(|&n| self.dag_id(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(if self.d_separated(x, y, &z) {
            IndependenceResult::independent(1.0)
        } else {
            IndependenceResult::dependent(0.0)
        })
    }
}

/// Oracle answering from a fixed table; anything not listed is dependent
/// with p = 0.0.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    variables: Vec<Node>,
    answers: HashMap<(NodeId, NodeId, BTreeSet<NodeId>), IndependenceResult>,
}

impl ScriptedOracle {
    pub fn new(names: &[&str]) -> Self {
        Self {
            variables: names.iter().map(|n| Node::measured(*n)).collect(),
            answers: HashMap::new(),
        }
    }

    fn id(&self, name: &str) -> NodeId {
        self.variables
            .iter()
            .position(|n| n.name == name)
            .unwrap_or_else(|| panic!("unknown variable {name}"))
    }

    fn key(&self, x: &str, y: &str, z: &[&str]) -> (NodeId, NodeId, BTreeSet<NodeId>) {
        let (a, b) = (self.id(x), self.id(y));
        let set = z.iter().map(|n| self.id(n)).collect();
        (a.min(b), a.max(b), set)
    }

    /// `x` independent of `y` given `z`, with p-value `p`.
    pub fn independent(mut self, x: &str, y: &str, z: &[&str], p: f64) -> Self {
        let key = self.key(x, y, z);
        self.answers.insert(key, IndependenceResult::independent(p));
        self
    }

    /// Dependent with an explicit p-value (only matters for p-value heuristics).
    pub fn dependent(mut self, x: &str, y: &str, z: &[&str], p: f64) -> Self {
        let key = self.key(x, y, z);
        self.answers.insert(key, IndependenceResult::dependent(p));
        self
    }
}

impl IndependenceTest for ScriptedOracle {
    fn variables(&self) -> &[Node] {
        &self.variables
    }

    fn check_independence(
        &self,
        x: NodeId,
        y: NodeId,
        z: &[NodeId],
    ) -> Result<IndependenceResult, OracleError> {
        if x >= self.variables.len() {
            return Err(OracleError::UnknownVariable(x));
        }
        let key = (x.min(y), x.max(y), z.iter().copied().collect());
        Ok(self
            .answers
            .get(&key)
            .copied()
            .unwrap_or(IndependenceResult::dependent(0.0)))
    }
}

/// Wraps an oracle and fails every test of the listed pairs.
#[derive(Debug)]
pub struct FailingOracle<T> {
    inner: T,
    failing: HashSet<(NodeId, NodeId)>,
    fail_all: bool,
}

impl<T: IndependenceTest> FailingOracle<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            failing: HashSet::new(),
            fail_all: false,
        }
    }

    pub fn failing_pair(mut self, x: NodeId, y: NodeId) -> Self {
        self.failing.insert((x.min(y), x.max(y)));
        self
    }

    pub fn failing_everything(mut self) -> Self {
        self.fail_all = true;
        self
    }
}

impl<T: IndependenceTest> IndependenceTest for FailingOracle<T> {
    fn variables(&self) -> &[Node] {
        self.inner.variables()
    }

    fn check_independence(
        &self,
        x: NodeId,
        y: NodeId,
        z: &[NodeId],
    ) -> Result<IndependenceResult, OracleError> {
        if self.fail_all || self.failing.contains(&(x.min(y), x.max(y))) {
            return Err(OracleError::Failed(format!("scripted failure for ({x}, {y})")));
        }
        self.inner.check_independence(x, y, z)
    }
}

/// Wraps an oracle, counts calls, and optionally trips a cancellation token
/// once a call budget is used up.
#[derive(Debug)]
pub struct CountingOracle<T> {
    inner: T,
    calls: AtomicUsize,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl<T: IndependenceTest> CountingOracle<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<T: IndependenceTest> IndependenceTest for CountingOracle<T> {
    fn variables(&self) -> &[Node] {
        self.inner.variables()
    }

    fn check_independence(
        &self,
        x: NodeId,
        y: NodeId,
        z: &[NodeId],
    ) -> Result<IndependenceResult, OracleError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some((limit, token)) = &self.cancel_after {
            if n >= *limit {
                token.cancel();
            }
        }
        self.inner.check_independence(x, y, z)
    }
}
