//! Mutable graph with per-end edge marks and triple annotations.
//!
//! Nodes live in an insertion-ordered arena and are addressed by [`NodeId`].
//! Each unordered pair holds at most one edge. Endpoint writes go through
//! [`Graph::set_endpoint`], which only allows monotone escalation; anything
//! else must be an explicit [`Graph::force_endpoint`].

mod edge;
mod endpoint;
mod node;
mod record;
mod triple;

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use edge::Edge;
pub use endpoint::Endpoint;
pub use node::{Node, NodeId, NodeType};
pub use record::{GraphRecord, TripleRecord};
pub use triple::{Triple, TripleKind};

use crate::errors::GraphError;

/// Marks of one edge, keyed so that `marks[0]` sits at the lower node id.
type Marks = [Endpoint; 2];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    adjacency: Vec<BTreeSet<NodeId>>,
    edges: BTreeMap<(NodeId, NodeId), Marks>,
    ambiguous: BTreeSet<Triple>,
    underlines: BTreeSet<Triple>,
}

fn key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        Ok(graph)
    }

    /// Measured nodes with the given names, no edges.
    pub fn from_names<I, S>(names: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_nodes(names.into_iter().map(Node::measured))
    }

    /// Fully connected undirected graph over `nodes`.
    pub fn complete(nodes: impl IntoIterator<Item = Node>) -> Result<Self, GraphError> {
        let mut graph = Self::from_nodes(nodes)?;
        let n = graph.node_count();
        for a in 0..n {
            for b in (a + 1)..n {
                graph.insert_edge(a, b, Endpoint::Tail, Endpoint::Tail);
            }
        }
        Ok(graph)
    }

    /// Same nodes, no edges, no annotations.
    pub fn empty_like(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            index: self.index.clone(),
            adjacency: vec![BTreeSet::new(); self.nodes.len()],
            ..Self::default()
        }
    }

    // --- Nodes ---

    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.index.contains_key(&node.name) {
            return Err(GraphError::DuplicateNode { name: node.name });
        }
        let id = self.nodes.len();
        self.index.insert(node.name.clone(), id);
        self.nodes.push(node);
        self.adjacency.push(BTreeSet::new());
        Ok(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Name of `id`. Ids come from this graph, so an unknown id is a caller bug.
    pub fn name(&self, id: NodeId) -> &str {
        self.nodes.get(id).map(|n| n.name.as_str()).unwrap_or("?")
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn require_id(&self, name: &str) -> Result<NodeId, GraphError> {
        self.node_id(name).ok_or_else(|| GraphError::NodeNotFound {
            name: name.to_string(),
        })
    }

    pub fn node_ids(&self) -> std::ops::Range<NodeId> {
        0..self.nodes.len()
    }

    fn check_node(&self, id: NodeId) -> Result<(), GraphError> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::NodeNotFound {
                name: format!("#{id}"),
            })
        }
    }

    // --- Edges ---

    fn insert_edge(&mut self, a: NodeId, b: NodeId, at_a: Endpoint, at_b: Endpoint) {
        let marks = if a <= b { [at_a, at_b] } else { [at_b, at_a] };
        self.edges.insert(key(a, b), marks);
        self.adjacency[a].insert(b);
        self.adjacency[b].insert(a);
    }

    /// Add an edge with mark `at_a` at `a` and `at_b` at `b`.
    pub fn add_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        at_a: Endpoint,
        at_b: Endpoint,
    ) -> Result<(), GraphError> {
        self.check_node(a)?;
        self.check_node(b)?;
        if a == b {
            return Err(GraphError::SelfLoop {
                name: self.name(a).to_string(),
            });
        }
        if self.is_adjacent(a, b) {
            return Err(GraphError::EdgeExists {
                a: self.name(a).to_string(),
                b: self.name(b).to_string(),
            });
        }
        self.insert_edge(a, b, at_a, at_b);
        Ok(())
    }

    /// `a --- b`
    pub fn add_undirected_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        self.add_edge(a, b, Endpoint::Tail, Endpoint::Tail)
    }

    /// `a o-o b`
    pub fn add_nondirected_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        self.add_edge(a, b, Endpoint::Circle, Endpoint::Circle)
    }

    /// `from --> to`
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.add_edge(from, to, Endpoint::Tail, Endpoint::Arrow)
    }

    /// `a <-> b`
    pub fn add_bidirected_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        self.add_edge(a, b, Endpoint::Arrow, Endpoint::Arrow)
    }

    /// Remove the edge between `a` and `b`, if any, along with every triple
    /// annotation that used it. Returns whether an edge was removed.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if self.edges.remove(&key(a, b)).is_none() {
            return false;
        }
        self.adjacency[a].remove(&b);
        self.adjacency[b].remove(&a);
        self.ambiguous.retain(|t| !t.uses_edge(a, b));
        self.underlines.retain(|t| !t.uses_edge(a, b));
        true
    }

    pub fn is_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.contains_key(&key(a, b))
    }

    /// Neighbours of `node` in ascending id order.
    pub fn adjacent_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.neighbors(node).collect()
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(node).map_or(0, BTreeSet::len)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Adjacent pairs `(a, b)` with `a < b`, in ascending order.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.keys().copied()
    }

    /// The edge between `a` and `b`, read from `a`'s side.
    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<Edge> {
        let at_a = self.endpoint(b, a)?;
        let at_b = self.endpoint(a, b)?;
        Some(Edge::new(self.name(a), self.name(b), at_a, at_b))
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|(&(a, b), marks)| Edge::new(self.name(a), self.name(b), marks[0], marks[1]))
            .collect()
    }

    /// Mark at `b` on the edge `a - b`.
    pub fn endpoint(&self, a: NodeId, b: NodeId) -> Option<Endpoint> {
        let marks = self.edges.get(&key(a, b))?;
        Some(if b < a { marks[0] } else { marks[1] })
    }

    fn mark_mut(&mut self, a: NodeId, b: NodeId) -> Option<&mut Endpoint> {
        let marks = self.edges.get_mut(&key(a, b))?;
        Some(if b < a { &mut marks[0] } else { &mut marks[1] })
    }

    fn not_adjacent(&self, a: NodeId, b: NodeId) -> GraphError {
        GraphError::NotAdjacent {
            a: self.name(a).to_string(),
            b: self.name(b).to_string(),
        }
    }

    /// Set the mark at `b` on `a - b`, allowing only monotone escalation.
    ///
    /// Returns `Ok(true)` if the mark changed and `Ok(false)` if it already
    /// had the requested value.
    pub fn set_endpoint(
        &mut self,
        a: NodeId,
        b: NodeId,
        requested: Endpoint,
    ) -> Result<bool, GraphError> {
        let current = self.endpoint(a, b).ok_or_else(|| self.not_adjacent(a, b))?;
        if current == requested {
            return Ok(false);
        }
        let opposite = self.endpoint(b, a).unwrap_or(Endpoint::Circle);
        if !current.can_escalate_to(requested, opposite) {
            return Err(GraphError::EndpointConflict {
                from: self.name(a).to_string(),
                to: self.name(b).to_string(),
                current,
                requested,
            });
        }
        if let Some(mark) = self.mark_mut(a, b) {
            *mark = requested;
        }
        Ok(true)
    }

    /// Overwrite the mark at `b` on `a - b` regardless of its current value.
    /// Reserved for explicit overwrite policies and full re-orientation.
    pub fn force_endpoint(
        &mut self,
        a: NodeId,
        b: NodeId,
        requested: Endpoint,
    ) -> Result<bool, GraphError> {
        let not_adjacent = self.not_adjacent(a, b);
        let mark = self.mark_mut(a, b).ok_or(not_adjacent)?;
        let changed = *mark != requested;
        *mark = requested;
        Ok(changed)
    }

    /// Orient `from --> to`: arrow at `to`, tail kept at `from`.
    /// Both marks are checked before either is written.
    pub fn orient(&mut self, from: NodeId, to: NodeId) -> Result<bool, GraphError> {
        let at_from = self.endpoint(to, from).ok_or_else(|| self.not_adjacent(from, to))?;
        let at_to = self.endpoint(from, to).ok_or_else(|| self.not_adjacent(from, to))?;
        let tail_ok = at_from.can_escalate_to(Endpoint::Tail, at_to);
        let arrow_ok = at_to.can_escalate_to(Endpoint::Arrow, Endpoint::Tail);
        if !tail_ok || !arrow_ok {
            let (current, requested, a, b) = if tail_ok {
                (at_to, Endpoint::Arrow, from, to)
            } else {
                (at_from, Endpoint::Tail, to, from)
            };
            return Err(GraphError::EndpointConflict {
                from: self.name(a).to_string(),
                to: self.name(b).to_string(),
                current,
                requested,
            });
        }
        let tail = self.force_endpoint(to, from, Endpoint::Tail)?;
        let arrow = self.force_endpoint(from, to, Endpoint::Arrow)?;
        Ok(tail || arrow)
    }

    /// Set both marks of every edge to `endpoint`.
    pub fn reorient_all_with(&mut self, endpoint: Endpoint) {
        for marks in self.edges.values_mut() {
            *marks = [endpoint, endpoint];
        }
    }

    // --- Edge predicates ---

    pub fn is_directed_from_to(&self, from: NodeId, to: NodeId) -> bool {
        self.endpoint(from, to) == Some(Endpoint::Arrow)
            && self.endpoint(to, from) == Some(Endpoint::Tail)
    }

    pub fn is_parent_of(&self, parent: NodeId, child: NodeId) -> bool {
        self.is_directed_from_to(parent, child)
    }

    /// `a --- b`
    pub fn is_undirected(&self, a: NodeId, b: NodeId) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Tail) && self.endpoint(b, a) == Some(Endpoint::Tail)
    }

    /// `a o-o b`
    pub fn is_nondirected(&self, a: NodeId, b: NodeId) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Circle) && self.endpoint(b, a) == Some(Endpoint::Circle)
    }

    pub fn is_bidirected(&self, a: NodeId, b: NodeId) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Arrow) && self.endpoint(b, a) == Some(Endpoint::Arrow)
    }

    /// `a *-> b <-* c`
    pub fn is_def_collider(&self, a: NodeId, b: NodeId, c: NodeId) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Arrow) && self.endpoint(c, b) == Some(Endpoint::Arrow)
    }

    /// Neighbours `a` of `b` whose edge carries `mark` at `b`.
    pub fn nodes_into(&self, b: NodeId, mark: Endpoint) -> Vec<NodeId> {
        self.neighbors(b)
            .filter(|&a| self.endpoint(a, b) == Some(mark))
            .collect()
    }

    pub fn parents(&self, node: NodeId) -> Vec<NodeId> {
        self.neighbors(node)
            .filter(|&p| self.is_directed_from_to(p, node))
            .collect()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.neighbors(node)
            .filter(|&c| self.is_directed_from_to(node, c))
            .collect()
    }

    /// Directed edges as `(from, to)` pairs.
    pub fn directed_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.edges
            .iter()
            .filter_map(|(&(a, b), marks)| match marks {
                [Endpoint::Tail, Endpoint::Arrow] => Some((a, b)),
                [Endpoint::Arrow, Endpoint::Tail] => Some((b, a)),
                _ => None,
            })
            .collect()
    }

    // --- Triples ---

    pub fn add_ambiguous_triple(&mut self, x: NodeId, y: NodeId, z: NodeId) {
        self.ambiguous.insert(Triple::new(x, y, z));
    }

    pub fn remove_ambiguous_triple(&mut self, x: NodeId, y: NodeId, z: NodeId) -> bool {
        self.ambiguous.remove(&Triple::new(x, y, z))
    }

    pub fn is_ambiguous_triple(&self, x: NodeId, y: NodeId, z: NodeId) -> bool {
        self.ambiguous.contains(&Triple::new(x, y, z))
    }

    pub fn ambiguous_triples(&self) -> impl Iterator<Item = &Triple> {
        self.ambiguous.iter()
    }

    /// Record `x - y - z` as a definite noncollider.
    pub fn add_underline_triple(&mut self, x: NodeId, y: NodeId, z: NodeId) {
        self.underlines.insert(Triple::new(x, y, z));
    }

    pub fn remove_underline_triple(&mut self, x: NodeId, y: NodeId, z: NodeId) -> bool {
        self.underlines.remove(&Triple::new(x, y, z))
    }

    pub fn is_underline_triple(&self, x: NodeId, y: NodeId, z: NodeId) -> bool {
        self.underlines.contains(&Triple::new(x, y, z))
    }

    pub fn underline_triples(&self) -> impl Iterator<Item = &Triple> {
        self.underlines.iter()
    }

    /// Collider, noncollider or ambiguous, as far as the current marks and
    /// annotations say. `None` if the triple is not unshielded.
    pub fn triple_kind(&self, x: NodeId, y: NodeId, z: NodeId) -> Option<TripleKind> {
        if !self.is_adjacent(x, y) || !self.is_adjacent(y, z) || self.is_adjacent(x, z) {
            return None;
        }
        if self.is_ambiguous_triple(x, y, z) {
            Some(TripleKind::Ambiguous)
        } else if self.is_def_collider(x, y, z) {
            Some(TripleKind::Collider)
        } else {
            Some(TripleKind::Noncollider)
        }
    }

    // --- Serialization ---

    fn triple_record(&self, t: &Triple) -> TripleRecord {
        TripleRecord {
            x: self.name(t.x).to_string(),
            y: self.name(t.y).to_string(),
            z: self.name(t.z).to_string(),
        }
    }

    pub fn to_record(&self) -> GraphRecord {
        GraphRecord {
            nodes: self.nodes.clone(),
            edges: self.edges(),
            ambiguous_triples: self.ambiguous.iter().map(|t| self.triple_record(t)).collect(),
            underline_triples: self.underlines.iter().map(|t| self.triple_record(t)).collect(),
        }
    }

    pub fn from_record(record: &GraphRecord) -> Result<Self, GraphError> {
        let mut graph = Self::from_nodes(record.nodes.iter().cloned())?;
        for edge in &record.edges {
            let a = graph.require_id(&edge.node1)?;
            let b = graph.require_id(&edge.node2)?;
            graph.add_edge(a, b, edge.endpoint1, edge.endpoint2)?;
        }
        for t in &record.ambiguous_triples {
            let (x, y, z) = graph.triple_ids(t)?;
            graph.add_ambiguous_triple(x, y, z);
        }
        for t in &record.underline_triples {
            let (x, y, z) = graph.triple_ids(t)?;
            graph.add_underline_triple(x, y, z);
        }
        Ok(graph)
    }

    fn triple_ids(&self, t: &TripleRecord) -> Result<(NodeId, NodeId, NodeId), GraphError> {
        Ok((self.require_id(&t.x)?, self.require_id(&t.y)?, self.require_id(&t.z)?))
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Nodes: {}", self.nodes.iter().map(|n| n.name.as_str()).collect::<Vec<_>>().join(", "))?;
        for edge in self.edges() {
            writeln!(f, "{edge}")?;
        }
        Ok(())
    }
}
