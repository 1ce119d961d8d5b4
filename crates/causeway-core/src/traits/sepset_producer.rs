use crate::graph::{Graph, NodeId};

/// Three-valued answer about the middle node of an unshielded triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SepsetDecision {
    /// A separating set was found and it excludes the middle node.
    Independent(Vec<NodeId>),
    /// A separating set was found and it includes the middle node.
    Dependent(Vec<NodeId>),
    /// No separating set, or the candidate sets disagree.
    NoDecision,
}

impl SepsetDecision {
    pub fn from_sepset(sepset: Option<Vec<NodeId>>, middle: NodeId) -> Self {
        match sepset {
            Some(s) if s.contains(&middle) => Self::Dependent(s),
            Some(s) => Self::Independent(s),
            None => Self::NoDecision,
        }
    }

    pub fn is_collider(&self) -> bool {
        matches!(self, Self::Independent(_))
    }
}

/// Source of separating sets for collider orientation and discriminating paths.
pub trait SepsetProducer: Send + Sync {
    /// Short policy name for logs.
    fn name(&self) -> &'static str;

    /// A set separating `x` and `y`, if one is known. `graph` is the current,
    /// possibly partly oriented, graph.
    fn sepset(&self, graph: &Graph, x: NodeId, y: NodeId) -> Option<Vec<NodeId>>;

    /// Decide the triple `x - middle - y`.
    fn decide(&self, graph: &Graph, x: NodeId, middle: NodeId, y: NodeId) -> SepsetDecision {
        SepsetDecision::from_sepset(self.sepset(graph, x, y), middle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_from_sepset() {
        assert_eq!(SepsetDecision::from_sepset(None, 1), SepsetDecision::NoDecision);
        assert_eq!(
            SepsetDecision::from_sepset(Some(vec![]), 1),
            SepsetDecision::Independent(vec![])
        );
        assert_eq!(
            SepsetDecision::from_sepset(Some(vec![1, 3]), 1),
            SepsetDecision::Dependent(vec![1, 3])
        );
    }
}
