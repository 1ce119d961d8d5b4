use crate::errors::SearchError;
use crate::graph::{Node, NodeId};

/// Outcome of one conditional-independence test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndependenceResult {
    pub independent: bool,
    pub p_value: f64,
}

impl IndependenceResult {
    pub fn independent(p_value: f64) -> Self {
        Self {
            independent: true,
            p_value,
        }
    }

    pub fn dependent(p_value: f64) -> Self {
        Self {
            independent: false,
            p_value,
        }
    }
}

/// A failed test. Searches treat the tested pair as dependent and carry on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("independence test failed: {0}")]
    Failed(String),

    #[error("independence test timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("unknown variable index {0}")]
    UnknownVariable(NodeId),
}

/// Conditional-independence oracle.
///
/// Node ids index [`IndependenceTest::variables`], which is also the node
/// order of every graph a search builds from this oracle. Implementations
/// are called from many threads at once.
pub trait IndependenceTest: Send + Sync {
    fn variables(&self) -> &[Node];

    /// Is `x` independent of `y` given `z`?
    fn check_independence(
        &self,
        x: NodeId,
        y: NodeId,
        z: &[NodeId],
    ) -> Result<IndependenceResult, OracleError>;

    /// Significance level, used only for reporting.
    fn alpha(&self) -> f64 {
        0.05
    }
}

/// Reject a conditioning set that contains one of the tested nodes.
pub fn validate_conditioning_set(x: NodeId, y: NodeId, z: &[NodeId]) -> Result<(), SearchError> {
    if x == y {
        return Err(SearchError::invalid(format!("cannot test node {x} against itself")));
    }
    if z.contains(&x) || z.contains(&y) {
        return Err(SearchError::invalid(format!(
            "conditioning set {z:?} contains a tested node ({x}, {y})"
        )));
    }
    Ok(())
}
