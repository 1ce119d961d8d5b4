use serde::{Deserialize, Serialize};

use super::Endpoint;

/// An edge between two named nodes. `endpoint1` is the mark at `node1`,
/// `endpoint2` the mark at `node2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub node1: String,
    pub node2: String,
    pub endpoint1: Endpoint,
    pub endpoint2: Endpoint,
}

impl Edge {
    pub fn new(
        node1: impl Into<String>,
        node2: impl Into<String>,
        endpoint1: Endpoint,
        endpoint2: Endpoint,
    ) -> Self {
        Self {
            node1: node1.into(),
            node2: node2.into(),
            endpoint1,
            endpoint2,
        }
    }

    /// `node1 --> node2`.
    pub fn directed(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, Endpoint::Tail, Endpoint::Arrow)
    }

    pub fn undirected(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(a, b, Endpoint::Tail, Endpoint::Tail)
    }

    pub fn nondirected(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::new(a, b, Endpoint::Circle, Endpoint::Circle)
    }

    pub fn is_directed(&self) -> bool {
        matches!(
            (self.endpoint1, self.endpoint2),
            (Endpoint::Tail, Endpoint::Arrow) | (Endpoint::Arrow, Endpoint::Tail)
        )
    }

    pub fn is_undirected(&self) -> bool {
        matches!(
            (self.endpoint1, self.endpoint2),
            (Endpoint::Tail, Endpoint::Tail) | (Endpoint::Circle, Endpoint::Circle)
        )
    }

    pub fn is_bidirected(&self) -> bool {
        self.endpoint1 == Endpoint::Arrow && self.endpoint2 == Endpoint::Arrow
    }

    /// Same edge seen from the other side.
    pub fn reversed(&self) -> Self {
        Self::new(
            self.node2.clone(),
            self.node1.clone(),
            self.endpoint2,
            self.endpoint1,
        )
    }

    /// Orientation-insensitive equality.
    pub fn same_as(&self, other: &Edge) -> bool {
        self == other || *self == other.reversed()
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let left = match self.endpoint1 {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '<',
            Endpoint::Circle => 'o',
        };
        let right = match self.endpoint2 {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '>',
            Endpoint::Circle => 'o',
        };
        write!(f, "{} {}-{} {}", self.node1, left, right, self.node2)
    }
}
