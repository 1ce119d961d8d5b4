use serde::{Deserialize, Serialize};

/// Mark at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tail => "tail",
            Self::Arrow => "arrow",
            Self::Circle => "circle",
        }
    }

    /// Whether a mark may move from `self` to `next` without an explicit overwrite.
    ///
    /// Circles resolve to anything. A tail may become an arrow only while the
    /// other end of the edge is also a tail (orienting an undirected edge).
    pub fn can_escalate_to(self, next: Endpoint, opposite: Endpoint) -> bool {
        match (self, next) {
            (a, b) if a == b => true,
            (Self::Circle, _) => true,
            (Self::Tail, Self::Arrow) => opposite == Self::Tail,
            _ => false,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
