use serde::{Deserialize, Serialize};

use super::NodeId;

/// `x - y - z` with `y` in the middle. Stored with `x <= z` so both
/// readings of the same triple compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub x: NodeId,
    pub y: NodeId,
    pub z: NodeId,
}

impl Triple {
    pub fn new(x: NodeId, y: NodeId, z: NodeId) -> Self {
        if x <= z {
            Self { x, y, z }
        } else {
            Self { x: z, y, z: x }
        }
    }

    pub fn involves(&self, node: NodeId) -> bool {
        self.x == node || self.y == node || self.z == node
    }

    /// Whether `a - b` is one of the triple's two edges.
    pub fn uses_edge(&self, a: NodeId, b: NodeId) -> bool {
        (a == self.y && (b == self.x || b == self.z)) || (b == self.y && (a == self.x || a == self.z))
    }
}

/// Classification of an unshielded triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripleKind {
    Collider,
    Noncollider,
    Ambiguous,
}
