use serde::{Deserialize, Serialize};

/// Position of a node in its graph's insertion order.
pub type NodeId = usize;

/// Whether a variable is observed in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    #[default]
    Measured,
    Latent,
}

/// A variable. Immutable once added to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub node_type: NodeType,
}

impl Node {
    pub fn measured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: NodeType::Measured,
        }
    }

    pub fn latent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: NodeType::Latent,
        }
    }

    pub fn is_latent(&self) -> bool {
        self.node_type == NodeType::Latent
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
