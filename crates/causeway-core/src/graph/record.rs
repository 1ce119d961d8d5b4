//! Name-based, serializable form of a [`Graph`](super::Graph).

use serde::{Deserialize, Serialize};

use super::{Edge, Node};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripleRecord {
    pub x: String,
    pub y: String,
    pub z: String,
}

/// Nodes, edges with endpoints, and triple annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub ambiguous_triples: Vec<TripleRecord>,
    #[serde(default)]
    pub underline_triples: Vec<TripleRecord>,
}

impl GraphRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
