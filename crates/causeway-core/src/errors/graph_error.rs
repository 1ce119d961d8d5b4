use crate::graph::Endpoint;

/// Graph model errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {name}")]
    NodeNotFound { name: String },

    #[error("node already exists: {name}")]
    DuplicateNode { name: String },

    #[error("self-loop on {name} is not allowed")]
    SelfLoop { name: String },

    #[error("edge already exists between {a} and {b}")]
    EdgeExists { a: String, b: String },

    #[error("{a} and {b} are not adjacent")]
    NotAdjacent { a: String, b: String },

    /// The requested mark would revert or flip an already committed endpoint.
    #[error("endpoint at {to} on edge {from} - {to} is {current:?}, refusing {requested:?}")]
    EndpointConflict {
        from: String,
        to: String,
        current: Endpoint,
        requested: Endpoint,
    },
}
