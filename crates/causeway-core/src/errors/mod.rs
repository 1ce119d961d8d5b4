//! Error types. One enum per concern, all wrapped by [`CausewayError`].

mod config_error;
mod graph_error;
mod knowledge_error;
mod search_error;

pub use config_error::ConfigError;
pub use graph_error::GraphError;
pub use knowledge_error::KnowledgeError;
pub use search_error::SearchError;

/// Top-level error for every fallible Causeway operation.
#[derive(Debug, thiserror::Error)]
pub enum CausewayError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Oracle(#[from] crate::traits::OracleError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CausewayError {
    /// Whether this error is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Search(SearchError::Cancelled { .. }))
    }
}

/// Convenience alias used across the workspace.
pub type CausewayResult<T> = Result<T, CausewayError>;
