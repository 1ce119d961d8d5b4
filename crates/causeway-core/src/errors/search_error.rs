/// Search lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The caller cancelled the search or its deadline passed.
    #[error("search aborted during {stage} (depth {depth})")]
    Cancelled { stage: String, depth: usize },

    /// Programmer error detected before any work started.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl SearchError {
    pub fn cancelled(stage: &str, depth: usize) -> Self {
        Self::Cancelled {
            stage: stage.to_string(),
            depth,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
