/// Background knowledge errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KnowledgeError {
    #[error("a knowledge edge needs two distinct variables, got {name} twice")]
    SameVariable { name: String },

    #[error("conflicting knowledge for {from} --> {to}: {reason}")]
    Conflict {
        from: String,
        to: String,
        reason: String,
    },

    #[error("tier {tier} cannot be forbidden within: required edge {from} --> {to} lies inside it")]
    TierConflict { tier: usize, from: String, to: String },
}
