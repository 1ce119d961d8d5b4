/// Depth used when a caller asks for unbounded depth (`-1`).
pub const DEPTH_CAP: usize = 1000;

/// Shortest discriminating path, in nodes.
pub const MIN_DISCRIMINATING_PATH_LENGTH: i64 = 4;

/// Stage names reported to observers and spans.
pub mod stages {
    pub const FAS: &str = "fas";
    pub const COLLIDERS: &str = "colliders";
    pub const KNOWLEDGE: &str = "knowledge";
    pub const MEEK: &str = "meek";
    pub const FCI: &str = "fci";
}

/// Resolve a user-facing depth (`-1` = unbounded) to a concrete bound.
/// Other negative values are rejected by config validation before this is used.
pub fn resolve_depth(depth: i64) -> usize {
    if depth < 0 {
        DEPTH_CAP
    } else {
        usize::try_from(depth).unwrap_or(DEPTH_CAP).min(DEPTH_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_depth_is_capped() {
        assert_eq!(resolve_depth(-1), DEPTH_CAP);
        assert_eq!(resolve_depth(3), 3);
        assert_eq!(resolve_depth(5_000), DEPTH_CAP);
    }
}
