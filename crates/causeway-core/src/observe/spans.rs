//! Span definitions, one per search stage.

/// Create a FAS span.
#[macro_export]
macro_rules! fas_span {
    ($variables:expr, $depth:expr, $stable:expr) => {
        tracing::info_span!("causeway.fas", variables = $variables, depth = $depth, stable = $stable)
    };
}

/// Create a collider-orientation span.
#[macro_export]
macro_rules! collider_span {
    ($policy:expr, $conflict_rule:expr) => {
        tracing::info_span!("causeway.colliders", policy = %$policy, conflict_rule = ?$conflict_rule)
    };
}

/// Create a rule-propagation span.
#[macro_export]
macro_rules! orientation_span {
    ($rule_set:expr) => {
        tracing::info_span!("causeway.orient", rule_set = %$rule_set)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const FAS: &str = "causeway.fas";
    pub const COLLIDERS: &str = "causeway.colliders";
    pub const ORIENT: &str = "causeway.orient";
}
