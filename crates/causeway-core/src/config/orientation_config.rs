use serde::{Deserialize, Serialize};

use super::defaults;

/// Which closure runs after collider orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    /// Meek R1-R4, producing a CPDAG.
    #[default]
    Meek,
    /// FCI R0-R10, producing a PAG.
    Fci,
}

impl RuleSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meek => "meek",
            Self::Fci => "fci",
        }
    }
}

impl std::fmt::Display for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where collider orientation gets its separating sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SepsetPolicy {
    #[default]
    Fas,
    Greedy,
    MaxP,
    Conservative,
}

/// What to do when a collider arrowhead meets an existing mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictRule {
    /// Skip the collider if either edge already has an arrowhead at the far node.
    #[default]
    Priority,
    /// Allow a double arrow instead of refusing.
    Bidirected,
    /// Replace prior marks.
    Overwrite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    pub rule_set: RuleSet,
    pub sepset_policy: SepsetPolicy,
    /// Depth bound for re-searching producers, `-1` for unbounded.
    pub sepset_depth: i64,
    pub conflict_rule: ConflictRule,
    /// FCI only: apply R5-R10.
    pub complete_rule_set: bool,
    /// FCI discriminating paths, in nodes. `-1` or at least 4.
    pub max_path_length: i64,
    /// Reject orientations that would close a directed cycle.
    pub aggressive_cycle_prevention: bool,
    /// MaxP ties within this margin yield no decision.
    pub max_p_margin: f64,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            rule_set: RuleSet::default(),
            sepset_policy: SepsetPolicy::default(),
            sepset_depth: defaults::DEFAULT_SEPSET_DEPTH,
            conflict_rule: ConflictRule::default(),
            complete_rule_set: defaults::DEFAULT_COMPLETE_RULE_SET,
            max_path_length: defaults::DEFAULT_MAX_PATH_LENGTH,
            aggressive_cycle_prevention: defaults::DEFAULT_AGGRESSIVE_CYCLE_PREVENTION,
            max_p_margin: defaults::DEFAULT_MAX_P_MARGIN,
        }
    }
}
