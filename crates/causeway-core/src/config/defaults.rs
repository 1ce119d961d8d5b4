// Single source of truth for all default values.

// --- FAS ---
pub const DEFAULT_DEPTH: i64 = -1;
pub const DEFAULT_STABLE: bool = true;
/// 0 = one worker per logical CPU.
pub const DEFAULT_PARALLELISM: usize = 0;

// --- Orientation ---
pub const DEFAULT_SEPSET_DEPTH: i64 = -1;
pub const DEFAULT_COMPLETE_RULE_SET: bool = true;
pub const DEFAULT_MAX_PATH_LENGTH: i64 = -1;
pub const DEFAULT_AGGRESSIVE_CYCLE_PREVENTION: bool = false;
pub const DEFAULT_MAX_P_MARGIN: f64 = 0.0;
