pub mod defaults;
pub mod fas_config;
pub mod knowledge_config;
pub mod orientation_config;

use serde::{Deserialize, Serialize};

pub use fas_config::{FasConfig, PcHeuristic};
pub use knowledge_config::KnowledgeConfig;
pub use orientation_config::{ConflictRule, OrientationConfig, RuleSet, SepsetPolicy};

use crate::constants::MIN_DISCRIMINATING_PATH_LENGTH;
use crate::errors::ConfigError;

/// Top-level configuration. Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CausewayConfig {
    pub fas: FasConfig,
    pub orientation: OrientationConfig,
    pub knowledge: KnowledgeConfig,
}

impl CausewayConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_depth("fas.depth", self.fas.depth)?;
        check_depth("orientation.sepset_depth", self.orientation.sepset_depth)?;

        let len = self.orientation.max_path_length;
        if len != -1 && len < MIN_DISCRIMINATING_PATH_LENGTH {
            return Err(invalid(
                "orientation.max_path_length",
                format!("must be -1 or at least {MIN_DISCRIMINATING_PATH_LENGTH}, got {len}"),
            ));
        }

        let margin = self.orientation.max_p_margin;
        if !margin.is_finite() || margin < 0.0 {
            return Err(invalid(
                "orientation.max_p_margin",
                format!("must be a non-negative number, got {margin}"),
            ));
        }
        Ok(())
    }
}

fn check_depth(field: &str, depth: i64) -> Result<(), ConfigError> {
    if depth < -1 {
        Err(invalid(field, format!("must be -1 or non-negative, got {depth}")))
    } else {
        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason,
    }
}
