use serde::{Deserialize, Serialize};

use crate::errors::KnowledgeError;
use crate::knowledge::{Knowledge, KnowledgeEdge};

/// Knowledge as written in a config file. Tier `i` is `tiers[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub tiers: Vec<Vec<String>>,
    pub forbidden_within_tiers: Vec<usize>,
    pub forbidden: Vec<KnowledgeEdge>,
    pub required: Vec<KnowledgeEdge>,
}

impl TryFrom<&KnowledgeConfig> for Knowledge {
    type Error = KnowledgeError;

    fn try_from(config: &KnowledgeConfig) -> Result<Self, Self::Error> {
        let mut knowledge = Knowledge::new();
        for edge in &config.required {
            knowledge.set_required(&edge.from, &edge.to)?;
        }
        for edge in &config.forbidden {
            knowledge.set_forbidden(&edge.from, &edge.to)?;
        }
        for (tier, names) in config.tiers.iter().enumerate() {
            for name in names {
                knowledge.add_to_tier(tier, name)?;
            }
        }
        for &tier in &config.forbidden_within_tiers {
            knowledge.set_tier_forbidden_within(tier, true)?;
        }
        Ok(knowledge)
    }
}
