//! Background knowledge: forbidden and required directed edges, by variable
//! name, plus temporal tiers.
//!
//! A variable in a later tier may not cause one in an earlier tier. Within a
//! tier marked forbidden-within, no direction is allowed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::KnowledgeError;
use crate::graph::Graph;

/// A directed constraint `from --> to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KnowledgeEdge {
    pub from: String,
    pub to: String,
}

impl KnowledgeEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl std::fmt::Display for KnowledgeEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} --> {}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knowledge {
    forbidden: BTreeSet<KnowledgeEdge>,
    required: BTreeSet<KnowledgeEdge>,
    tiers: BTreeMap<usize, BTreeSet<String>>,
    forbidden_within: BTreeSet<usize>,
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no constraint of any kind has been added.
    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty()
            && self.required.is_empty()
            && self.tiers.values().all(BTreeSet::is_empty)
    }

    // --- Explicit edges ---

    pub fn set_forbidden(&mut self, from: &str, to: &str) -> Result<(), KnowledgeError> {
        check_distinct(from, to)?;
        if self.is_required(from, to) {
            return Err(KnowledgeError::Conflict {
                from: from.to_string(),
                to: to.to_string(),
                reason: "edge is already required".to_string(),
            });
        }
        self.forbidden.insert(KnowledgeEdge::new(from, to));
        Ok(())
    }

    pub fn set_required(&mut self, from: &str, to: &str) -> Result<(), KnowledgeError> {
        check_distinct(from, to)?;
        if self.forbidden.contains(&KnowledgeEdge::new(from, to)) {
            return Err(KnowledgeError::Conflict {
                from: from.to_string(),
                to: to.to_string(),
                reason: "edge is explicitly forbidden".to_string(),
            });
        }
        if self.is_forbidden_by_tiers(from, to) {
            return Err(KnowledgeError::Conflict {
                from: from.to_string(),
                to: to.to_string(),
                reason: "edge is forbidden by tiers".to_string(),
            });
        }
        self.required.insert(KnowledgeEdge::new(from, to));
        Ok(())
    }

    pub fn remove_forbidden(&mut self, from: &str, to: &str) -> bool {
        self.forbidden.remove(&KnowledgeEdge::new(from, to))
    }

    pub fn remove_required(&mut self, from: &str, to: &str) -> bool {
        self.required.remove(&KnowledgeEdge::new(from, to))
    }

    // --- Tiers ---

    /// Place `name` in `tier`, moving it out of any tier it was in.
    pub fn add_to_tier(&mut self, tier: usize, name: &str) -> Result<(), KnowledgeError> {
        let previous = self.tier_of(name);
        for members in self.tiers.values_mut() {
            members.remove(name);
        }
        self.tiers.entry(tier).or_default().insert(name.to_string());

        if let Some(edge) = self.required_forbidden_by_tiers() {
            self.tiers.entry(tier).or_default().remove(name);
            if let Some(p) = previous {
                self.tiers.entry(p).or_default().insert(name.to_string());
            }
            return Err(KnowledgeError::Conflict {
                from: edge.from,
                to: edge.to,
                reason: format!("placing {name} in tier {tier} forbids a required edge"),
            });
        }
        Ok(())
    }

    pub fn set_tier_forbidden_within(
        &mut self,
        tier: usize,
        forbidden: bool,
    ) -> Result<(), KnowledgeError> {
        if !forbidden {
            self.forbidden_within.remove(&tier);
            return Ok(());
        }
        let members = self.tiers.get(&tier).cloned().unwrap_or_default();
        if let Some(edge) = self
            .required
            .iter()
            .find(|e| members.contains(&e.from) && members.contains(&e.to))
        {
            return Err(KnowledgeError::TierConflict {
                tier,
                from: edge.from.clone(),
                to: edge.to.clone(),
            });
        }
        self.forbidden_within.insert(tier);
        Ok(())
    }

    pub fn tier_of(&self, name: &str) -> Option<usize> {
        self.tiers
            .iter()
            .find(|(_, members)| members.contains(name))
            .map(|(&tier, _)| tier)
    }

    pub fn tier(&self, tier: usize) -> Vec<&str> {
        self.tiers
            .get(&tier)
            .map(|m| m.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_tier_forbidden_within(&self, tier: usize) -> bool {
        self.forbidden_within.contains(&tier)
    }

    fn required_forbidden_by_tiers(&self) -> Option<KnowledgeEdge> {
        self.required
            .iter()
            .find(|e| self.is_forbidden_by_tiers(&e.from, &e.to))
            .cloned()
    }

    // --- Queries ---

    pub fn is_forbidden_by_tiers(&self, from: &str, to: &str) -> bool {
        match (self.tier_of(from), self.tier_of(to)) {
            (Some(a), Some(b)) => a > b || (a == b && self.forbidden_within.contains(&a)),
            _ => false,
        }
    }

    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        self.forbidden.contains(&KnowledgeEdge::new(from, to)) || self.is_forbidden_by_tiers(from, to)
    }

    pub fn is_required(&self, from: &str, to: &str) -> bool {
        self.required.contains(&KnowledgeEdge::new(from, to))
    }

    /// Neither direction between `a` and `b` is required.
    pub fn no_edge_required(&self, a: &str, b: &str) -> bool {
        !(self.is_required(a, b) || self.is_required(b, a))
    }

    /// Explicit forbidden edges followed by every tier-derived one among
    /// tiered variables, deduplicated and sorted.
    pub fn forbidden_edges(&self) -> Vec<KnowledgeEdge> {
        let mut edges = self.forbidden.clone();
        let tiered: Vec<&String> = self.tiers.values().flatten().collect();
        for from in &tiered {
            for to in &tiered {
                if from != to && self.is_forbidden_by_tiers(from, to) {
                    edges.insert(KnowledgeEdge::new(from.as_str(), to.as_str()));
                }
            }
        }
        edges.into_iter().collect()
    }

    pub fn explicitly_forbidden_edges(&self) -> impl Iterator<Item = &KnowledgeEdge> {
        self.forbidden.iter()
    }

    pub fn required_edges(&self) -> impl Iterator<Item = &KnowledgeEdge> {
        self.required.iter()
    }

    /// Constraints that `graph` contradicts: a forbidden edge present as a
    /// directed edge, or a required edge between present nodes that is not
    /// directed that way.
    pub fn violations(&self, graph: &Graph) -> Vec<KnowledgeEdge> {
        let mut out = Vec::new();
        for (from, to) in graph.directed_edges() {
            if self.is_forbidden(graph.name(from), graph.name(to)) {
                out.push(KnowledgeEdge::new(graph.name(from), graph.name(to)));
            }
        }
        for edge in &self.required {
            if let (Some(from), Some(to)) = (graph.node_id(&edge.from), graph.node_id(&edge.to)) {
                if !graph.is_directed_from_to(from, to) {
                    out.push(edge.clone());
                }
            }
        }
        out
    }

    pub fn is_violated_by(&self, graph: &Graph) -> bool {
        !self.violations(graph).is_empty()
    }
}

fn check_distinct(from: &str, to: &str) -> Result<(), KnowledgeError> {
    if from == to {
        Err(KnowledgeError::SameVariable {
            name: from.to_string(),
        })
    } else {
        Ok(())
    }
}
