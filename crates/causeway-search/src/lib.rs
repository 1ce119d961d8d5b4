//! # causeway-search
//!
//! Constraint-based structure search over a pluggable independence oracle.
//!
//! [`fas::Fas`] prunes a complete graph to a skeleton and records the
//! separating sets it used. A [`causeway_core::traits::SepsetProducer`] from
//! [`sepsets`] turns those into collider decisions, and [`orient`] applies
//! colliders, background knowledge and the Meek or FCI rules. [`CausalSearch`]
//! runs the whole sequence from a [`causeway_core::CausewayConfig`].

pub mod fas;
pub mod orient;
pub mod pipeline;
pub mod sepsets;

pub(crate) mod pool;

pub use fas::{Fas, FasResult, FasStats};
pub use orient::{
    ArrowheadPolicy, ColliderOrienter, ColliderReport, FciOrient, FciReport, KnowledgeReport,
    MeekReport, MeekRule, MeekRules,
};
pub use pipeline::{CausalSearch, SearchOutcome};
pub use sepsets::{ConservativeSepsets, FasSepsets, MaxPMode, MaxPSepsets};
