//! # causeway-core
//!
//! Foundation crate for the Causeway causal discovery engine.
//! Graph model, background knowledge, subset enumeration, sepset map,
//! oracle and sepset-producer traits, cancellation, observation, errors, config.

pub mod cancel;
pub mod combinatorics;
pub mod config;
pub mod constants;
pub mod errors;
pub mod graph;
pub mod knowledge;
pub mod observe;
pub mod sepset_map;
pub mod traits;

pub use cancel::CancellationToken;
pub use config::CausewayConfig;
pub use errors::{CausewayError, CausewayResult};
pub use graph::{Edge, Endpoint, Graph, GraphRecord, Node, NodeId, NodeType, Triple};
pub use knowledge::{Knowledge, KnowledgeEdge};
pub use observe::{NoopObserver, SearchObserver, TracingObserver};
pub use sepset_map::{NodePair, Sepset, SepsetMap};
pub use traits::{IndependenceResult, IndependenceTest, OracleError, SepsetDecision, SepsetProducer};
