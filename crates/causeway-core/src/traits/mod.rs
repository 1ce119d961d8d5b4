//! Seams to external collaborators.

pub mod independence;
pub mod sepset_producer;

pub use independence::{validate_conditioning_set, IndependenceResult, IndependenceTest, OracleError};
pub use sepset_producer::{SepsetDecision, SepsetProducer};
