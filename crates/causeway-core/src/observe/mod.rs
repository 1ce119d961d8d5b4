//! Injected observation of search progress.
//!
//! Components hold an `Arc<dyn SearchObserver>` and report through it instead
//! of printing. [`NoopObserver`] is the default; [`TracingObserver`] turns each
//! callback into a structured `tracing` event.

pub mod events;
pub mod setup;
pub mod spans;

use std::time::Duration;

use crate::graph::Endpoint;
use crate::traits::OracleError;

pub use setup::{init_tracing, init_tracing_with_filter};

/// Callbacks fired by the searches. Every method defaults to doing nothing.
///
/// Node arguments are names so that observers need no access to the graph.
pub trait SearchObserver: Send + Sync {
    fn stage_started(&self, _stage: &str, _variables: usize) {}

    fn stage_finished(&self, _stage: &str, _elapsed: Duration) {}

    fn depth_started(&self, _depth: usize, _edges: usize) {}

    fn depth_finished(&self, _depth: usize, _edges: usize, _removed: usize) {}

    fn edge_removed(&self, _x: &str, _y: &str, _sepset: &[&str], _depth: usize) {}

    fn oracle_failed(&self, _x: &str, _y: &str, _error: &OracleError) {}

    fn collider_oriented(&self, _a: &str, _b: &str, _c: &str) {}

    fn noncollider_recorded(&self, _a: &str, _b: &str, _c: &str) {}

    fn triple_ambiguous(&self, _a: &str, _b: &str, _c: &str) {}

    fn edge_oriented(&self, _rule: &str, _from: &str, _to: &str, _mark: Endpoint) {}

    fn orientation_rejected(&self, _rule: &str, _from: &str, _to: &str, _reason: &str) {}

    fn cancelled(&self, _stage: &str, _depth: usize) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Forwards every callback to [`events`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn stage_started(&self, stage: &str, variables: usize) {
        events::stage_started(stage, variables);
    }

    fn stage_finished(&self, stage: &str, elapsed: Duration) {
        events::stage_finished(stage, elapsed);
    }

    fn depth_started(&self, depth: usize, edges: usize) {
        events::depth_started(depth, edges);
    }

    fn depth_finished(&self, depth: usize, edges: usize, removed: usize) {
        events::depth_finished(depth, edges, removed);
    }

    fn edge_removed(&self, x: &str, y: &str, sepset: &[&str], depth: usize) {
        events::edge_removed(x, y, sepset, depth);
    }

    fn oracle_failed(&self, x: &str, y: &str, error: &OracleError) {
        events::oracle_failed(x, y, error);
    }

    fn collider_oriented(&self, a: &str, b: &str, c: &str) {
        events::collider_oriented(a, b, c);
    }

    fn noncollider_recorded(&self, a: &str, b: &str, c: &str) {
        events::noncollider_recorded(a, b, c);
    }

    fn triple_ambiguous(&self, a: &str, b: &str, c: &str) {
        events::triple_ambiguous(a, b, c);
    }

    fn edge_oriented(&self, rule: &str, from: &str, to: &str, mark: Endpoint) {
        events::edge_oriented(rule, from, to, mark);
    }

    fn orientation_rejected(&self, rule: &str, from: &str, to: &str, reason: &str) {
        events::orientation_rejected(rule, from, to, reason);
    }

    fn cancelled(&self, stage: &str, depth: usize) {
        events::search_cancelled(stage, depth);
    }
}
