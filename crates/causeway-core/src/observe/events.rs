//! Structured log events for search progress.
//!
//! Each function emits a `tracing` event with structured fields.

use std::time::Duration;

use crate::graph::Endpoint;
use crate::traits::OracleError;

/// Log the start of a stage (`fas`, `colliders`, `meek`, `fci`).
pub fn stage_started(stage: &str, variables: usize) {
    tracing::info!(event = "stage_started", stage = %stage, variables = variables, "stage started");
}

/// Log the end of a stage.
pub fn stage_finished(stage: &str, elapsed: Duration) {
    tracing::info!(
        event = "stage_finished",
        stage = %stage,
        elapsed_ms = elapsed.as_millis() as u64,
        "stage finished"
    );
}

pub fn depth_started(depth: usize, edges: usize) {
    tracing::debug!(event = "depth_started", depth = depth, edges = edges, "depth started");
}

pub fn depth_finished(depth: usize, edges: usize, removed: usize) {
    tracing::info!(
        event = "depth_finished",
        depth = depth,
        edges = edges,
        removed = removed,
        "depth finished"
    );
}

pub fn edge_removed(x: &str, y: &str, sepset: &[&str], depth: usize) {
    tracing::debug!(
        event = "edge_removed",
        x = %x,
        y = %y,
        sepset = ?sepset,
        depth = depth,
        "edge removed"
    );
}

/// A failed test is recovered as "dependent"; this is the only trace of it.
pub fn oracle_failed(x: &str, y: &str, error: &OracleError) {
    tracing::warn!(
        event = "oracle_failed",
        x = %x,
        y = %y,
        error = %error,
        "independence test failed, treating pair as dependent"
    );
}

pub fn collider_oriented(a: &str, b: &str, c: &str) {
    tracing::debug!(event = "collider_oriented", a = %a, b = %b, c = %c, "collider oriented");
}

pub fn noncollider_recorded(a: &str, b: &str, c: &str) {
    tracing::trace!(event = "noncollider_recorded", a = %a, b = %b, c = %c, "noncollider recorded");
}

pub fn triple_ambiguous(a: &str, b: &str, c: &str) {
    tracing::debug!(event = "triple_ambiguous", a = %a, b = %b, c = %c, "triple marked ambiguous");
}

pub fn edge_oriented(rule: &str, from: &str, to: &str, mark: Endpoint) {
    tracing::debug!(
        event = "edge_oriented",
        rule = %rule,
        from = %from,
        to = %to,
        mark = %mark,
        "endpoint set"
    );
}

pub fn orientation_rejected(rule: &str, from: &str, to: &str, reason: &str) {
    tracing::debug!(
        event = "orientation_rejected",
        rule = %rule,
        from = %from,
        to = %to,
        reason = %reason,
        "orientation rejected"
    );
}

pub fn search_cancelled(stage: &str, depth: usize) {
    tracing::warn!(event = "search_cancelled", stage = %stage, depth = depth, "search cancelled");
}
