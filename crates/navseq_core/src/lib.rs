//! navseq_core: transport-agnostic waypoint sequencing.
//!
//! Design goals:
//! - Pure, testable logic (no async, no transport deps).
//! - The sequencer never performs I/O; it returns directives for an adapter.
//! - Small, stable public API surface.

pub mod error;

/// Waypoints and the ordered plan the sequencer walks.
pub mod plan;

/// Goal sequencer state machine + phase graph.
pub mod sequencer;
