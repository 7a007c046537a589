//! navseq_core::sequencer
//!
//! Pure goal-sequencing semantics. This module intentionally contains **no**
//! transport or async code.
//!
//! Key ideas:
//! - One goal outstanding at a time; the plan advances only on `Succeeded`
//! - Every handler returns `Directive`s; the adapter performs the I/O
//! - Callbacks carry a `GoalHandle`; anything not matching the outstanding
//!   handle is a stray and changes nothing
//! - Rejection, failure, cancellation and unavailability all halt the plan

mod engine;
mod event;
mod graph;
mod phase;

pub use engine::{pulses_for, GoalSequencer};
pub use event::{Directive, FailureCause, GoalHandle, Outcome, Progress};
pub use graph::{available_triggers, target_phase, transition_graph, PhaseEdge, PhaseGraph, Trigger};
pub use phase::{HaltReason, Phase, ALL_PHASES};
