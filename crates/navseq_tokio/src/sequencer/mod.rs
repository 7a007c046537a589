//! navseq_tokio::sequencer
//!
//! Adapter-side sequencer API.
//!
//! Exposes the event-loop node that owns the core `GoalSequencer`, the
//! handle operators use to start/cancel it, and the one-shot start trigger.

// Progress events (the node's observable output).
mod events;
pub use events::SequencerEvent;

// Event loop + handle.
mod node;
pub use node::{SequencerConfig, SequencerHandle, SequencerNode};

// Delayed start.
mod trigger;
pub use trigger::StartTrigger;
