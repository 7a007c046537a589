//! Sequencer progress events.
//!
//! Broadcast by the node after each state change so loggers, UIs or a
//! transport publisher can follow the run without touching sequencer state.

use navseq_core::sequencer::{GoalHandle, HaltReason, Progress};

#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEvent {
    Started { waypoints: usize },
    GoalSubmitted { index: usize, handle: GoalHandle },
    GoalAccepted { index: usize, handle: GoalHandle },
    Feedback { index: usize, handle: GoalHandle, progress: Progress },
    /// Waypoint `index` succeeded and `pulses` were queued.
    Notified { index: usize, pulses: u32 },
    Halted { index: usize, reason: HaltReason },
    Completed { waypoints: usize },
}

impl SequencerEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SequencerEvent::Halted { .. } | SequencerEvent::Completed { .. })
    }
}
