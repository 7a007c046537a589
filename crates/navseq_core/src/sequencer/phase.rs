/// Why a sequence stopped before completing its plan.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HaltReason {
    /// Navigation service unreachable at submission time.
    ServiceUnavailable,
    /// Goal declined by the navigation service.
    Rejected,
    /// Goal accepted but not completed (aborted, canceled remotely, timed out).
    ExecutionFailed,
    /// Operator asked the sequencer to stop.
    Canceled,
}

impl HaltReason {
    pub const fn label(self) -> &'static str {
        match self {
            HaltReason::ServiceUnavailable => "service unavailable",
            HaltReason::Rejected => "rejected",
            HaltReason::ExecutionFailed => "execution failed",
            HaltReason::Canceled => "canceled",
        }
    }
}

/// Sequencer phases.
///
/// - `Idle`: constructed, `start()` not yet called
/// - `GoalOutstanding`: a goal has been (or is being) submitted and has no outcome yet
/// - `Halted`, `Completed`: terminal
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Idle,
    GoalOutstanding,
    Halted(HaltReason),
    Completed,
}

impl Phase {
    /// Compact ids used in error payloads.
    pub const fn id(self) -> u8 {
        match self {
            Phase::Idle => 0,
            Phase::GoalOutstanding => 1,
            Phase::Completed => 2,
            Phase::Halted(HaltReason::ServiceUnavailable) => 10,
            Phase::Halted(HaltReason::Rejected) => 11,
            Phase::Halted(HaltReason::ExecutionFailed) => 12,
            Phase::Halted(HaltReason::Canceled) => 13,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Halted(_) | Phase::Completed)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::GoalOutstanding => "GoalOutstanding",
            Phase::Halted(_) => "Halted",
            Phase::Completed => "Completed",
        }
    }
}

/// Canonical list of every phase, halted variants included.
pub const ALL_PHASES: [Phase; 7] = [
    Phase::Idle,
    Phase::GoalOutstanding,
    Phase::Completed,
    Phase::Halted(HaltReason::ServiceUnavailable),
    Phase::Halted(HaltReason::Rejected),
    Phase::Halted(HaltReason::ExecutionFailed),
    Phase::Halted(HaltReason::Canceled),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_ids_are_unique() {
        for (i, a) in ALL_PHASES.iter().enumerate() {
            for b in &ALL_PHASES[i + 1..] {
                assert_ne!(a.id(), b.id(), "{a:?} and {b:?} share an id");
            }
        }
    }

    #[test]
    fn only_halted_and_completed_are_terminal() {
        assert!(!Phase::Idle.is_terminal());
        assert!(!Phase::GoalOutstanding.is_terminal());
        assert!(Phase::Completed.is_terminal());
        assert!(Phase::Halted(HaltReason::Rejected).is_terminal());
    }
}
