use crate::plan::Waypoint;

/// Opaque id the navigation service assigns to one submitted request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GoalHandle(pub u64);

impl std::fmt::Display for GoalHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "goal#{}", self.0)
    }
}

/// Why an accepted goal did not succeed. Only used for reporting.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FailureCause {
    Aborted,
    Canceled,
    TimedOut,
    Unknown,
}

/// What the navigation service reports about a goal.
///
/// `Accepted`/`Rejected` arrive on the acknowledgment channel, the rest on
/// the result channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Outcome {
    Rejected,
    Accepted,
    Succeeded,
    Failed(FailureCause),
}

/// Progress report for the outstanding goal (purely observational).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Progress {
    pub distance_remaining: f64,
}

/// Work the adapter must carry out on behalf of the sequencer.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Submit waypoint `index` (1-based) to the navigation service.
    Submit { index: usize, waypoint: Waypoint },
    /// Waypoint `index` completed; emit `pulses` notification pulses.
    Notify { index: usize, pulses: u32 },
    /// Ask the navigation service to cancel `handle`.
    Cancel { handle: GoalHandle },
}
