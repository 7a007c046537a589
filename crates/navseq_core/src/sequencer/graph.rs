use crate::error::{CoreError, Domain, ErrorKind, Payload, Result};

use super::{HaltReason, Phase, ALL_PHASES};

/// Events that move the sequencer between phases.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Trigger {
    Start,
    SubmitFailed,
    Rejected,
    /// Success with waypoints remaining.
    Succeeded,
    /// Success on the final waypoint.
    SucceededLast,
    Failed,
    TimedOut,
    Cancel,
}

impl Trigger {
    pub const fn label(self) -> &'static str {
        match self {
            Trigger::Start => "start",
            Trigger::SubmitFailed => "submit_failed",
            Trigger::Rejected => "rejected",
            Trigger::Succeeded => "succeeded",
            Trigger::SucceededLast => "succeeded_last",
            Trigger::Failed => "failed",
            Trigger::TimedOut => "timed_out",
            Trigger::Cancel => "cancel",
        }
    }
}

/// Sequencer phase graph.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PhaseGraph {
    pub phases: Vec<Phase>,
    pub edges: Vec<PhaseEdge>,
}

/// Directed phase edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PhaseEdge {
    pub from: Phase,
    pub trigger: Trigger,
    pub to: Phase,
}

/// Triggers that have an effect in `phase`. Terminal phases accept none.
pub fn available_triggers(phase: Phase) -> &'static [Trigger] {
    use Trigger::*;

    match phase {
        Phase::Idle => &[Start],
        Phase::GoalOutstanding => &[
            SubmitFailed,
            Rejected,
            Succeeded,
            SucceededLast,
            Failed,
            TimedOut,
            Cancel,
        ],
        Phase::Halted(_) | Phase::Completed => &[],
    }
}

/// Phase reached from `from` via `trigger`.
pub fn target_phase(from: Phase, trigger: Trigger) -> Result<Phase> {
    use Trigger::*;

    let to = match (from, trigger) {
        (Phase::Idle, Start) => Phase::GoalOutstanding,
        (Phase::GoalOutstanding, SubmitFailed) => Phase::Halted(HaltReason::ServiceUnavailable),
        (Phase::GoalOutstanding, Rejected) => Phase::Halted(HaltReason::Rejected),
        (Phase::GoalOutstanding, Succeeded) => Phase::GoalOutstanding,
        (Phase::GoalOutstanding, SucceededLast) => Phase::Completed,
        (Phase::GoalOutstanding, Failed | TimedOut) => Phase::Halted(HaltReason::ExecutionFailed),
        (Phase::GoalOutstanding, Cancel) => Phase::Halted(HaltReason::Canceled),
        _ => {
            return Err(CoreError::warn()
                .domain(Domain::Sequencer)
                .kind(ErrorKind::InvalidState)
                .msgf(format_args!(
                    "no '{}' transition out of {}",
                    trigger.label(),
                    from.label()
                ))
                .payload(Payload::Step {
                    index: 0,
                    phase: from.id(),
                })
                .build());
        }
    };

    Ok(to)
}

/// Build the canonical sequencer phase graph.
pub fn transition_graph() -> Result<PhaseGraph> {
    let mut edges = Vec::new();

    for from in ALL_PHASES {
        for trigger in available_triggers(from) {
            edges.push(PhaseEdge {
                from,
                trigger: *trigger,
                to: target_phase(from, *trigger)?,
            });
        }
    }

    Ok(PhaseGraph {
        phases: ALL_PHASES.to_vec(),
        edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_contains_all_phases_and_expected_edges() {
        let graph = transition_graph().unwrap();

        assert_eq!(graph.phases.len(), ALL_PHASES.len());
        assert_eq!(graph.edges.len(), 8);

        for edge in &graph.edges {
            assert!(!edge.from.is_terminal(), "edge out of terminal {:?}", edge.from);
        }

        assert!(graph.edges.iter().any(|e| {
            e.from == Phase::GoalOutstanding
                && e.trigger == Trigger::SucceededLast
                && e.to == Phase::Completed
        }));
    }

    #[test]
    fn terminal_phases_reject_every_trigger() {
        for trigger in available_triggers(Phase::GoalOutstanding) {
            let err = target_phase(Phase::Completed, *trigger).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidState);
        }
        assert!(target_phase(Phase::Halted(HaltReason::Rejected), Trigger::Start).is_err());
    }
}
