use crate::error::{CoreError, Domain, ErrorKind, Payload, Result};
use crate::plan::WaypointPlan;

use super::{target_phase, Directive, FailureCause, GoalHandle, Outcome, Phase, Progress, Trigger};

/// Number of notification pulses for completing waypoint `index`.
pub fn pulses_for(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// Drives a `WaypointPlan` one goal at a time.
///
/// State:
/// - `current_index`: 0 before `start()`, otherwise the 1-based position of
///   the outstanding or just-completed goal
/// - `awaiting_result`: a submitted goal has not reported its outcome yet
/// - `outstanding`: handle of that goal, once the service has assigned one
///
/// Handlers take `&mut self` and must be called serially. None of them block
/// or perform I/O.
#[derive(Debug, Clone)]
pub struct GoalSequencer {
    plan: WaypointPlan,
    current_index: usize,
    awaiting_result: bool,
    outstanding: Option<GoalHandle>,
    phase: Phase,
}

impl GoalSequencer {
    pub fn new(plan: WaypointPlan) -> Self {
        Self {
            plan,
            current_index: 0,
            awaiting_result: false,
            outstanding: None,
            phase: Phase::Idle,
        }
    }

    pub fn plan(&self) -> &WaypointPlan {
        &self.plan
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn awaiting_result(&self) -> bool {
        self.awaiting_result
    }

    pub fn outstanding(&self) -> Option<GoalHandle> {
        self.outstanding
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Begin the sequence: Idle -> GoalOutstanding, submit waypoint 1.
    ///
    /// Any later call fails with `AlreadyStarted` and leaves state untouched.
    pub fn start(&mut self) -> Result<Vec<Directive>> {
        if self.phase != Phase::Idle {
            return Err(CoreError::already_started(
                self.current_index,
                self.phase.id(),
            ));
        }

        self.fire(Trigger::Start)?;
        self.current_index = 1;
        Ok(self.submit_current().into_iter().collect())
    }

    /// Record the handle for the goal most recently requested via `Submit`.
    ///
    /// If the sequence was halted while the submission was in flight, the
    /// fresh goal is orphaned and a `Cancel` for it is returned.
    pub fn goal_submitted(&mut self, handle: GoalHandle) -> Result<Vec<Directive>> {
        match self.phase {
            Phase::GoalOutstanding if !self.awaiting_result => {
                self.outstanding = Some(handle);
                self.awaiting_result = true;
                Ok(Vec::new())
            }
            Phase::Halted(_) => Ok(vec![Directive::Cancel { handle }]),
            _ => Err(self.invalid_state("goal submitted while another goal is outstanding")),
        }
    }

    /// The availability check or the submit call itself failed.
    ///
    /// Halts the sequence; nothing is retried.
    pub fn submit_failed(&mut self) -> Result<Phase> {
        match self.phase {
            Phase::GoalOutstanding if !self.awaiting_result => self.fire(Trigger::SubmitFailed),
            _ => Err(self.invalid_state("submission failure reported with no pending submission")),
        }
    }

    /// Acknowledgment channel. `accepted == false` halts the sequence.
    pub fn on_accepted(&mut self, handle: GoalHandle, accepted: bool) -> Vec<Directive> {
        if !self.is_current(handle) {
            return Vec::new();
        }

        if !accepted {
            self.awaiting_result = false;
            self.outstanding = None;
            self.fire_gated(Trigger::Rejected);
        }

        Vec::new()
    }

    /// Feedback channel. Returns true when the report belongs to the
    /// outstanding goal; it never changes state.
    pub fn on_feedback(&self, handle: GoalHandle, _progress: &Progress) -> bool {
        self.is_current(handle)
    }

    /// Result channel.
    ///
    /// - anything but `Succeeded` halts the sequence
    /// - `Succeeded` notifies for the current waypoint, then submits the next
    ///   one or completes the plan
    pub fn on_result(&mut self, handle: GoalHandle, outcome: Outcome) -> Vec<Directive> {
        if !self.is_current(handle) {
            return Vec::new();
        }

        self.awaiting_result = false;
        self.outstanding = None;

        match outcome {
            Outcome::Succeeded => {}
            Outcome::Failed(FailureCause::TimedOut) => {
                self.fire_gated(Trigger::TimedOut);
                return Vec::new();
            }
            _ => {
                self.fire_gated(Trigger::Failed);
                return Vec::new();
            }
        }

        let mut directives = vec![Directive::Notify {
            index: self.current_index,
            pulses: pulses_for(self.current_index),
        }];

        if self.current_index < self.plan.len() {
            self.fire_gated(Trigger::Succeeded);
            self.current_index += 1;
            directives.extend(self.submit_current());
        } else {
            self.fire_gated(Trigger::SucceededLast);
        }

        directives
    }

    /// Timer expiry for `handle`; treated exactly like a `Failed` result,
    /// plus a cancel request so the service stops driving toward it.
    pub fn on_timeout(&mut self, handle: GoalHandle) -> Vec<Directive> {
        if !self.is_current(handle) {
            return Vec::new();
        }

        let mut directives = self.on_result(handle, Outcome::Failed(FailureCause::TimedOut));
        directives.push(Directive::Cancel { handle });
        directives
    }

    /// Operator cancel: GoalOutstanding -> Halted(Canceled).
    ///
    /// No-op in any other phase.
    pub fn cancel(&mut self) -> Vec<Directive> {
        if self.phase != Phase::GoalOutstanding {
            return Vec::new();
        }

        self.fire_gated(Trigger::Cancel);
        self.awaiting_result = false;

        self.outstanding
            .take()
            .map(|handle| Directive::Cancel { handle })
            .into_iter()
            .collect()
    }

    /// Follow the phase graph edge for `trigger`.
    fn fire(&mut self, trigger: Trigger) -> Result<Phase> {
        self.phase = target_phase(self.phase, trigger)?;
        Ok(self.phase)
    }

    /// `fire` for handlers already gated on `GoalOutstanding`, where every
    /// trigger but `Start` has an edge. A missing edge leaves the phase alone.
    fn fire_gated(&mut self, trigger: Trigger) {
        if let Ok(to) = target_phase(self.phase, trigger) {
            self.phase = to;
        }
    }

    fn is_current(&self, handle: GoalHandle) -> bool {
        self.phase == Phase::GoalOutstanding
            && self.awaiting_result
            && self.outstanding == Some(handle)
    }

    fn submit_current(&self) -> Option<Directive> {
        self.plan
            .get(self.current_index)
            .map(|waypoint| Directive::Submit {
                index: self.current_index,
                waypoint: *waypoint,
            })
    }

    fn invalid_state(&self, msg: &'static str) -> CoreError {
        CoreError::warn()
            .domain(Domain::Sequencer)
            .kind(ErrorKind::InvalidState)
            .msg(msg)
            .payload(Payload::Step {
                index: self.current_index,
                phase: self.phase.id(),
            })
            .build()
    }
}

//
// Tests
//
