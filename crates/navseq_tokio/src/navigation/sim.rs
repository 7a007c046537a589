use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use navseq_core::error::{CoreError, Domain, ErrorKind};
use navseq_core::sequencer::{FailureCause, GoalHandle, Outcome, Progress};
use tokio::sync::oneshot;

use super::{BoxFuture, GoalRequest, NavEvent, NavEventSender, NavigationService};
use crate::error::lock_or_recover;

/// Scripted behaviour for one submitted goal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SimStep {
    /// Accept, then succeed after the travel time.
    Succeed,
    /// Decline the goal.
    Reject,
    /// Accept, then abort after the travel time.
    Abort,
    /// Accept and never finish unless canceled.
    Stall,
}

impl SimStep {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "succeed" | "success" | "ok" => Some(SimStep::Succeed),
            "reject" => Some(SimStep::Reject),
            "abort" | "fail" => Some(SimStep::Abort),
            "stall" | "hang" => Some(SimStep::Stall),
            _ => None,
        }
    }
}

/// In-process stand-in for a navigation stack.
///
/// Goals follow the script in submission order; once the script runs out
/// every goal succeeds. The simulated robot jumps to each accepted target,
/// so feedback reports the straight-line distance from the previous one.
pub struct SimulatedNavigator {
    script: Mutex<VecDeque<SimStep>>,
    available: AtomicBool,
    travel_time: Duration,
    next_handle: AtomicU64,
    position: Mutex<(f64, f64)>,
    requests: Mutex<Vec<(GoalHandle, GoalRequest)>>,
    cancel_tx: Mutex<HashMap<GoalHandle, oneshot::Sender<()>>>,
    cancelled: Mutex<Vec<GoalHandle>>,
}

impl SimulatedNavigator {
    pub fn new(script: impl IntoIterator<Item = SimStep>, travel_time: Duration) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            available: AtomicBool::new(true),
            travel_time,
            next_handle: AtomicU64::new(0),
            position: Mutex::new((0.0, 0.0)),
            requests: Mutex::new(Vec::new()),
            cancel_tx: Mutex::new(HashMap::new()),
            cancelled: Mutex::new(Vec::new()),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<(GoalHandle, GoalRequest)> {
        lock_or_recover(&self.requests, "sim requests").clone()
    }

    /// Handles the client asked to cancel, in order.
    pub fn cancelled(&self) -> Vec<GoalHandle> {
        lock_or_recover(&self.cancelled, "sim cancelled").clone()
    }

    fn next_step(&self) -> SimStep {
        lock_or_recover(&self.script, "sim script")
            .pop_front()
            .unwrap_or(SimStep::Succeed)
    }

    fn travel_from_last(&self, request: &GoalRequest, moves: bool) -> f64 {
        let mut position = lock_or_recover(&self.position, "sim position");
        let distance = (request.x - position.0).hypot(request.y - position.1);
        if moves {
            *position = (request.x, request.y);
        }
        distance
    }
}

impl NavigationService for SimulatedNavigator {
    type Error = CoreError;

    fn wait_until_available<'a>(&'a self, timeout: Duration) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            if self.available.load(Ordering::SeqCst) {
                return true;
            }
            tokio::time::sleep(timeout).await;
            self.available.load(Ordering::SeqCst)
        })
    }

    fn submit_request<'a>(
        &'a self,
        request: GoalRequest,
        events: NavEventSender,
    ) -> BoxFuture<'a, Result<GoalHandle, Self::Error>> {
        Box::pin(async move {
            if !self.available.load(Ordering::SeqCst) {
                return Err(CoreError::error()
                    .domain(Domain::Navigation)
                    .kind(ErrorKind::ServiceUnavailable)
                    .msg("simulated navigator is offline")
                    .build());
            }

            let handle = GoalHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
            let step = self.next_step();
            let distance = self.travel_from_last(&request, step != SimStep::Reject);
            lock_or_recover(&self.requests, "sim requests").push((handle, request));

            let (cancel_tx, cancel_rx) = oneshot::channel();
            lock_or_recover(&self.cancel_tx, "sim cancel").insert(handle, cancel_tx);

            let travel = self.travel_time;
            tokio::spawn(async move {
                if step == SimStep::Reject {
                    let _ = events.send(NavEvent::Accepted {
                        handle,
                        accepted: false,
                    });
                    return;
                }

                let _ = events.send(NavEvent::Accepted {
                    handle,
                    accepted: true,
                });
                let _ = events.send(NavEvent::Feedback {
                    handle,
                    progress: Progress {
                        distance_remaining: distance,
                    },
                });

                let outcome = match step {
                    SimStep::Stall => {
                        let _ = cancel_rx.await;
                        Outcome::Failed(FailureCause::Canceled)
                    }
                    _ => {
                        tokio::select! {
                            _ = tokio::time::sleep(travel) => match step {
                                SimStep::Abort => Outcome::Failed(FailureCause::Aborted),
                                _ => Outcome::Succeeded,
                            },
                            _ = cancel_rx => Outcome::Failed(FailureCause::Canceled),
                        }
                    }
                };

                let _ = events.send(NavEvent::Finished { handle, outcome });
            });

            Ok(handle)
        })
    }

    fn cancel<'a>(&'a self, handle: GoalHandle) -> BoxFuture<'a, Result<(), Self::Error>> {
        Box::pin(async move {
            lock_or_recover(&self.cancelled, "sim cancelled").push(handle);
            if let Some(tx) = lock_or_recover(&self.cancel_tx, "sim cancel").remove(&handle) {
                let _ = tx.send(());
            }
            Ok(())
        })
    }
}
