use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use navseq_core::error::{CoreError, Domain, ErrorKind, Payload, Result};
use navseq_core::plan::{Waypoint, WaypointPlan};
use navseq_core::sequencer::{Directive, GoalHandle, GoalSequencer, Outcome, Phase};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::SequencerEvent;
use crate::error::{log_core_error, navigation_error};
use crate::navigation::{GoalRequest, NavEvent, NavigationService};
use crate::notify::{NotificationSink, Notifier, Pulse};

/// Runtime knobs for a `SequencerNode`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerConfig {
    /// Frame the goal poses are expressed in.
    pub frame_id: String,
    /// How long a submission waits for the navigation service to show up.
    pub server_wait: Duration,
    /// Per-goal deadline; expiry counts as a failed goal. `None` = no deadline.
    pub goal_timeout: Option<Duration>,
    pub pulse: Pulse,
    /// Pause between pulses of one burst.
    pub pulse_gap: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            frame_id: "map".to_string(),
            server_wait: Duration::from_secs(10),
            goal_timeout: None,
            pulse: Pulse::default(),
            pulse_gap: Duration::ZERO,
        }
    }
}

enum Command {
    Start(oneshot::Sender<Result<()>>),
    Cancel,
    Shutdown,
}

/// Operator-side handle to a running `SequencerNode`.
#[derive(Clone)]
pub struct SequencerHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<SequencerEvent>,
}

impl SequencerHandle {
    /// Start the sequence. Fails with `AlreadyStarted` on any call after the
    /// first, or `InvalidState` if the node is no longer running.
    pub async fn start(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Start(reply))
            .map_err(|_| node_stopped())?;
        rx.await.map_err(|_| node_stopped())?
    }

    /// Halt the sequence and cancel the outstanding goal, if any.
    pub fn cancel(&self) -> Result<()> {
        self.commands.send(Command::Cancel).map_err(|_| node_stopped())
    }

    /// Stop the event loop without touching the outstanding goal.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    /// Subscribe to progress events.
    ///
    /// Receivers only see events sent after they subscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<SequencerEvent> {
        self.events.subscribe()
    }
}

fn node_stopped() -> CoreError {
    CoreError::warn()
        .domain(Domain::Sequencer)
        .kind(ErrorKind::InvalidState)
        .msg("sequencer node is not running")
        .build()
}

/// Event loop that owns the goal sequencer.
///
/// Responsibilities:
/// - Serialize start/cancel commands, navigation events and goal timeouts
///   into one queue so sequencer state is only touched from here
/// - Execute the directives the sequencer returns (submit, notify, cancel)
/// - Broadcast `SequencerEvent`s and log the run
///
/// The only awaited call that can take long is the availability check at
/// submission time, bounded by `SequencerConfig::server_wait`.
pub struct SequencerNode<N: NavigationService> {
    sequencer: GoalSequencer,
    nav: Arc<N>,
    notifier: Notifier,
    config: SequencerConfig,

    commands: mpsc::UnboundedReceiver<Command>,
    nav_tx: mpsc::UnboundedSender<NavEvent>,
    nav_rx: mpsc::UnboundedReceiver<NavEvent>,
    timeout_tx: mpsc::UnboundedSender<GoalHandle>,
    timeout_rx: mpsc::UnboundedReceiver<GoalHandle>,
    timer: Option<(GoalHandle, JoinHandle<()>)>,

    // broadcast so a slow subscriber never stalls the loop; laggards drop
    // old events instead.
    events: broadcast::Sender<SequencerEvent>,
}

impl<N: NavigationService> SequencerNode<N> {
    /// Build the node and its handle.
    ///
    /// Must be called from within a tokio runtime (the notification worker
    /// is spawned here).
    pub fn new<S: NotificationSink>(
        plan: WaypointPlan,
        nav: Arc<N>,
        sink: Arc<S>,
        config: SequencerConfig,
    ) -> Result<(Self, SequencerHandle)> {
        if config.frame_id.is_empty() {
            return Err(CoreError::error()
                .domain(Domain::Config)
                .kind(ErrorKind::InvalidArgument)
                .msg("frame id must not be empty")
                .build());
        }

        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (nav_tx, nav_rx) = mpsc::unbounded_channel();
        let (timeout_tx, timeout_rx) = mpsc::unbounded_channel();
        let (events, _rx) = broadcast::channel(64);

        let notifier = Notifier::spawn(sink, config.pulse, config.pulse_gap);

        let handle = SequencerHandle {
            commands: commands_tx,
            events: events.clone(),
        };

        let node = Self {
            sequencer: GoalSequencer::new(plan),
            nav,
            notifier,
            config,
            commands,
            nav_tx,
            nav_rx,
            timeout_tx,
            timeout_rx,
            timer: None,
            events,
        };

        Ok((node, handle))
    }

    /// Run until the sequence completes, halts, or the node is shut down.
    ///
    /// Returns the final phase once every queued pulse has been handed to
    /// the notification sink.
    pub async fn run(mut self) -> Phase {
        info!(
            "sequencer ready: {} waypoints, frame '{}'",
            self.sequencer.plan().len(),
            self.config.frame_id
        );

        let mut commands_open = true;

        loop {
            tokio::select! {
                cmd = self.commands.recv(), if commands_open => match cmd {
                    Some(Command::Start(reply)) => {
                        let result = self.handle_start().await;
                        let _ = reply.send(result);
                    }
                    Some(Command::Cancel) => self.handle_cancel().await,
                    Some(Command::Shutdown) => {
                        info!("sequencer shutdown requested");
                        break;
                    }
                    None => {
                        commands_open = false;
                        if self.sequencer.phase() == Phase::Idle {
                            warn!("every sequencer handle dropped before start");
                            break;
                        }
                    }
                },
                Some(event) = self.nav_rx.recv() => self.handle_nav(event).await,
                Some(handle) = self.timeout_rx.recv() => self.handle_timeout(handle).await,
            }

            if self.sequencer.is_terminal() {
                break;
            }
        }

        if let Some((_, timer)) = self.timer.take() {
            timer.abort();
        }
        let phase = self.sequencer.phase();
        self.notifier.close().await;
        phase
    }

    async fn handle_start(&mut self) -> Result<()> {
        let prev = self.sequencer.phase();
        let directives = self.sequencer.start().map_err(|err| {
            log_core_error(err.clone());
            err
        })?;

        let waypoints = self.sequencer.plan().len();
        info!("starting goal sequence ({waypoints} waypoints)");
        self.emit(SequencerEvent::Started { waypoints });

        self.step(prev, directives).await;
        Ok(())
    }

    async fn handle_cancel(&mut self) {
        let prev = self.sequencer.phase();
        if prev != Phase::GoalOutstanding {
            debug!("cancel ignored while {}", prev.label());
            return;
        }

        warn!(
            "cancel requested at waypoint {}",
            self.sequencer.current_index()
        );
        let directives = self.sequencer.cancel();
        self.step(prev, directives).await;
    }

    async fn handle_nav(&mut self, event: NavEvent) {
        let prev = self.sequencer.phase();
        let index = self.sequencer.current_index();

        match event {
            NavEvent::Accepted { handle, accepted } => {
                if !self.is_outstanding(handle) {
                    debug!("ignoring stray acknowledgment for {handle}");
                    return;
                }

                if accepted {
                    info!("goal {index} accepted ({handle})");
                    self.emit(SequencerEvent::GoalAccepted { index, handle });
                } else {
                    log_core_error(self.goal_error(ErrorKind::Rejected, "was rejected"));
                }

                let directives = self.sequencer.on_accepted(handle, accepted);
                self.step(prev, directives).await;
            }
            NavEvent::Feedback { handle, progress } => {
                if self.sequencer.on_feedback(handle, &progress) {
                    debug!(
                        "goal {index}: {:.2} m remaining",
                        progress.distance_remaining
                    );
                    self.emit(SequencerEvent::Feedback {
                        index,
                        handle,
                        progress,
                    });
                } else {
                    debug!("ignoring stray feedback for {handle}");
                }
            }
            NavEvent::Finished { handle, outcome } => {
                if !self.is_outstanding(handle) {
                    debug!("ignoring stray result for {handle}");
                    return;
                }

                match outcome {
                    Outcome::Succeeded => info!("goal {index} succeeded"),
                    other => log_core_error(
                        CoreError::error()
                            .domain(Domain::Navigation)
                            .kind(ErrorKind::ExecutionFailed)
                            .msgf(format_args!("goal {index} failed or canceled: {other:?}"))
                            .payload(Payload::Step {
                                index,
                                phase: prev.id(),
                            })
                            .build(),
                    ),
                }

                let directives = self.sequencer.on_result(handle, outcome);
                self.step(prev, directives).await;
            }
        }
    }

    async fn handle_timeout(&mut self, handle: GoalHandle) {
        if !self.is_outstanding(handle) {
            return;
        }

        self.timer = None;
        log_core_error(self.goal_error(ErrorKind::Timeout, "timed out"));

        let prev = self.sequencer.phase();
        let directives = self.sequencer.on_timeout(handle);
        self.step(prev, directives).await;
    }

    /// Execute directives, then report a terminal transition if one happened.
    async fn step(&mut self, prev: Phase, directives: Vec<Directive>) {
        let mut queue: VecDeque<Directive> = directives.into();

        while let Some(directive) = queue.pop_front() {
            match directive {
                Directive::Submit { index, waypoint } => {
                    let follow_up = self.submit(index, waypoint).await;
                    queue.extend(follow_up);
                }
                Directive::Notify { index, pulses } => {
                    info!(
                        "finished goal {index} ({pulses} pulse{})",
                        if pulses == 1 { "" } else { "s" }
                    );
                    self.notifier.notify(pulses);
                    self.emit(SequencerEvent::Notified { index, pulses });
                }
                Directive::Cancel { handle } => {
                    info!("requesting cancel of {handle}");
                    if let Err(err) = self.nav.cancel(handle).await {
                        log_core_error(navigation_error("goal cancel failed", err));
                    }
                }
            }
        }

        self.disarm_stale_timer();
        self.report_if_terminal(prev);
    }

    async fn submit(&mut self, index: usize, waypoint: Waypoint) -> Vec<Directive> {
        if !self.nav.wait_until_available(self.config.server_wait).await {
            log_core_error(CoreError::service_unavailable(index));
            return self.fail_submission();
        }

        let request = GoalRequest::new(&waypoint, self.config.frame_id.as_str());
        let handle = match self.nav.submit_request(request, self.nav_tx.clone()).await {
            Ok(handle) => handle,
            Err(err) => {
                log_core_error(navigation_error("goal submission failed", err));
                return self.fail_submission();
            }
        };

        info!(
            "sending goal {index}: x={:.2}, y={:.2}, θ={:.2} deg ({handle})",
            waypoint.x,
            waypoint.y,
            waypoint.heading_degrees()
        );

        match self.sequencer.goal_submitted(handle) {
            Ok(follow_up) => {
                if follow_up.is_empty() {
                    self.emit(SequencerEvent::GoalSubmitted { index, handle });
                    self.arm_timer(handle);
                }
                follow_up
            }
            Err(err) => {
                log_core_error(err);
                vec![Directive::Cancel { handle }]
            }
        }
    }

    fn fail_submission(&mut self) -> Vec<Directive> {
        if let Err(err) = self.sequencer.submit_failed() {
            log_core_error(err);
        }
        Vec::new()
    }

    fn arm_timer(&mut self, handle: GoalHandle) {
        let Some(limit) = self.config.goal_timeout else {
            return;
        };

        let tx = self.timeout_tx.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            let _ = tx.send(handle);
        });
        if let Some((_, previous)) = self.timer.replace((handle, timer)) {
            previous.abort();
        }
    }

    fn disarm_stale_timer(&mut self) {
        let stale = matches!(
            &self.timer,
            Some((handle, _)) if self.sequencer.outstanding() != Some(*handle)
        );
        if stale {
            if let Some((_, timer)) = self.timer.take() {
                timer.abort();
            }
        }
    }

    fn report_if_terminal(&self, prev: Phase) {
        let phase = self.sequencer.phase();
        if phase == prev {
            return;
        }

        let index = self.sequencer.current_index();
        match phase {
            Phase::Completed => {
                let waypoints = self.sequencer.plan().len();
                info!("goal sequence completed ({waypoints} waypoints)");
                self.emit(SequencerEvent::Completed { waypoints });
            }
            Phase::Halted(reason) => {
                warn!("goal sequence halted at waypoint {index}: {}", reason.label());
                self.emit(SequencerEvent::Halted { index, reason });
            }
            Phase::Idle | Phase::GoalOutstanding => {}
        }
    }

    fn is_outstanding(&self, handle: GoalHandle) -> bool {
        self.sequencer.outstanding() == Some(handle)
    }

    fn goal_error(&self, kind: ErrorKind, what: &str) -> CoreError {
        let index = self.sequencer.current_index();
        CoreError::error()
            .domain(Domain::Navigation)
            .kind(kind)
            .msgf(format_args!("goal {index} {what}"))
            .payload(Payload::Step {
                index,
                phase: self.sequencer.phase().id(),
            })
            .build()
    }

    fn emit(&self, event: SequencerEvent) {
        // No receivers is fine; the loop never blocks on observers.
        let _ = self.events.send(event);
    }
}
