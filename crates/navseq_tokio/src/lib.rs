//! navseq_tokio
//!
//! tokio adapter that runs the `navseq_core` goal sequencer against an
//! external navigation service and a notification sink.
//!
//! Design rules:
//! - Core sequencing semantics live in `navseq_core`.
//! - Every callback is a message consumed serially by one event loop.
//! - Transports plug in through the `NavigationService` and
//!   `NotificationSink` traits; none are bundled here.

pub mod error;
pub mod navigation;
pub mod notify;
pub mod sequencer;

pub use navigation::{GoalRequest, NavEvent, NavEventSender, NavigationService};
pub use notify::{NotificationSink, Notifier, Pulse};
pub use sequencer::{SequencerConfig, SequencerEvent, SequencerHandle, SequencerNode, StartTrigger};

// Re-export core types that adapter users will commonly need
pub use navseq_core::error::{CoreError, Result};
pub use navseq_core::plan::{Waypoint, WaypointPlan};
pub use navseq_core::sequencer::{FailureCause, GoalHandle, HaltReason, Outcome, Phase, Progress};
