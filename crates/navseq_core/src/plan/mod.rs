//! navseq_core::plan
//!
//! Immutable navigation targets. A plan is authored once and only read
//! afterwards; the sequencer owns it for its whole lifetime.

mod route;
mod waypoint;

pub use route::WaypointPlan;
pub use waypoint::Waypoint;
