//! navseq_tokio::navigation
//!
//! Consumer-side view of the navigation service: an opaque request/cancel
//! actor that reports back asynchronously on a `NavEvent` channel.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use navseq_core::plan::Waypoint;
use navseq_core::sequencer::{GoalHandle, Outcome, Progress};
use tokio::sync::mpsc;

mod sim;
pub use sim::{SimStep, SimulatedNavigator};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where services deliver acknowledgments, feedback and results.
pub type NavEventSender = mpsc::UnboundedSender<NavEvent>;

/// Asynchronous report from the navigation service about one goal.
///
/// Contract the sequencer relies on: for a given handle `Accepted` arrives
/// before `Finished`, and `Finished` arrives at most once. Rejection is
/// reported through `Accepted { accepted: false }`, never through `Finished`.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    Accepted { handle: GoalHandle, accepted: bool },
    Feedback { handle: GoalHandle, progress: Progress },
    Finished { handle: GoalHandle, outcome: Outcome },
}

/// Navigation request built from a waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalRequest {
    pub x: f64,
    pub y: f64,
    pub heading_radians: f64,
    pub frame_id: String,
}

impl GoalRequest {
    pub fn new(waypoint: &Waypoint, frame_id: impl Into<String>) -> Self {
        Self {
            x: waypoint.x,
            y: waypoint.y,
            heading_radians: waypoint.heading,
            frame_id: frame_id.into(),
        }
    }

    /// Planar (yaw-only) orientation quaternion as `(z, w)`.
    pub fn orientation(&self) -> (f64, f64) {
        let half = self.heading_radians / 2.0;
        (half.sin(), half.cos())
    }
}

/// External navigation service (motion planning + execution).
///
/// Implementations wrap a concrete transport. `submit_request` returns as
/// soon as the request is on its way; everything after that is reported on
/// `events`.
pub trait NavigationService: Send + Sync + 'static {
    type Error: fmt::Display + Send + Sync + 'static;

    /// Wait up to `timeout` for the service to become reachable.
    fn wait_until_available<'a>(&'a self, timeout: Duration) -> BoxFuture<'a, bool>;

    fn submit_request<'a>(
        &'a self,
        request: GoalRequest,
        events: NavEventSender,
    ) -> BoxFuture<'a, Result<GoalHandle, Self::Error>>;

    fn cancel<'a>(&'a self, handle: GoalHandle) -> BoxFuture<'a, Result<(), Self::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_copies_waypoint_and_frame() {
        let req = GoalRequest::new(&Waypoint::from_degrees(24.29, -7.64, 0.0), "map");
        assert_eq!(req.x, 24.29);
        assert_eq!(req.y, -7.64);
        assert_eq!(req.heading_radians, 0.0);
        assert_eq!(req.frame_id, "map");
        assert_eq!(req.orientation(), (0.0, 1.0));
    }

    #[test]
    fn orientation_is_unit_quaternion_about_z() {
        let req = GoalRequest::new(&Waypoint::from_degrees(0.0, 0.0, 180.0), "map");
        let (z, w) = req.orientation();
        assert!((z - 1.0).abs() < 1e-12);
        assert!(w.abs() < 1e-12);
    }
}
