use crate::error::{CoreError, Domain, ErrorKind, Payload, Result};

use super::Waypoint;

/// Ordered, finite, immutable list of waypoints.
///
/// Positions are 1-based: index 0 means "no active goal", so `get(0)` is
/// always `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPlan {
    waypoints: Vec<Waypoint>,
}

impl WaypointPlan {
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self> {
        if waypoints.is_empty() {
            return Err(CoreError::error()
                .domain(Domain::Plan)
                .kind(ErrorKind::InvalidArgument)
                .msg("waypoint plan must not be empty")
                .build());
        }

        if let Some(pos) = waypoints.iter().position(|wp| !wp.is_finite()) {
            return Err(CoreError::error()
                .domain(Domain::Plan)
                .kind(ErrorKind::InvalidArgument)
                .msgf(format_args!("waypoint {} has a non-finite component", pos + 1))
                .payload(Payload::Code((pos + 1) as u32))
                .build());
        }

        Ok(Self { waypoints })
    }

    /// The two-stop route the robot runs when no plan file is given.
    pub fn default_route() -> Self {
        Self {
            waypoints: vec![
                Waypoint::from_degrees(24.29, -7.64, 0.0),
                Waypoint::from_degrees(-8.9, 9.2, 0.0),
            ],
        }
    }

    /// 1-based lookup.
    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        index.checked_sub(1).and_then(|i| self.waypoints.get(i))
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether the plan has no waypoints. Never true for a plan built by `new`.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan_is_rejected() {
        let err = WaypointPlan::new(Vec::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.domain, Domain::Plan);
    }

    #[test]
    fn non_finite_waypoint_is_reported_by_position() {
        let err = WaypointPlan::new(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(1.0, f64::NAN, 0.0),
        ])
        .unwrap_err();
        assert_eq!(err.payload, Payload::Code(2));
    }

    #[test]
    fn lookup_is_one_based() {
        let plan = WaypointPlan::default_route();
        assert_eq!(plan.len(), 2);
        assert!(!plan.is_empty());
        assert!(plan.get(0).is_none());
        assert_eq!(plan.get(1).unwrap().x, 24.29);
        assert_eq!(plan.get(2).unwrap().y, 9.2);
        assert!(plan.get(3).is_none());
    }
}
