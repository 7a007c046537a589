/// Target pose for the robot: planar position plus heading.
///
/// `heading` is stored in radians. Use [`Waypoint::from_degrees`] when the
/// plan is authored in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Waypoint {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    pub fn from_degrees(x: f64, y: f64, heading_deg: f64) -> Self {
        Self::new(x, y, heading_deg.to_radians())
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading.to_degrees()
    }

    /// True when every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_round_trip_through_radians() {
        let wp = Waypoint::from_degrees(1.0, 2.0, 90.0);
        assert!((wp.heading - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((wp.heading_degrees() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(Waypoint::new(0.0, 0.0, 0.0).is_finite());
        assert!(!Waypoint::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Waypoint::new(0.0, f64::INFINITY, 0.0).is_finite());
    }
}
