//! Waypoint plan files.
//!
//! ```toml
//! [[waypoint]]
//! x = 24.29
//! y = -7.64
//! heading_deg = 0.0
//! ```
//!
//! Waypoints run in file order. `heading_deg` defaults to 0.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use navseq_tokio::{Waypoint, WaypointPlan};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    #[serde(rename = "waypoint", default)]
    waypoints: Vec<WaypointEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WaypointEntry {
    x: f64,
    y: f64,
    #[serde(default)]
    heading_deg: f64,
}

/// Parse plan text. An empty or non-finite plan is an error.
pub fn parse_plan(text: &str) -> Result<WaypointPlan> {
    let file: PlanFile = toml::from_str(text).context("invalid plan file")?;

    let waypoints = file
        .waypoints
        .iter()
        .map(|w| Waypoint::from_degrees(w.x, w.y, w.heading_deg))
        .collect();

    WaypointPlan::new(waypoints).context("invalid waypoint plan")
}

pub fn load_plan(path: &Path) -> Result<WaypointPlan> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    parse_plan(&text).with_context(|| format!("in {}", path.display()))
}
