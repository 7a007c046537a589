use std::sync::Arc;

use anyhow::{bail, Context, Result};
use navseq_runner::config::Config;
use navseq_runner::plan_file::load_plan;
use navseq_runner::sink::LogSink;
use navseq_tokio::navigation::SimulatedNavigator;
use navseq_tokio::{Phase, SequencerNode, StartTrigger, WaypointPlan};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_args();

    let plan = match &config.plan_path {
        Some(path) => load_plan(path)?,
        None => WaypointPlan::default_route(),
    };
    for (i, w) in plan.iter().enumerate() {
        info!(
            "waypoint {}: x={:.2}, y={:.2}, θ={:.2} deg",
            i + 1,
            w.x,
            w.y,
            w.heading_degrees()
        );
    }

    let nav = Arc::new(SimulatedNavigator::new(
        config.sim_outcomes.iter().copied(),
        config.sim_travel,
    ));
    let sink = Arc::new(LogSink);

    let (node, handle) = SequencerNode::new(plan, nav, sink, config.sequencer_config())
        .context("build sequencer node")?;
    let mut runner = tokio::spawn(node.run());

    let trigger = StartTrigger::after(config.start_delay).spawn(handle.clone());

    let phase = tokio::select! {
        phase = &mut runner => phase.context("sequencer task")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listen for ctrl-c")?;
            warn!("interrupted; stopping goal sequence");
            // Cancel wins if a goal is out; shutdown covers the idle case.
            let _ = handle.cancel();
            handle.shutdown();
            runner.await.context("sequencer task")?
        }
    };
    trigger.abort();

    match phase {
        Phase::Completed => {
            info!("all waypoints reached");
            Ok(())
        }
        Phase::Halted(reason) => bail!("goal sequence halted: {}", reason.label()),
        other => bail!("sequencer stopped while {}", other.label()),
    }
}
