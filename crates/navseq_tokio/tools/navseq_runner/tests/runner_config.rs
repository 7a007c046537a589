use std::env;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use navseq_runner::config::{Config, DEFAULT_START_DELAY};
use navseq_tokio::navigation::SimStep;

const KEYS: &[&str] = &[
    "NAVSEQ_PLAN",
    "NAVSEQ_START_DELAY_MS",
    "NAVSEQ_SERVER_WAIT_MS",
    "NAVSEQ_GOAL_TIMEOUT_MS",
    "NAVSEQ_FRAME",
    "NAVSEQ_BEEP_HZ",
    "NAVSEQ_BEEP_MS",
    "NAVSEQ_PULSE_GAP_MS",
    "NAVSEQ_SIM_OUTCOMES",
    "NAVSEQ_SIM_TRAVEL_MS",
];

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let guard = LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poison| poison.into_inner());
    for key in KEYS {
        env::remove_var(key);
    }
    guard
}

#[test]
fn defaults_match_the_two_stop_demo() {
    let _guard = env_lock();

    let config = Config::from_args_iter(["bin"]);
    assert_eq!(config.plan_path, None);
    assert_eq!(config.start_delay, DEFAULT_START_DELAY);
    assert_eq!(config.frame_id, "map");
    assert_eq!(config.goal_timeout, None);

    let pulse = config.pulse();
    assert_eq!(pulse.frequency_hz, 500);
    assert_eq!(pulse.duration, Duration::from_secs(1));
    assert!(config.sim_outcomes.is_empty());
}

#[test]
fn flags_accept_separate_and_inline_values() {
    let _guard = env_lock();

    let config = Config::from_args_iter([
        "bin",
        "--plan",
        "route.toml",
        "--frame=odom",
        "--start-delay-ms",
        "250",
        "--goal-timeout-ms=90000",
        "--beep-hz=880",
        "--pulse-gap-ms",
        "200",
        "--sim-outcomes=ok,reject",
    ]);

    assert_eq!(config.plan_path, Some(PathBuf::from("route.toml")));
    assert_eq!(config.frame_id, "odom");
    assert_eq!(config.start_delay, Duration::from_millis(250));
    assert_eq!(config.goal_timeout, Some(Duration::from_secs(90)));
    assert_eq!(config.beep_hz, 880);
    assert_eq!(config.pulse_gap, Duration::from_millis(200));
    assert_eq!(config.sim_outcomes, vec![SimStep::Succeed, SimStep::Reject]);

    let seq = config.sequencer_config();
    assert_eq!(seq.frame_id, "odom");
    assert_eq!(seq.goal_timeout, Some(Duration::from_secs(90)));
    assert_eq!(seq.pulse.frequency_hz, 880);
}

#[test]
fn env_overrides_apply_and_flags_win() {
    let _guard = env_lock();
    env::set_var("NAVSEQ_FRAME", "world");
    env::set_var("NAVSEQ_BEEP_MS", "400");
    env::set_var("NAVSEQ_SIM_OUTCOMES", "stall");

    let config = Config::from_args_iter(["bin", "--frame", "odom"]);
    assert_eq!(config.frame_id, "odom");
    assert_eq!(config.beep, Duration::from_millis(400));
    assert_eq!(config.sim_outcomes, vec![SimStep::Stall]);

    for key in KEYS {
        env::remove_var(key);
    }
}

#[test]
fn bad_values_keep_defaults() {
    let _guard = env_lock();

    let config = Config::from_args_iter([
        "bin",
        "--start-delay-ms",
        "soon",
        "--beep-hz",
        "0",
        "--sim-outcomes",
        "ok,teleport,abort",
        "--unknown",
    ]);

    assert_eq!(config.start_delay, DEFAULT_START_DELAY);
    assert_eq!(config.beep_hz, 500);
    assert_eq!(config.sim_outcomes, vec![SimStep::Succeed, SimStep::Abort]);
}

#[test]
fn zero_goal_timeout_disables_the_deadline() {
    let _guard = env_lock();
    env::set_var("NAVSEQ_GOAL_TIMEOUT_MS", "5000");

    let config = Config::from_args_iter(["bin", "--goal-timeout-ms", "0"]);
    assert_eq!(config.goal_timeout, None);

    env::remove_var("NAVSEQ_GOAL_TIMEOUT_MS");
}
