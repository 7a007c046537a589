use std::env;
use std::path::PathBuf;
use std::time::Duration;

use navseq_tokio::navigation::SimStep;
use navseq_tokio::{Pulse, SequencerConfig};
use tracing::warn;

pub const DEFAULT_FRAME: &str = "map";
pub const DEFAULT_START_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_SERVER_WAIT: Duration = Duration::from_secs(10);
pub const DEFAULT_BEEP_HZ: u16 = 500;
pub const DEFAULT_BEEP: Duration = Duration::from_secs(1);
pub const DEFAULT_SIM_TRAVEL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// TOML plan file; the built-in two-stop route when absent.
    pub plan_path: Option<PathBuf>,
    pub start_delay: Duration,
    pub server_wait: Duration,
    pub goal_timeout: Option<Duration>,
    pub frame_id: String,
    pub beep_hz: u16,
    pub beep: Duration,
    pub pulse_gap: Duration,
    pub sim_outcomes: Vec<SimStep>,
    pub sim_travel: Duration,
}

impl Config {
    pub fn from_args() -> Self {
        Self::from_args_iter(env::args())
    }

    pub fn from_args_iter<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut plan_path = env::var("NAVSEQ_PLAN").ok().map(PathBuf::from);
        let mut start_delay = env_ms("NAVSEQ_START_DELAY_MS").unwrap_or(DEFAULT_START_DELAY);
        let mut server_wait = env_ms("NAVSEQ_SERVER_WAIT_MS").unwrap_or(DEFAULT_SERVER_WAIT);
        let mut goal_timeout = env_ms("NAVSEQ_GOAL_TIMEOUT_MS").unwrap_or(Duration::ZERO);
        let mut frame_id = env::var("NAVSEQ_FRAME").unwrap_or_else(|_| DEFAULT_FRAME.to_string());
        let mut beep_hz = env::var("NAVSEQ_BEEP_HZ")
            .ok()
            .and_then(|v| parse_hz(&v))
            .unwrap_or(DEFAULT_BEEP_HZ);
        let mut beep = env_ms("NAVSEQ_BEEP_MS").unwrap_or(DEFAULT_BEEP);
        let mut pulse_gap = env_ms("NAVSEQ_PULSE_GAP_MS").unwrap_or(Duration::ZERO);
        let mut sim_outcomes = env::var("NAVSEQ_SIM_OUTCOMES")
            .map(|v| parse_outcomes(&v))
            .unwrap_or_default();
        let mut sim_travel = env_ms("NAVSEQ_SIM_TRAVEL_MS").unwrap_or(DEFAULT_SIM_TRAVEL);

        let mut args = iter.into_iter();
        let _ = args.next();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
                _ => (arg, None),
            };
            let mut value = || inline.clone().or_else(|| args.next().map(|v| v.as_ref().to_string()));

            match flag {
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                "--plan" => {
                    if let Some(v) = value() {
                        plan_path = Some(PathBuf::from(v));
                    }
                }
                "--frame" => {
                    if let Some(v) = value() {
                        frame_id = v;
                    }
                }
                "--start-delay-ms" => set_ms(&mut start_delay, flag, value()),
                "--server-wait-ms" => set_ms(&mut server_wait, flag, value()),
                "--goal-timeout-ms" => set_ms(&mut goal_timeout, flag, value()),
                "--beep-ms" => set_ms(&mut beep, flag, value()),
                "--pulse-gap-ms" => set_ms(&mut pulse_gap, flag, value()),
                "--sim-travel-ms" => set_ms(&mut sim_travel, flag, value()),
                "--beep-hz" => match value().as_deref().and_then(parse_hz) {
                    Some(hz) => beep_hz = hz,
                    None => warn!("ignoring {flag}: expected a frequency in 1..=65535"),
                },
                "--sim-outcomes" => {
                    if let Some(v) = value() {
                        sim_outcomes = parse_outcomes(&v);
                    }
                }
                _ => warn!("ignoring unknown argument '{arg}'"),
            }
        }

        Self {
            plan_path,
            start_delay,
            server_wait,
            goal_timeout: (!goal_timeout.is_zero()).then_some(goal_timeout),
            frame_id,
            beep_hz,
            beep,
            pulse_gap,
            sim_outcomes,
            sim_travel,
        }
    }

    pub fn pulse(&self) -> Pulse {
        Pulse {
            frequency_hz: self.beep_hz,
            duration: self.beep,
        }
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            frame_id: self.frame_id.clone(),
            server_wait: self.server_wait,
            goal_timeout: self.goal_timeout,
            pulse: self.pulse(),
            pulse_gap: self.pulse_gap,
        }
    }
}

fn print_usage() {
    println!(
        "navseq_runner [--plan <file.toml>] [--start-delay-ms N] [--server-wait-ms N] \
         [--goal-timeout-ms N] [--frame <id>] [--beep-hz N] [--beep-ms N] [--pulse-gap-ms N] \
         [--sim-outcomes succeed,reject,abort,stall] [--sim-travel-ms N]"
    );
}

fn set_ms(slot: &mut Duration, flag: &str, value: Option<String>) {
    match value.as_deref().and_then(parse_ms) {
        Some(ms) => *slot = ms,
        None => warn!("ignoring {flag}: expected milliseconds"),
    }
}

fn env_ms(key: &str) -> Option<Duration> {
    env::var(key).ok().and_then(|v| parse_ms(&v))
}

fn parse_ms(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}

fn parse_hz(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().filter(|hz| *hz > 0)
}

fn parse_outcomes(value: &str) -> Vec<SimStep> {
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| {
            let step = SimStep::parse(s);
            if step.is_none() {
                warn!("ignoring unknown simulated outcome '{}'", s.trim());
            }
            step
        })
        .collect()
}
