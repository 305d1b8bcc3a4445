//! Headless playback inspection.
//!
//! Prints a summary line for the arena, then samples it at evenly spaced
//! points of one cycle and prints every agent's state as JSON lines,
//! optionally followed by the trajectories.
//!
//! Examples:
//!   cargo run -p playback -- --samples 4
//!   cargo run -p playback -- --arena arenas/warehouse.json --trajectories

use arena::{fixtures, Arena, ArenaError};
use clap::Parser;
use playback::{trajectory_length, ConfigError, ManualClock, Playback, PlaybackConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Command line arguments for playback inspection
#[derive(Parser, Debug)]
#[command(name = "playback-inspect")]
#[command(about = "Sample grid-path playback without rendering")]
struct Args {
    /// Arena descriptor JSON (defaults to the bundled warehouse)
    #[arg(long)]
    arena: Option<PathBuf>,

    /// Playback configuration TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of intervals to sample across one cycle
    #[arg(long, default_value_t = 10)]
    samples: u32,

    /// Also print each agent's trajectory
    #[arg(long)]
    trajectories: bool,
}

#[derive(Debug, thiserror::Error)]
enum InspectError {
    #[error(transparent)]
    Arena(#[from] ArenaError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// First line of output.
#[derive(Serialize)]
struct SummaryLine {
    agents: usize,
    span: usize,
    duration_secs: f64,
    frames_per_cycle: u64,
}

/// One line of sample output.
#[derive(Serialize)]
struct SampleLine<'a> {
    fraction: f64,
    step: usize,
    states: Vec<&'a arena::AgentState>,
}

/// One line of trajectory output.
#[derive(Serialize)]
struct TrajectoryLine<'a> {
    agent_id: arena::AgentId,
    length: f64,
    points: &'a [arena::WorldPoint],
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), InspectError> {
    let arena = match &args.arena {
        Some(path) => Arena::from_file(path)?,
        None => fixtures::warehouse(),
    };
    let config = match &args.config {
        Some(path) => PlaybackConfig::from_file(path)?,
        None => PlaybackConfig::default(),
    };

    let clock = ManualClock::starting_at(0.0);
    let mut playback = Playback::with_clock(arena, config, clock);

    let summary = SummaryLine {
        agents: playback.arena().agent_count(),
        span: playback.span(),
        duration_secs: playback.config().duration_secs,
        frames_per_cycle: playback.frames_per_cycle(),
    };
    println!("{}", serde_json::to_string(&summary)?);

    let samples = args.samples.max(1);
    for i in 0..=samples {
        let fraction = f64::from(i) / f64::from(samples);
        let cursor = playback.cursor(Some(fraction));
        let states = playback.states_at(&cursor);

        let line = SampleLine {
            fraction: cursor.fraction,
            step: cursor.index,
            states: states.values().collect(),
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    if args.trajectories {
        for (agent_id, points) in playback.trajectories() {
            let line = TrajectoryLine {
                agent_id: *agent_id,
                length: trajectory_length(points),
                points,
            };
            println!("{}", serde_json::to_string(&line)?);
        }
    }

    Ok(())
}
