//! Arena Playback Visualization
//!
//! Run with: cargo run -p viz
//!
//! Examples:
//!   cargo run -p viz -- --duration 20
//!   cargo run -p viz -- --arena arenas/warehouse.json --config playback.toml

use bevy::prelude::*;
use clap::Parser;
use playback::PlaybackConfig;
use std::path::PathBuf;
use viz::arena_loader::ViewerConfig;
use viz::ArenaVizPlugin;

/// Arena Playback Visualization
#[derive(Parser, Debug)]
#[command(name = "viz")]
#[command(about = "3D playback of multi-agent grid paths")]
struct Args {
    /// Arena descriptor JSON (defaults to the bundled warehouse)
    #[arg(long)]
    arena: Option<PathBuf>,

    /// Playback configuration TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds per playback cycle (overrides the config file)
    #[arg(long)]
    duration: Option<f64>,

    /// Do not reload the arena when its file changes
    #[arg(long)]
    no_watch: bool,
}

fn main() {
    let args = Args::parse();

    let config = match load_playback_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid playback configuration: {}", e);
            std::process::exit(2);
        }
    };

    let viewer_config = ViewerConfig {
        arena_path: args.arena,
        playback: config,
        watch: !args.no_watch,
    };

    App::new()
        .insert_resource(viewer_config)
        .add_plugins(ArenaVizPlugin)
        .run();
}

fn load_playback_config(args: &Args) -> Result<PlaybackConfig, playback::ConfigError> {
    let config = match &args.config {
        Some(path) => PlaybackConfig::from_file(path)?,
        None => PlaybackConfig::default(),
    };
    match args.duration {
        Some(duration) => config.with_duration(duration),
        None => Ok(config),
    }
}
