//! Main visualization plugin that ties all systems together.

use bevy::prelude::*;

use crate::agents::AgentPlugin;
use crate::arena_loader::ArenaLoaderPlugin;
use crate::camera::OrbitCameraPlugin;
use crate::floor::FloorPlugin;
use crate::hud::HudPlugin;
use crate::path_lines::PathLinePlugin;
use crate::timeline::TimelinePlugin;

/// Frame phases, run in order every update.
///
/// An arena reload and everything rebuilt from it completes before the
/// playback clock is sampled, and sampling happens once per frame before
/// anything is drawn from the result.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum VizSet {
    /// Keyboard input and arena (re)loading.
    Input,
    /// Scene, agent and path-line entities rebuilt after a load.
    Rebuild,
    /// One playback tick.
    Sample,
    /// Transforms, path reveal and overlays from the sampled states.
    Present,
}

/// Main plugin for the arena visualization.
///
/// This plugin sets up the window, adds all sub-plugins, and configures
/// the Bevy app for visualization.
pub struct ArenaVizPlugin;

impl Plugin for ArenaVizPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Arena Playback".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .configure_sets(
            Update,
            (VizSet::Input, VizSet::Rebuild, VizSet::Sample, VizSet::Present).chain(),
        )
        .add_plugins((
            ArenaLoaderPlugin,
            FloorPlugin,
            AgentPlugin,
            PathLinePlugin,
            TimelinePlugin,
            OrbitCameraPlugin,
            HudPlugin,
        ));
    }
}
