//! Visualization layer: Bevy-based 3D renderer for arena playback.

pub mod agents;
pub mod arena_loader;
pub mod camera;
pub mod floor;
pub mod hud;
pub mod path_lines;
pub mod plugin;
pub mod timeline;

pub use plugin::{ArenaVizPlugin, VizSet};
