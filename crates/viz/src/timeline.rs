//! Timeline controls and the per-frame playback tick.
//!
//! The playback is sampled exactly once per frame. Everything else that needs
//! agent states reads them from [`FrameStates`].

use arena::{AgentId, AgentState};
use bevy::prelude::*;
use playback::{AgentStates, Cursor};

use crate::arena_loader::{ArenaLoadedEvent, ArenaPlayback};
use crate::plugin::VizSet;

/// Plugin for playback controls and sampling.
pub struct TimelinePlugin;

impl Plugin for TimelinePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlaybackControl>()
            .init_resource::<Selection>()
            .init_resource::<FrameStates>()
            .add_systems(
                Update,
                (
                    handle_timeline_keys.in_set(VizSet::Input),
                    clamp_selection
                        .run_if(on_event::<ArenaLoadedEvent>())
                        .in_set(VizSet::Rebuild),
                    sample_playback.in_set(VizSet::Sample),
                ),
            );
    }
}

/// Requests queued by input and applied on the next tick.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct PlaybackControl {
    /// Explicit fraction for the next tick.
    pub pending_seek: Option<f64>,
    /// Restart the cycle before the next tick.
    pub restart_requested: bool,
}

impl PlaybackControl {
    pub fn seek(&mut self, fraction: f64) {
        self.pending_seek = Some(fraction);
    }

    pub fn restart(&mut self) {
        self.restart_requested = true;
        self.pending_seek = None;
    }
}

/// The agent highlighted by the selection ring and shown on the HUD.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub agent: Option<AgentId>,
}

impl Selection {
    /// Moves to the next agent, wrapping after the last one.
    pub fn cycle(&mut self, agent_count: usize) {
        self.agent = match (self.agent, agent_count) {
            (_, 0) => None,
            (None, _) => Some(AgentId(0)),
            (Some(current), n) => Some(AgentId(((current.index() + 1) % n) as u32)),
        };
    }

    /// Drops the selection if it no longer names an agent.
    pub fn clamp(&mut self, agent_count: usize) {
        if self.agent.is_some_and(|agent| agent.index() >= agent_count) {
            self.agent = None;
        }
    }
}

/// States sampled this frame.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct FrameStates {
    pub cursor: Cursor,
    pub states: AgentStates,
}

impl Default for FrameStates {
    fn default() -> Self {
        Self {
            cursor: Cursor::start(),
            states: AgentStates::new(),
        }
    }
}

impl FrameStates {
    pub fn get(&self, agent: AgentId) -> Option<&AgentState> {
        self.states.get(&agent)
    }
}

/// Seek fraction bound to a digit key: `n / 10`.
pub fn digit_seek_fraction(key: KeyCode) -> Option<f64> {
    let digit = match key {
        KeyCode::Digit0 => 0,
        KeyCode::Digit1 => 1,
        KeyCode::Digit2 => 2,
        KeyCode::Digit3 => 3,
        KeyCode::Digit4 => 4,
        KeyCode::Digit5 => 5,
        KeyCode::Digit6 => 6,
        KeyCode::Digit7 => 7,
        KeyCode::Digit8 => 8,
        KeyCode::Digit9 => 9,
        _ => return None,
    };
    Some(f64::from(digit) / 10.0)
}

fn handle_timeline_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<ArenaPlayback>,
    mut control: ResMut<PlaybackControl>,
    mut selection: ResMut<Selection>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        tracing::debug!("Restart requested");
        control.restart();
    }

    if let Some(fraction) = keyboard
        .get_just_pressed()
        .find_map(|key| digit_seek_fraction(*key))
    {
        tracing::debug!("Seek requested to {}", fraction);
        control.seek(fraction);
    }

    if keyboard.just_pressed(KeyCode::Tab) {
        let agents = state.arena().map_or(0, |arena| arena.agent_count());
        selection.cycle(agents);
    }
}

fn clamp_selection(state: Res<ArenaPlayback>, mut selection: ResMut<Selection>) {
    let agents = state.arena().map_or(0, |arena| arena.agent_count());
    selection.clamp(agents);
}

/// Ticks the playback once and stores the result for this frame.
fn sample_playback(
    mut state: ResMut<ArenaPlayback>,
    mut control: ResMut<PlaybackControl>,
    mut frame: ResMut<FrameStates>,
) {
    let Some(playback) = state.playback.as_mut() else {
        return;
    };

    if std::mem::take(&mut control.restart_requested) {
        playback.reset_time();
    }

    let cursor = playback.cursor(control.pending_seek.take());
    frame.states = playback.states_at(&cursor);
    frame.cursor = cursor;
}
