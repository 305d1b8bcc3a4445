//! One-line status overlay.

use arena::AgentState;
use bevy::prelude::*;
use playback::{AgentStates, Cursor};

use crate::arena_loader::ArenaPlayback;
use crate::plugin::VizSet;
use crate::timeline::{FrameStates, Selection};

/// Plugin for the status line.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud)
            .add_systems(Update, update_hud.in_set(VizSet::Present));
    }
}

/// Marker for the status text.
#[derive(Component)]
pub struct HudText;

/// Formats the status line.
pub fn status_line(
    cursor: &Cursor,
    span: usize,
    states: &AgentStates,
    selected: Option<&AgentState>,
) -> String {
    let finished = states.values().filter(|s| s.is_finished()).count();
    let mut line = format!(
        "{:>5.1}%  step {:>5.2} / {}  {}/{} done",
        cursor.fraction * 100.0,
        cursor.progress,
        span,
        finished,
        states.len()
    );
    match selected {
        Some(state) => line.push_str(&format!(
            "  |  agent {} ({})  x {:.2} z {:.2}  heading {:.0}°  progress {:.0}%",
            state.agent_id,
            state.team,
            state.location.x,
            state.location.z,
            state.heading.to_degrees(),
            state.progress * 100.0
        )),
        None => line.push_str("  |  Tab selects an agent"),
    }
    line
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 18.0,
                color: Color::srgb(0.15, 0.15, 0.2),
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            left: Val::Px(12.0),
            ..default()
        }),
        HudText,
    ));
}

fn update_hud(
    frame: Res<FrameStates>,
    selection: Res<Selection>,
    state: Res<ArenaPlayback>,
    mut text: Query<&mut Text, With<HudText>>,
) {
    let Ok(mut text) = text.get_single_mut() else {
        return;
    };

    let line = match state.arena() {
        Some(arena) => {
            let selected = selection.agent.and_then(|agent| frame.get(agent));
            status_line(&frame.cursor, arena.span(), &frame.states, selected)
        }
        None => state
            .last_error
            .clone()
            .unwrap_or_else(|| "Loading arena...".to_string()),
    };

    if text.sections[0].value != line {
        text.sections[0].value = line;
    }
}
