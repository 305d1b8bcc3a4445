//! Agent rendering: bodies, lights, shadows and selection.

use arena::{AgentId, AgentState, Team};
use bevy::prelude::*;
use playback::Cursor;
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use crate::arena_loader::{ArenaLoadedEvent, ArenaPlayback};
use crate::plugin::VizSet;
use crate::timeline::{FrameStates, Selection};

/// Plugin for agent rendering and selection.
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AgentEntities>().add_systems(
            Update,
            (
                spawn_agents
                    .run_if(on_event::<ArenaLoadedEvent>())
                    .in_set(VizSet::Rebuild),
                (move_agents, update_selection_rings).in_set(VizSet::Present),
            ),
        );
    }
}

pub const BODY_RADIUS: f32 = 0.16;
pub const BODY_HEIGHT: f32 = 0.29;
/// Height of the shadow disc above the floor.
pub const SHADOW_HEIGHT: f32 = 0.15;

const SHADOW_RADIUS: f32 = 0.3;
const RING_INNER_RADIUS: f32 = 0.24;
const RING_OUTER_RADIUS: f32 = 0.3;

/// Root entity of one agent, placed on the floor under it.
#[derive(Component)]
pub struct AgentRoot {
    pub agent: AgentId,
}

/// Ring shown under the selected agent.
#[derive(Component)]
pub struct SelectionRing;

/// Entities spawned for one agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentEntitySet {
    pub root: Entity,
    pub ring: Entity,
}

/// Resource mapping agent IDs to their entities.
#[derive(Resource, Default)]
pub struct AgentEntities {
    /// Map of agent ID to entities.
    pub map: HashMap<AgentId, AgentEntitySet>,
}

impl AgentEntities {
    /// Get the root entity for an agent.
    pub fn get(&self, agent: AgentId) -> Option<Entity> {
        self.map.get(&agent).map(|set| set.root)
    }

    pub fn insert(&mut self, agent: AgentId, set: AgentEntitySet) {
        self.map.insert(agent, set);
    }

    /// Removes every mapping, returning the root entities.
    pub fn drain_roots(&mut self) -> Vec<Entity> {
        self.map.drain().map(|(_, set)| set.root).collect()
    }
}

/// Team colour as a Bevy colour with the given alpha.
pub fn team_color(team: Team, alpha: f32) -> Color {
    let [r, g, b] = team.color();
    Color::srgba(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        alpha,
    )
}

/// Root transform for a sampled state: on the floor below the agent, turned
/// so local +z faces along its heading.
pub fn agent_transform(state: &AgentState) -> Transform {
    Transform::from_xyz(state.location.x as f32, 0.0, state.location.z as f32)
        .with_rotation(Quat::from_rotation_y(state.heading as f32))
}

/// Replaces every agent with those of the loaded arena, at their start positions.
fn spawn_agents(
    mut commands: Commands,
    state: Res<ArenaPlayback>,
    mut agent_entities: ResMut<AgentEntities>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for entity in agent_entities.drain_roots() {
        commands.entity(entity).despawn_recursive();
    }

    let Some(playback) = state.playback.as_ref() else {
        return;
    };

    let body_mesh = meshes.add(Cylinder::new(BODY_RADIUS, BODY_HEIGHT));
    let shadow_mesh = meshes.add(Circle::new(SHADOW_RADIUS));
    let ring_mesh = meshes.add(Annulus::new(RING_INNER_RADIUS, RING_OUTER_RADIUS));
    let shadow_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.0, 0.0, 0.0, 0.3),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });
    let ring_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        ..default()
    });
    let flat = Quat::from_rotation_x(-FRAC_PI_2);

    for (agent, agent_state) in playback.states_at(&Cursor::start()) {
        let color = team_color(agent_state.team, 1.0);
        let body_height = agent_state.location.y as f32;

        let mut ring = Entity::PLACEHOLDER;
        let root = commands
            .spawn((
                SpatialBundle::from_transform(agent_transform(&agent_state)),
                AgentRoot { agent },
            ))
            .with_children(|parent| {
                parent.spawn(PbrBundle {
                    mesh: body_mesh.clone(),
                    material: materials.add(color),
                    transform: Transform::from_xyz(0.0, body_height, 0.0),
                    ..default()
                });
                parent.spawn(PointLightBundle {
                    point_light: PointLight {
                        color,
                        intensity: 2_000.0,
                        range: 10.0,
                        ..default()
                    },
                    transform: Transform::from_xyz(0.0, body_height, 0.0),
                    ..default()
                });
                parent.spawn(PbrBundle {
                    mesh: shadow_mesh.clone(),
                    material: shadow_material.clone(),
                    transform: Transform::from_xyz(0.0, SHADOW_HEIGHT, 0.0).with_rotation(flat),
                    ..default()
                });
                ring = parent
                    .spawn((
                        PbrBundle {
                            mesh: ring_mesh.clone(),
                            material: ring_material.clone(),
                            transform: Transform::from_xyz(0.0, SHADOW_HEIGHT + 0.01, 0.0)
                                .with_rotation(flat),
                            visibility: Visibility::Hidden,
                            ..default()
                        },
                        SelectionRing,
                    ))
                    .id();
            })
            .id();

        agent_entities.insert(agent, AgentEntitySet { root, ring });
    }

    tracing::info!("Spawned {} agents", agent_entities.map.len());
}

/// Moves every agent to its sampled state.
fn move_agents(frame: Res<FrameStates>, mut agents: Query<(&AgentRoot, &mut Transform)>) {
    for (root, mut transform) in agents.iter_mut() {
        if let Some(state) = frame.get(root.agent) {
            *transform = agent_transform(state);
        }
    }
}

fn update_selection_rings(
    selection: Res<Selection>,
    agent_entities: Res<AgentEntities>,
    mut rings: Query<&mut Visibility, With<SelectionRing>>,
) {
    if !selection.is_changed() && !agent_entities.is_changed() {
        return;
    }

    for (agent, set) in &agent_entities.map {
        if let Ok(mut visibility) = rings.get_mut(set.ring) {
            *visibility = if selection.agent == Some(*agent) {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena::WorldPoint;

    fn state(heading: f64) -> AgentState {
        AgentState {
            agent_id: AgentId(1),
            team: Team::Blue,
            location: WorldPoint::new(-7.0, 0.5, -6.0),
            heading,
            progress: 0.5,
        }
    }

    #[test]
    fn test_agent_entities_default() {
        let entities = AgentEntities::default();
        assert!(entities.map.is_empty());
        assert!(entities.get(AgentId(0)).is_none());
    }

    #[test]
    fn test_drain_roots_empties_map() {
        let mut entities = AgentEntities::default();
        let set = AgentEntitySet {
            root: Entity::from_raw(1),
            ring: Entity::from_raw(2),
        };
        entities.insert(AgentId(0), set);
        assert_eq!(entities.get(AgentId(0)), Some(Entity::from_raw(1)));

        assert_eq!(entities.drain_roots(), vec![Entity::from_raw(1)]);
        assert!(entities.map.is_empty());
    }

    #[test]
    fn test_agent_transform_sits_on_floor() {
        let transform = agent_transform(&state(0.0));
        assert_eq!(transform.translation, Vec3::new(-7.0, 0.0, -6.0));
        assert!((transform.forward().dot(Vec3::NEG_Z) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_quarter_heading_faces_positive_x() {
        let transform = agent_transform(&state(std::f64::consts::FRAC_PI_2));
        let facing = transform.rotation * Vec3::Z;
        assert!((facing - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_team_color_alpha() {
        let color = team_color(Team::Red, 0.6).to_srgba();
        assert!((color.alpha - 0.6).abs() < 1e-6);
        assert!((color.red - 244.0 / 255.0).abs() < 1e-6);
    }
}
