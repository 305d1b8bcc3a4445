//! Static scene: floor slab, walls, obstacles and lighting.

use arena::{Block, BlockKind, MapLayout, FLOOR_THICKNESS};
use bevy::prelude::*;

use crate::arena_loader::{ArenaLoadedEvent, ArenaPlayback};
use crate::plugin::VizSet;

/// Plugin for the floor and its map geometry.
pub struct FloorPlugin;

impl Plugin for FloorPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::WHITE))
            .insert_resource(AmbientLight {
                color: Color::srgb_u8(255, 250, 250),
                brightness: 400.0,
            })
            .add_systems(Startup, spawn_lights)
            .add_systems(
                Update,
                rebuild_floor
                    .run_if(on_event::<ArenaLoadedEvent>())
                    .in_set(VizSet::Rebuild),
            );
    }
}

/// Marker for entities that belong to the current arena's map.
#[derive(Component)]
pub struct SceneGeometry;

/// Colour of perimeter barriers.
pub const BARRIER_COLOR: [u8; 3] = [89, 91, 116];

/// Colour of interior obstacles.
pub const OBSTACLE_COLOR: [u8; 3] = [255, 255, 255];

const FLOOR_COLOR: [u8; 3] = [236, 237, 242];

fn block_color(kind: BlockKind) -> Color {
    let [r, g, b] = match kind {
        BlockKind::Barrier => BARRIER_COLOR,
        BlockKind::Obstacle => OBSTACLE_COLOR,
    };
    Color::srgb_u8(r, g, b)
}

/// World transform of a block, centred on its box.
pub fn block_transform(block: &Block) -> Transform {
    Transform::from_xyz(
        block.center.x as f32,
        block.center.y as f32,
        block.center.z as f32,
    )
}

fn spawn_lights(mut commands: Commands) {
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 2_000.0,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_xyz(0.0, 100.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
        ..default()
    });

    commands.spawn(SpotLightBundle {
        spot_light: SpotLight {
            intensity: 4_000_000.0,
            range: 250.0,
            outer_angle: 5.0_f32.to_radians(),
            inner_angle: 0.0,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_xyz(100.0, 100.0, 100.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
}

/// Replaces the floor and map blocks with those of the loaded arena.
fn rebuild_floor(
    mut commands: Commands,
    state: Res<ArenaPlayback>,
    existing: Query<Entity, With<SceneGeometry>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for entity in existing.iter() {
        commands.entity(entity).despawn_recursive();
    }

    let Some(arena) = state.arena() else {
        return;
    };
    let layout = MapLayout::from_arena(arena);

    let floor_size = layout.floor_size as f32;
    let thickness = FLOOR_THICKNESS as f32;
    let [r, g, b] = FLOOR_COLOR;
    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Cuboid::new(floor_size, thickness, floor_size)),
            material: materials.add(StandardMaterial {
                base_color: Color::srgb_u8(r, g, b),
                perceptual_roughness: 0.9,
                ..default()
            }),
            transform: Transform::from_xyz(0.0, -thickness / 2.0, 0.0),
            ..default()
        },
        SceneGeometry,
    ));

    let barrier = materials.add(block_color(BlockKind::Barrier));
    let obstacle = materials.add(block_color(BlockKind::Obstacle));

    for block in &layout.blocks {
        let material = match block.kind {
            BlockKind::Barrier => barrier.clone(),
            BlockKind::Obstacle => obstacle.clone(),
        };
        commands.spawn((
            PbrBundle {
                mesh: meshes.add(Cuboid::new(
                    block.size.x as f32,
                    block.size.y as f32,
                    block.size.z as f32,
                )),
                material,
                transform: block_transform(block),
                ..default()
            },
            SceneGeometry,
        ));
    }

    tracing::info!(
        "Built floor {:.1} wide with {} blocks",
        layout.floor_size,
        layout.blocks.len()
    );
}
