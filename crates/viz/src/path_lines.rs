//! Path lines: flat ribbons tracing each agent's trajectory.
//!
//! Ribbons are built once per arena load and revealed up to each agent's
//! progress as it travels.

use arena::{AgentId, Team, WorldPoint};
use bevy::prelude::*;
use bevy::render::mesh::Indices;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::PrimitiveTopology;
use playback::{PathLineBuilder, PathLineStyle};

use crate::agents::team_color;
use crate::arena_loader::{ArenaLoadedEvent, ArenaPlayback};
use crate::plugin::VizSet;
use crate::timeline::FrameStates;

/// Plugin for agent path lines.
pub struct PathLinePlugin;

impl Plugin for PathLinePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                rebuild_path_lines
                    .run_if(on_event::<ArenaLoadedEvent>())
                    .in_set(VizSet::Rebuild),
                reveal_path_lines.in_set(VizSet::Present),
            ),
        );
    }
}

/// Alpha of path-line colours.
pub const PATH_LINE_ALPHA: f32 = 0.6;

/// Default ribbon width in world units.
pub const RIBBON_WIDTH: f32 = 0.1;

const EPSILON: f32 = 1e-5;

/// Builds [`PathRibbon`]s with rounded corners.
#[derive(Debug, Clone, Copy)]
pub struct RibbonBuilder {
    pub width: f32,
}

impl Default for RibbonBuilder {
    fn default() -> Self {
        Self {
            width: RIBBON_WIDTH,
        }
    }
}

impl PathLineBuilder for RibbonBuilder {
    type Geometry = PathRibbon;

    fn build(&mut self, points: &[WorldPoint], style: &PathLineStyle) -> PathRibbon {
        let waypoints: Vec<Vec3> = points.iter().map(to_vec3).collect();
        let radius = style.corner_radius as f32;
        let split = style.corner_split as usize;

        let mut line = Vec::with_capacity(waypoints.len());
        let mut mark_indices = Vec::with_capacity(waypoints.len());

        for (i, &point) in waypoints.iter().enumerate() {
            let corner = (i > 0 && i + 1 < waypoints.len())
                .then(|| rounded_corner(waypoints[i - 1], point, waypoints[i + 1], radius))
                .flatten();

            match corner {
                Some((a, b)) if split > 0 => {
                    mark_indices.push(line.len() + split / 2);
                    for s in 0..=split {
                        let t = s as f32 / split as f32;
                        line.push(quadratic_bezier(a, point, b, t));
                    }
                }
                _ => {
                    mark_indices.push(line.len());
                    line.push(point);
                }
            }
        }

        let mut distances = Vec::with_capacity(line.len());
        let mut total = 0.0;
        for (i, point) in line.iter().enumerate() {
            if i > 0 {
                total += point.distance(line[i - 1]);
            }
            distances.push(total);
        }

        let up = to_vec3(&style.up).try_normalize().unwrap_or(Vec3::Y);

        PathRibbon {
            marks: mark_indices.iter().map(|&i| distances[i]).collect(),
            points: line,
            distances,
            width: self.width,
            up,
        }
    }
}

/// Smoothed centre line of one agent's trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRibbon {
    points: Vec<Vec3>,
    /// Distance along the line at each point.
    distances: Vec<f32>,
    /// Distance along the line at each trajectory waypoint.
    marks: Vec<f32>,
    width: f32,
    up: Vec3,
}

impl PathRibbon {
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn total_length(&self) -> f32 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    /// Line length covered at `progress` through the agent's own path.
    pub fn revealed_length(&self, progress: f32) -> f32 {
        if self.marks.len() < 2 {
            return 0.0;
        }
        let last = self.marks.len() - 1;
        let scaled = progress.clamp(0.0, 1.0) * last as f32;
        let index = (scaled.floor() as usize).min(last - 1);
        let factor = scaled - index as f32;
        self.marks[index] + (self.marks[index + 1] - self.marks[index]) * factor
    }

    /// Points of the line up to `length`, ending on an interpolated point.
    pub fn points_up_to(&self, length: f32) -> Vec<Vec3> {
        let mut visible = Vec::new();
        for (i, (&point, &distance)) in self.points.iter().zip(&self.distances).enumerate() {
            if distance <= length {
                push_distinct(&mut visible, point);
                continue;
            }
            let before = self.distances[i - 1];
            let t = (length - before) / (distance - before);
            push_distinct(&mut visible, self.points[i - 1].lerp(point, t));
            break;
        }
        visible
    }

    /// Ribbon mesh revealed up to `progress`, or `None` if nothing is visible yet.
    pub fn mesh_up_to(&self, progress: f32) -> Option<Mesh> {
        let visible = self.points_up_to(self.revealed_length(progress));
        ribbon_mesh(&visible, self.width, self.up)
    }
}

fn to_vec3(point: &WorldPoint) -> Vec3 {
    Vec3::new(point.x as f32, point.y as f32, point.z as f32)
}

fn push_distinct(points: &mut Vec<Vec3>, point: Vec3) {
    if points
        .last()
        .map_or(true, |last| last.distance(point) > EPSILON)
    {
        points.push(point);
    }
}

/// Entry and exit points of a rounded turn at `corner`, if the path turns there.
fn rounded_corner(prev: Vec3, corner: Vec3, next: Vec3, radius: f32) -> Option<(Vec3, Vec3)> {
    let incoming = corner - prev;
    let outgoing = next - corner;
    let (len_in, len_out) = (incoming.length(), outgoing.length());
    if radius <= 0.0 || len_in < EPSILON || len_out < EPSILON {
        return None;
    }

    let dir_in = incoming / len_in;
    let dir_out = outgoing / len_out;
    if dir_in.cross(dir_out).length() < EPSILON {
        return None;
    }

    let r = radius.min(len_in / 2.0).min(len_out / 2.0);
    Some((corner - dir_in * r, corner + dir_out * r))
}

fn quadratic_bezier(a: Vec3, control: Vec3, b: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    a * (u * u) + control * (2.0 * u * t) + b * (t * t)
}

/// Flat strip of `width` along `points`, facing `up`.
fn ribbon_mesh(points: &[Vec3], width: f32, up: Vec3) -> Option<Mesh> {
    if points.len() < 2 {
        return None;
    }

    let half = width / 2.0;
    let mut positions = Vec::with_capacity(points.len() * 2);
    let mut side = Vec3::X;

    for i in 0..points.len() {
        let from = points[i.saturating_sub(1)];
        let to = points[(i + 1).min(points.len() - 1)];
        if let Some(s) = (to - from).cross(up).try_normalize() {
            side = s;
        }
        positions.push((points[i] + side * half).to_array());
        positions.push((points[i] - side * half).to_array());
    }

    let normals = vec![up.to_array(); positions.len()];
    let mut indices = Vec::with_capacity((points.len() - 1) * 6);
    for segment in 0..points.len() as u32 - 1 {
        let base = segment * 2;
        indices.extend_from_slice(&[base, base + 2, base + 1, base + 1, base + 2, base + 3]);
    }

    Some(
        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
            .with_inserted_indices(Indices::U32(indices)),
    )
}

/// A path-line entity and the ribbon it reveals.
#[derive(Component)]
pub struct PathLine {
    pub agent: AgentId,
    pub ribbon: PathRibbon,
    revealed: Option<f32>,
}

/// Replaces every path line with those of the loaded arena.
fn rebuild_path_lines(
    mut commands: Commands,
    mut state: ResMut<ArenaPlayback>,
    existing: Query<Entity, With<PathLine>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for entity in existing.iter() {
        commands.entity(entity).despawn_recursive();
    }

    let Some(playback) = state.playback.as_mut() else {
        return;
    };

    let mut builder = RibbonBuilder::default();
    let agents: Vec<AgentId> = playback.arena().agent_ids().collect();
    let mut built = 0;

    for agent in agents {
        let Some(ribbon) = playback.build_path_line(agent, &mut builder) else {
            continue;
        };
        let Some(mesh) = ribbon_mesh(ribbon.points(), ribbon.width, ribbon.up) else {
            continue;
        };

        commands.spawn((
            PbrBundle {
                mesh: meshes.add(mesh),
                material: materials.add(StandardMaterial {
                    base_color: team_color(Team::for_agent(agent), PATH_LINE_ALPHA),
                    alpha_mode: AlphaMode::Blend,
                    unlit: true,
                    double_sided: true,
                    cull_mode: None,
                    ..default()
                }),
                visibility: Visibility::Hidden,
                ..default()
            },
            PathLine {
                agent,
                ribbon,
                revealed: None,
            },
        ));
        built += 1;
    }

    tracing::debug!("Built {} path lines", built);
}

/// Grows each path line to its agent's progress.
fn reveal_path_lines(
    frame: Res<FrameStates>,
    mut lines: Query<(&mut PathLine, &Handle<Mesh>, &mut Visibility)>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (mut line, handle, mut visibility) in lines.iter_mut() {
        let progress = frame.get(line.agent).map_or(0.0, |s| s.progress as f32);
        let length = line.ribbon.revealed_length(progress);
        if line.revealed == Some(length) {
            continue;
        }
        line.revealed = Some(length);

        match line.ribbon.mesh_up_to(progress) {
            Some(mesh) => {
                if let Some(existing) = meshes.get_mut(handle) {
                    *existing = mesh;
                }
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}
