//! Orbit camera: framing, mouse orbit and zoom.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::arena_loader::{ArenaLoadedEvent, ArenaPlayback};
use crate::plugin::VizSet;

/// Plugin for the orbit camera.
pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitCamera>()
            .init_resource::<OrbitConstraints>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    reframe_camera
                        .run_if(on_event::<ArenaLoadedEvent>())
                        .in_set(VizSet::Rebuild),
                    (handle_camera_input, apply_camera_to_transform)
                        .chain()
                        .in_set(VizSet::Present),
                ),
            );
    }
}

/// Vertical field of view in degrees.
pub const FIELD_OF_VIEW_DEGREES: f32 = 70.0;

/// Camera position in spherical coordinates around a target.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Point the camera looks at.
    pub target: Vec3,
    /// Distance from the target.
    pub distance: f32,
    /// Angle from straight up, in radians.
    pub polar: f32,
    /// Angle around the vertical axis from +z, in radians.
    pub azimuth: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::framing(17.0)
    }
}

impl OrbitCamera {
    /// Orbit that places the camera at `position`.
    pub fn from_position(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return Self {
                target,
                distance: 0.0,
                polar: 0.0,
                azimuth: 0.0,
            };
        }
        Self {
            target,
            distance,
            polar: (offset.y / distance).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
        }
    }

    /// Default view of an arena `size` cells across: from `(-size, 1.2 size, size)`
    /// towards the origin.
    pub fn framing(size: f32) -> Self {
        Self::from_position(Vec3::new(-size, 1.2 * size, size), Vec3::ZERO)
    }

    /// Camera position in world space.
    pub fn translation(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.target
            + self.distance * Vec3::new(sin_polar * sin_azimuth, cos_polar, sin_polar * cos_azimuth)
    }

    /// Camera transform looking at the target.
    pub fn transform(&self) -> Transform {
        // Straight down, world up is parallel to the view direction
        let up = if self.polar.abs() < 1e-4 {
            -Vec3::new(self.azimuth.sin(), 0.0, self.azimuth.cos())
        } else {
            Vec3::Y
        };
        Transform::from_translation(self.translation()).looking_at(self.target, up)
    }

    /// Rotates by a mouse drag in pixels.
    pub fn orbit(&mut self, delta: Vec2, constraints: &OrbitConstraints) {
        self.azimuth -= delta.x * constraints.rotate_speed;
        self.polar = constraints.clamp_polar(self.polar - delta.y * constraints.rotate_speed);
    }

    /// Moves towards the target for positive `scroll`, away for negative.
    pub fn zoom(&mut self, scroll: f32, constraints: &OrbitConstraints) {
        let factor = (1.0 - scroll * constraints.zoom_speed).max(0.1);
        self.distance = constraints.clamp_distance(self.distance * factor);
    }

    /// Applies every limit in `constraints`.
    pub fn clamped(mut self, constraints: &OrbitConstraints) -> Self {
        self.polar = constraints.clamp_polar(self.polar);
        self.distance = constraints.clamp_distance(self.distance);
        self
    }
}

/// Limits on the orbit camera.
#[derive(Resource, Debug, Clone, Copy)]
pub struct OrbitConstraints {
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per dragged pixel.
    pub rotate_speed: f32,
    /// Fraction of the distance per scroll line.
    pub zoom_speed: f32,
}

impl Default for OrbitConstraints {
    fn default() -> Self {
        Self {
            min_polar: 0.0,
            max_polar: FRAC_PI_2,
            min_distance: 4.0,
            max_distance: 100.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
        }
    }
}

impl OrbitConstraints {
    pub fn clamp_polar(&self, polar: f32) -> f32 {
        polar.clamp(self.min_polar, self.max_polar)
    }

    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }
}

/// Marker component for the main camera.
#[derive(Component)]
pub struct MainCamera;

fn setup_camera(mut commands: Commands, orbit: Res<OrbitCamera>) {
    commands.spawn((
        Camera3dBundle {
            projection: Projection::Perspective(PerspectiveProjection {
                fov: FIELD_OF_VIEW_DEGREES.to_radians(),
                ..default()
            }),
            transform: orbit.transform(),
            ..default()
        },
        MainCamera,
    ));
}

/// Frames a newly loaded arena.
fn reframe_camera(
    state: Res<ArenaPlayback>,
    constraints: Res<OrbitConstraints>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Some(arena) = state.arena() else {
        return;
    };
    let size = arena.width().max(arena.length()) as f32;
    *orbit = OrbitCamera::framing(size).clamped(&constraints);
}

/// Left-drag orbits, the wheel zooms.
fn handle_camera_input(
    mut orbit: ResMut<OrbitCamera>,
    constraints: Res<OrbitConstraints>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll: EventReader<MouseWheel>,
) {
    if mouse_button.pressed(MouseButton::Left) {
        let delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
        if delta != Vec2::ZERO {
            orbit.orbit(delta, &constraints);
        }
    } else {
        // Clear motion events if not dragging
        mouse_motion.clear();
    }

    for ev in scroll.read() {
        let lines = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 100.0,
        };
        orbit.zoom(lines, &constraints);
    }
}

fn apply_camera_to_transform(
    orbit: Res<OrbitCamera>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
) {
    if !orbit.is_changed() {
        return;
    }
    for mut transform in camera.iter_mut() {
        *transform = orbit.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn test_framing_starts_above_and_behind() {
        let orbit = OrbitCamera::framing(17.0);
        assert_close(orbit.translation(), Vec3::new(-17.0, 20.4, 17.0));
        assert_eq!(orbit.target, Vec3::ZERO);
    }

    #[test]
    fn test_from_position_round_trips() {
        let position = Vec3::new(3.0, 5.0, -2.0);
        let target = Vec3::new(1.0, 0.0, 1.0);
        let orbit = OrbitCamera::from_position(position, target);
        assert_close(orbit.translation(), position);
    }

    #[test]
    fn test_transform_looks_at_target() {
        let orbit = OrbitCamera::framing(10.0);
        let transform = orbit.transform();
        let to_target = (orbit.target - transform.translation).normalize();
        assert!((transform.forward().dot(to_target) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_top_down_transform_is_finite() {
        let orbit = OrbitCamera {
            polar: 0.0,
            ..OrbitCamera::framing(10.0)
        };
        assert!(orbit.transform().rotation.is_finite());
    }

    #[test]
    fn test_orbit_clamps_polar_angle() {
        let constraints = OrbitConstraints::default();
        let mut orbit = OrbitCamera::framing(10.0);

        orbit.orbit(Vec2::new(0.0, -10_000.0), &constraints);
        assert_eq!(orbit.polar, FRAC_PI_2);

        orbit.orbit(Vec2::new(0.0, 10_000.0), &constraints);
        assert_eq!(orbit.polar, 0.0);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let constraints = OrbitConstraints::default();
        let mut orbit = OrbitCamera::framing(10.0);

        for _ in 0..100 {
            orbit.zoom(1.0, &constraints);
        }
        assert_eq!(orbit.distance, 4.0);

        for _ in 0..100 {
            orbit.zoom(-1.0, &constraints);
        }
        assert_eq!(orbit.distance, 100.0);
    }

    #[test]
    fn test_large_arena_framing_is_clamped() {
        let orbit = OrbitCamera::framing(200.0).clamped(&OrbitConstraints::default());
        assert_eq!(orbit.distance, 100.0);
    }
}
