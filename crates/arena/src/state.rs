//! Per-frame agent state and world-space points.

use serde::{Deserialize, Serialize};

use crate::grid::AgentId;
use crate::team::Team;

/// Point in world space. The arena floor is the x/z plane, y is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &WorldPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Interpolated state of one agent at one instant.
///
/// Recomputed from the playback cursor every frame and handed out by value;
/// renderers keep their own handles and never store anything in here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_id: AgentId,
    pub team: Team,
    pub location: WorldPoint,
    /// Yaw around the world y axis, in radians.
    pub heading: f64,
    /// Completion of this agent's own path, in `[0, 1]`.
    pub progress: f64,
}

impl AgentState {
    /// True once the agent has reached its final waypoint.
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_point_distance() {
        let a = WorldPoint::new(0.0, 1.0, 0.0);
        let b = WorldPoint::new(3.0, 1.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_agent_state_serialization() {
        let state = AgentState {
            agent_id: AgentId(1),
            team: Team::Blue,
            location: WorldPoint::new(-6.0, 0.5, -7.0),
            heading: 0.0,
            progress: 0.5,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(
            json,
            r#"{"agent_id":1,"team":"blue","location":{"x":-6.0,"y":0.5,"z":-7.0},"heading":0.0,"progress":0.5}"#
        );
        assert!(!state.is_finished());
    }
}
