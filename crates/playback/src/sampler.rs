//! State sampler: per-agent state at a point on the shared timeline.

use arena::{AgentId, AgentPath, AgentState, Arena, GridPoint, Team, WorldPoint};
use std::collections::BTreeMap;

use crate::clock::Cursor;

/// States of every agent, keyed by agent.
pub type AgentStates = BTreeMap<AgentId, AgentState>;

/// Heading along a grid step: `atan2(col delta, row delta)`.
///
/// Zero faces +row (world +z); a quarter turn faces +col (world +x).
pub fn heading_between(from: GridPoint, to: GridPoint) -> f64 {
    let dx = (to.col - from.col) as f64;
    let dz = (to.row - from.row) as f64;
    dx.atan2(dz)
}

/// Samples one agent at `cursor`.
///
/// Once the agent has reached its final waypoint the heading comes from the
/// last segment it travelled, since the look-ahead segment has zero length
/// there. A stationary agent faces heading 0 and counts as finished.
pub fn sample_agent(
    arena: &Arena,
    agent: AgentId,
    path: &AgentPath,
    cursor: &Cursor,
    ground_height: f64,
) -> AgentState {
    let last = path.last_index();
    let current = path.get_clamped(cursor.index);
    let next = path.get_clamped(cursor.index.saturating_add(1));

    let dx = (next.col - current.col) as f64;
    let dz = (next.row - current.row) as f64;

    let stationary = path.is_stationary();
    let heading = if stationary {
        0.0
    } else if cursor.index >= last {
        heading_between(path.get_clamped(last - 1), current)
    } else {
        dx.atan2(dz)
    };

    let (x, z) = arena.cell_center(current);
    let location = WorldPoint::new(
        x + dx * cursor.factor,
        ground_height,
        z + dz * cursor.factor,
    );

    let progress = if stationary {
        1.0
    } else {
        (cursor.progress / last as f64).min(1.0)
    };

    AgentState {
        agent_id: agent,
        team: Team::for_agent(agent),
        location,
        heading,
        progress,
    }
}

/// Samples every agent at `cursor`, rebuilding the full map.
pub fn sample_all(arena: &Arena, cursor: &Cursor, ground_height: f64) -> AgentStates {
    arena
        .agent_ids()
        .zip(arena.paths())
        .map(|(agent, path)| {
            (
                agent,
                sample_agent(arena, agent, path, cursor, ground_height),
            )
        })
        .collect()
}
