//! Occupancy-resolving trajectory builder.
//!
//! Walks every agent's path one time-step at a time and emits a world-space
//! point per visited cell. Agents sharing a cell at the same time-step are
//! lifted by one stack step per earlier co-occupant, so path lines drawn
//! over shared corridors stay visually apart.
//!
//! Occupancy only spans the time-step being processed. Within a step agents
//! are visited in enumeration order, so two agents sharing a cell at the
//! same step end up exactly one stack step apart, lower id first.

use arena::{AgentId, Arena, GridPoint, WorldPoint};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::PlaybackConfig;

/// World-space trajectory of every agent, keyed by agent.
pub type Trajectories = BTreeMap<AgentId, Vec<WorldPoint>>;

/// Length of a trajectory polyline in world units.
pub fn trajectory_length(points: &[WorldPoint]) -> f64 {
    points.windows(2).map(|pair| pair[0].distance(&pair[1])).sum()
}

/// Vertical placement of trajectory points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackingStyle {
    /// Height of the first agent through a cell.
    pub base_height: f64,
    /// Extra height per additional occupant.
    pub stack_step: f64,
}

impl Default for StackingStyle {
    fn default() -> Self {
        Self {
            base_height: 1.0,
            stack_step: 0.15,
        }
    }
}

impl From<&PlaybackConfig> for StackingStyle {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            base_height: config.trail_base_height,
            stack_step: config.trail_stack_step,
        }
    }
}

impl StackingStyle {
    /// Height for the `occupant`-th agent (1-based) through a cell.
    pub fn height(&self, occupant: usize) -> f64 {
        self.base_height + self.stack_step * occupant.saturating_sub(1) as f64
    }
}

/// Builds and caches per-agent trajectories.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryBuilder {
    style: StackingStyle,
    /// Agents in each cell at the step being built. The world offset is the
    /// same for every agent, so equal cells are equal world coordinates.
    occupancy: HashMap<GridPoint, BTreeSet<AgentId>>,
    cache: Option<Trajectories>,
}

impl TrajectoryBuilder {
    pub fn new(style: StackingStyle) -> Self {
        Self {
            style,
            occupancy: HashMap::new(),
            cache: None,
        }
    }

    pub fn style(&self) -> StackingStyle {
        self.style
    }

    /// True once trajectories have been built and not reset since.
    pub fn is_built(&self) -> bool {
        self.cache.is_some()
    }

    /// Cached trajectories, if built.
    pub fn cached(&self) -> Option<&Trajectories> {
        self.cache.as_ref()
    }

    /// Returns all trajectories, building them on first use.
    pub fn trajectories(&mut self, arena: &Arena) -> &Trajectories {
        let trajectories = match self.cache.take() {
            Some(cached) => cached,
            None => self.build(arena),
        };
        self.cache.insert(trajectories)
    }

    /// Returns one agent's trajectory, or an empty slice for unknown agents.
    pub fn trajectory(&mut self, arena: &Arena, agent: AgentId) -> &[WorldPoint] {
        self.trajectories(arena)
            .get(&agent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Clears occupancy and cached trajectories so the next call rebuilds.
    pub fn reset(&mut self) {
        self.occupancy.clear();
        self.cache = None;
    }

    fn build(&mut self, arena: &Arena) -> Trajectories {
        let mut trajectories: Trajectories = arena
            .agent_ids()
            .map(|agent| (agent, Vec::new()))
            .collect();

        let mut shared_cells = 0;
        for step in 0..=arena.span() {
            self.occupancy.clear();
            for (agent, path) in arena.agent_ids().zip(arena.paths()) {
                let Some(point) = path.get(step) else {
                    continue;
                };

                let occupants = self.occupancy.entry(point).or_default();
                occupants.insert(agent);

                let (x, z) = arena.cell_center(point);
                let y = self.style.height(occupants.len());

                if let Some(trajectory) = trajectories.get_mut(&agent) {
                    trajectory.push(WorldPoint::new(x, y, z));
                }
            }
            shared_cells += self.occupancy.values().filter(|a| a.len() > 1).count();
        }
        self.occupancy.clear();

        tracing::debug!(
            "Built {} trajectories over span {} ({} stacked cells)",
            trajectories.len(),
            arena.span(),
            shared_cells
        );

        trajectories
    }
}
