//! Playback engine: turns discrete grid paths into continuous animation.
//!
//! A [`Playback`] owns one loaded arena. Each frame the presentation layer
//! calls [`Playback::states`] to get every agent's interpolated location,
//! heading and progress; once per load it reads each agent's trajectory to
//! build static path-line geometry.
//!
//! # Example
//!
//! ```
//! use arena::{fixtures, AgentId};
//! use playback::{ManualClock, Playback, PlaybackConfig};
//!
//! let clock = ManualClock::starting_at(0.0);
//! let mut playback =
//!     Playback::with_clock(fixtures::warehouse(), PlaybackConfig::default(), clock.clone());
//!
//! let start = playback.states(None);
//! assert_eq!(start[&AgentId(0)].progress, 0.0);
//!
//! clock.advance(5.0);
//! let halfway = playback.states(None);
//! assert!(halfway[&AgentId(4)].progress > 0.49);
//! ```

pub mod clock;
pub mod config;
pub mod sampler;
pub mod trajectory;

use arena::{AgentId, Arena, WorldPoint};

pub use clock::{Cursor, ManualClock, PlaybackClock, SystemClock, TimeSource};
pub use config::{ConfigError, PathLineConfig, PlaybackConfig};
pub use sampler::{heading_between, sample_agent, sample_all, AgentStates};
pub use trajectory::{trajectory_length, StackingStyle, Trajectories, TrajectoryBuilder};

/// Fewest points that make a drawable path line.
pub const MIN_PATH_LINE_POINTS: usize = 2;

/// Smoothing parameters handed to a [`PathLineBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLineStyle {
    /// Radius of the rounded corner at each turn.
    pub corner_radius: f64,
    /// Segments per rounded corner.
    pub corner_split: u32,
    /// Axis the line's surface faces.
    pub up: WorldPoint,
}

impl Default for PathLineStyle {
    fn default() -> Self {
        Self::from(&PathLineConfig::default())
    }
}

impl From<&PathLineConfig> for PathLineStyle {
    fn from(config: &PathLineConfig) -> Self {
        Self {
            corner_radius: config.corner_radius,
            corner_split: config.corner_split,
            up: WorldPoint::new(0.0, 1.0, 0.0),
        }
    }
}

/// Geometry service that turns a trajectory into renderable path-line geometry.
///
/// Playback only supplies the ordered points; what comes back is opaque.
pub trait PathLineBuilder {
    type Geometry;

    /// Builds geometry for `points`, which always holds at least two entries.
    fn build(&mut self, points: &[WorldPoint], style: &PathLineStyle) -> Self::Geometry;
}

/// One arena's playback: clock, trajectory cache and sampler.
pub struct Playback<C: TimeSource = SystemClock> {
    arena: Arena,
    config: PlaybackConfig,
    clock: PlaybackClock,
    time: C,
    trajectories: TrajectoryBuilder,
}

impl Playback<SystemClock> {
    /// Creates playback driven by the wall clock.
    pub fn new(arena: Arena, config: PlaybackConfig) -> Self {
        Self::with_clock(arena, config, SystemClock::new())
    }
}

impl<C: TimeSource> Playback<C> {
    /// Creates playback driven by a custom time source.
    pub fn with_clock(arena: Arena, config: PlaybackConfig, time: C) -> Self {
        tracing::info!(
            "Playback loaded: {} agents, span {}, {}s per cycle",
            arena.agent_count(),
            arena.span(),
            config.duration_secs
        );
        Self {
            clock: PlaybackClock::new(config.duration_secs),
            trajectories: TrajectoryBuilder::new(StackingStyle::from(&config)),
            arena,
            config,
            time,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Steps in the shared timeline.
    pub fn span(&self) -> usize {
        self.arena.span()
    }

    /// Rendered frames in one cycle at the configured frame rate.
    pub fn frames_per_cycle(&self) -> u64 {
        self.span() as u64 * u64::from(self.config.frame_rate)
    }

    /// Advances the clock and returns the timeline cursor.
    ///
    /// `fraction` seeks as described on [`PlaybackClock::tick`].
    pub fn cursor(&mut self, fraction: Option<f64>) -> Cursor {
        let now = self.time.now_secs();
        self.clock.tick(now, fraction, self.arena.span())
    }

    /// Advances the clock and samples every agent.
    pub fn states(&mut self, fraction: Option<f64>) -> AgentStates {
        let cursor = self.cursor(fraction);
        self.states_at(&cursor)
    }

    /// Samples every agent at an existing cursor without touching the clock.
    pub fn states_at(&self, cursor: &Cursor) -> AgentStates {
        sample_all(&self.arena, cursor, self.config.ground_height)
    }

    /// All trajectories, built on first use.
    pub fn trajectories(&mut self) -> &Trajectories {
        self.trajectories.trajectories(&self.arena)
    }

    /// One agent's trajectory, empty for unknown agents.
    pub fn trajectory(&mut self, agent: AgentId) -> &[WorldPoint] {
        self.trajectories.trajectory(&self.arena, agent)
    }

    /// Trajectory points worth drawing as a line, or `None` if there are
    /// fewer than two and any existing line should be removed.
    pub fn path_line(&mut self, agent: AgentId) -> Option<&[WorldPoint]> {
        let points = self.trajectory(agent);
        (points.len() >= MIN_PATH_LINE_POINTS).then_some(points)
    }

    /// Smoothing parameters for path lines.
    pub fn path_line_style(&self) -> PathLineStyle {
        PathLineStyle::from(&self.config.path_line)
    }

    /// Hands an agent's path line to `builder`, if it has one.
    pub fn build_path_line<B: PathLineBuilder>(
        &mut self,
        agent: AgentId,
        builder: &mut B,
    ) -> Option<B::Geometry> {
        let style = self.path_line_style();
        let points = self.path_line(agent)?;
        Some(builder.build(points, &style))
    }

    /// Restarts the cycle from the next tick.
    pub fn reset_time(&mut self) {
        tracing::debug!("Playback time reset");
        self.clock.reset();
    }

    /// Restarts the cycle and discards cached trajectories.
    pub fn reset(&mut self) {
        tracing::debug!("Playback reset");
        self.clock.reset();
        self.trajectories.reset();
    }

    /// Replaces the arena wholesale and rebuilds trajectories before returning.
    pub fn reload(&mut self, arena: Arena) {
        self.arena = arena;
        self.reset();
        self.trajectories.trajectories(&self.arena);
        tracing::info!(
            "Playback reloaded: {} agents, span {}",
            self.arena.agent_count(),
            self.arena.span()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena::{ArenaDescriptor, GridPoint};

    fn arena(paths: Vec<Vec<[i32; 2]>>) -> Arena {
        Arena::from_descriptor(ArenaDescriptor {
            pattern: Vec::new(),
            width: 17,
            length: 17,
            paths: paths
                .into_iter()
                .map(|p| p.into_iter().map(GridPoint::from).collect())
                .collect(),
        })
        .unwrap()
    }

    /// Records what it was asked to build.
    #[derive(Default)]
    struct CountingBuilder {
        calls: Vec<(usize, PathLineStyle)>,
    }

    impl PathLineBuilder for CountingBuilder {
        type Geometry = usize;

        fn build(&mut self, points: &[WorldPoint], style: &PathLineStyle) -> usize {
            self.calls.push((points.len(), *style));
            points.len()
        }
    }

    #[test]
    fn test_frames_per_cycle() {
        let playback = Playback::new(
            arena(vec![vec![[1, 1], [1, 2], [1, 3]]]),
            PlaybackConfig::default(),
        );
        assert_eq!(playback.frames_per_cycle(), 30);
    }

    #[test]
    fn test_path_line_requires_two_points() {
        let mut playback = Playback::new(
            arena(vec![vec![[1, 1]], vec![[2, 1], [2, 2]]]),
            PlaybackConfig::default(),
        );

        assert!(playback.path_line(AgentId(0)).is_none());
        assert_eq!(playback.path_line(AgentId(1)).map(<[_]>::len), Some(2));
        assert!(playback.path_line(AgentId(5)).is_none());
    }

    #[test]
    fn test_build_path_line_passes_style() {
        let mut playback = Playback::new(
            arena(vec![vec![[1, 1]], vec![[2, 1], [2, 2], [2, 3]]]),
            PlaybackConfig::default(),
        );
        let mut builder = CountingBuilder::default();

        assert_eq!(playback.build_path_line(AgentId(0), &mut builder), None);
        assert_eq!(playback.build_path_line(AgentId(1), &mut builder), Some(3));

        assert_eq!(builder.calls.len(), 1);
        let (_, style) = builder.calls[0];
        assert_eq!(style.corner_radius, 0.2);
        assert_eq!(style.corner_split, 10);
        assert_eq!(style.up, WorldPoint::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_reload_replaces_paths() {
        let clock = ManualClock::starting_at(0.0);
        let mut playback = Playback::with_clock(
            arena(vec![vec![[1, 1], [1, 2]]]),
            PlaybackConfig::default(),
            clock.clone(),
        );
        assert_eq!(playback.trajectory(AgentId(0)).len(), 2);

        clock.advance(3.0);
        playback.states(None);

        playback.reload(arena(vec![vec![[5, 5], [5, 6], [5, 7]], vec![[6, 6]]]));
        assert_eq!(playback.span(), 2);
        assert_eq!(playback.clock().start_time(), None);
        assert_eq!(playback.trajectory(AgentId(0)).len(), 3);
        assert_eq!(playback.trajectory(AgentId(1)).len(), 1);

        let states = playback.states(None);
        assert_eq!(states.len(), 2);
        assert_eq!(states[&AgentId(0)].progress, 0.0);
    }

    #[test]
    fn test_states_at_does_not_advance_clock() {
        let playback = Playback::with_clock(
            arena(vec![vec![[1, 1], [1, 2]]]),
            PlaybackConfig::default(),
            ManualClock::default(),
        );
        let states = playback.states_at(&Cursor::new(1.0, 1));
        assert_eq!(states[&AgentId(0)].progress, 1.0);
        assert_eq!(playback.clock().start_time(), None);
    }
}
