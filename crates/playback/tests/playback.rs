//! Integration tests for playback over complete arenas.
//!
//! Time is driven by a ManualClock so every run is deterministic.

use arena::{fixtures, AgentId, Arena, ArenaDescriptor, GridPoint, WorldPoint};
use playback::{ManualClock, Playback, PlaybackConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn arena(width: u32, length: u32, paths: Vec<Vec<[i32; 2]>>) -> Arena {
    Arena::from_descriptor(ArenaDescriptor {
        pattern: Vec::new(),
        width,
        length,
        paths: paths
            .into_iter()
            .map(|p| p.into_iter().map(GridPoint::from).collect())
            .collect(),
    })
    .unwrap()
}

fn warehouse_playback() -> (Playback<ManualClock>, ManualClock) {
    let clock = ManualClock::starting_at(100.0);
    let playback = Playback::with_clock(
        fixtures::warehouse(),
        PlaybackConfig::default(),
        clock.clone(),
    );
    (playback, clock)
}

/// Test every agent starts on its first waypoint with zero progress.
#[test]
fn test_start_matches_first_waypoints() {
    let (mut playback, _clock) = warehouse_playback();
    let arena = playback.arena().clone();
    let states = playback.states(Some(0.0));

    for (agent, path) in arena.agent_ids().zip(arena.paths()) {
        let state = &states[&agent];
        let (x, z) = arena.cell_center(path.first());
        assert_eq!(state.location, WorldPoint::new(x, 0.5, z));
        assert_eq!(state.progress, 0.0);
    }
}

/// Test each agent lands on its last waypoint once the global progress
/// reaches its own step count, regardless of the shared span.
#[test]
fn test_each_agent_finishes_at_its_own_last_step() {
    let (mut playback, _clock) = warehouse_playback();
    let arena = playback.arena().clone();
    let span = arena.span() as f64;

    for (agent, path) in arena.agent_ids().zip(arena.paths()) {
        let last = path.last_index() as f64;
        let states = playback.states(Some(last / span));
        let state = &states[&agent];

        let (x, z) = arena.cell_center(path.last());
        assert_eq!(state.progress, 1.0, "agent {}", agent);
        assert!((state.location.x - x).abs() < 1e-9, "agent {}", agent);
        assert!((state.location.z - z).abs() < 1e-9, "agent {}", agent);
    }
}

/// Test the documented single-agent scenario on a 17x17 arena.
#[test]
fn test_straight_row_segment() {
    let clock = ManualClock::starting_at(0.0);
    let mut playback = Playback::with_clock(
        arena(17, 17, vec![vec![[1, 1], [2, 1], [3, 1]]]),
        PlaybackConfig::default(),
        clock,
    );

    // progress scalar 1 of span 2
    let states = playback.states(Some(0.5));
    let state = &states[&AgentId(0)];

    // x from column 1, z from row 2, both offset by 0.5 - 0.5 * 17 = -8
    assert_eq!(state.location, WorldPoint::new(-7.0, 0.5, -6.0));
    // atan2(column delta 0, row delta 1)
    assert_eq!(state.heading, 0.0_f64.atan2(1.0));
    assert_eq!(state.heading, 0.0);
    assert_eq!(state.progress, 0.5);
}

/// Test wall-clock driven progress through one cycle.
#[test]
fn test_time_driven_progress() {
    let (mut playback, clock) = warehouse_playback();

    let first = playback.cursor(None);
    assert_eq!(first.fraction, 0.0);

    clock.advance(2.5);
    let quarter = playback.cursor(None);
    assert_eq!(quarter.fraction, 0.25);
    assert_eq!(quarter.progress, 8.0);
    assert_eq!(quarter.index, 8);
    assert_eq!(quarter.factor, 0.0);
}

/// Test that completing a cycle restarts the next time-driven call.
#[test]
fn test_full_cycle_restarts() {
    let (mut playback, clock) = warehouse_playback();
    playback.states(None);

    let end = playback.states(Some(1.0));
    assert!(end.values().all(|s| s.progress == 1.0));

    clock.advance(0.5);
    let restarted = playback.cursor(None);
    assert_eq!(restarted.fraction, 0.0);
}

/// Test two consecutive cycles produce identical state sequences.
#[test]
fn test_replay_is_idempotent() {
    let (mut playback, clock) = warehouse_playback();

    let run_cycle = |playback: &mut Playback<ManualClock>| {
        let mut frames = Vec::new();
        // 41 frames of 0.25s cover one 10s cycle; the last one ends it
        for _ in 0..=40 {
            frames.push(playback.states(None));
            clock.advance(0.25);
        }
        frames
    };

    let first = run_cycle(&mut playback);
    let second = run_cycle(&mut playback);

    assert_eq!(first.len(), second.len());
    assert_eq!(first, second);
    assert!(first.last().unwrap().values().all(|s| s.progress == 1.0));
}

/// Test seeking then continuing on the wall clock.
#[test]
fn test_seek_then_continue() {
    let (mut playback, clock) = warehouse_playback();
    playback.states(None);

    clock.advance(1.0);
    let seek = playback.cursor(Some(0.5));
    assert_eq!(seek.fraction, 0.5);

    clock.advance(1.0);
    let after = playback.cursor(None);
    assert!((after.fraction - 0.6).abs() < 1e-12);
}

/// Test reset_time restarts from zero but keeps trajectories.
#[test]
fn test_reset_time_keeps_trajectories() {
    let (mut playback, clock) = warehouse_playback();
    let before = playback.trajectories().clone();

    clock.advance(4.0);
    playback.states(None);
    playback.reset_time();

    assert_eq!(playback.cursor(None).fraction, 0.0);
    assert_eq!(playback.trajectories(), &before);
}

/// Test agents sharing a cell at the same step are stacked one step apart.
#[test]
fn test_same_cell_same_step_stacking() {
    let clock = ManualClock::default();
    let mut playback = Playback::with_clock(
        arena(
            10,
            10,
            vec![
                vec![[0, 0], [1, 1], [2, 2]],
                vec![[0, 2], [1, 1], [2, 0]],
                vec![[5, 5], [5, 6], [5, 7]],
            ],
        ),
        PlaybackConfig::default(),
        clock,
    );

    let trajectories = playback.trajectories().clone();
    let lower = trajectories[&AgentId(0)][1];
    let upper = trajectories[&AgentId(1)][1];

    assert_eq!(lower.y, 1.0);
    assert!((upper.y - lower.y - 0.15).abs() < 1e-12);
    assert!(trajectories[&AgentId(2)].iter().all(|p| p.y == 1.0));
}

/// Test only warehouse agents sharing a cell at the same step are stacked.
#[test]
fn test_warehouse_overlapping_routes_are_stacked() {
    let (mut playback, _clock) = warehouse_playback();
    let trajectories = playback.trajectories().clone();

    // Agents 0 and 4 both start on (1, 1)
    assert_eq!(trajectories[&AgentId(0)][0].y, 1.0);
    assert_eq!(trajectories[&AgentId(4)][0].y, 1.15);

    // Agent 1 starts on (3, 1), which agent 0 only reaches at step 2
    assert_eq!(trajectories[&AgentId(1)][0].y, 1.0);
    assert_eq!(trajectories[&AgentId(0)][2].y, 1.0);

    // Nothing else is shared at the same step
    let raised: usize = trajectories
        .values()
        .map(|points| points.iter().filter(|p| p.y > 1.0).count())
        .sum();
    assert_eq!(raised, 1);

    // One point per step for every agent
    let arena = playback.arena().clone();
    for (agent, path) in arena.agent_ids().zip(arena.paths()) {
        assert_eq!(trajectories[&agent].len(), path.len());
    }
}

/// Test rebuilding after reset gives bit-identical trajectories.
#[test]
fn test_trajectories_rebuild_identically() {
    let (mut playback, _clock) = warehouse_playback();
    let first = playback.trajectories().clone();

    playback.reset();
    let second = playback.trajectories().clone();

    assert_eq!(first.len(), second.len());
    for (agent, points) in &first {
        let rebuilt = &second[agent];
        assert_eq!(points.len(), rebuilt.len());
        for (a, b) in points.iter().zip(rebuilt) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.z.to_bits(), b.z.to_bits());
        }
    }
}

/// Test a single stationary agent has no path line and never fails.
#[test]
fn test_single_point_agent() {
    let clock = ManualClock::default();
    let mut playback = Playback::with_clock(
        arena(17, 17, vec![vec![[8, 8]]]),
        PlaybackConfig::default(),
        clock.clone(),
    );

    assert!(playback.trajectory(AgentId(0)).len() <= 1);
    assert!(playback.path_line(AgentId(0)).is_none());

    for _ in 0..5 {
        let states = playback.states(None);
        let state = &states[&AgentId(0)];
        assert_eq!(state.location, WorldPoint::new(0.0, 0.5, 0.0));
        assert_eq!(state.heading, 0.0);
        clock.advance(3.0);
    }
}

/// Test an arena without agents plays back as empty.
#[test]
fn test_empty_arena() {
    let mut playback = Playback::with_clock(
        arena(5, 5, Vec::new()),
        PlaybackConfig::default(),
        ManualClock::default(),
    );
    assert!(playback.states(None).is_empty());
    assert!(playback.trajectories().is_empty());
    assert_eq!(playback.frames_per_cycle(), 0);
}

/// Test configuration from a TOML file changes the cycle length.
#[test]
fn test_config_file_duration() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "duration_secs = 4.0").unwrap();
    let config = PlaybackConfig::from_file(file.path()).unwrap();

    let clock = ManualClock::starting_at(0.0);
    let mut playback = Playback::with_clock(fixtures::warehouse(), config, clock.clone());
    playback.cursor(None);

    clock.advance(1.0);
    assert_eq!(playback.cursor(None).fraction, 0.25);
}
