//! Arena descriptor loading and validation.
//!
//! The descriptor is the JSON document handed to the playback core on load:
//! the map pattern, the grid dimensions, and one path per agent. Loading it
//! yields an [`ArenaDescriptor`]; validating that yields an [`Arena`], the
//! immutable path store every other component reads from.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::grid::{centering_offset, AgentId, AgentPath, GridPoint};

/// Errors that can occur while loading or validating an arena.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// IO error reading the descriptor file.
    #[error("failed to read arena descriptor: {0}")]
    Io(#[from] std::io::Error),
    /// The descriptor is not valid JSON for the expected shape.
    #[error("failed to parse arena descriptor: {0}")]
    Json(#[from] serde_json::Error),
    /// Width or length is zero.
    #[error("invalid arena dimensions {width}x{length}")]
    InvalidDimensions { width: u32, length: u32 },
    /// An agent was given no waypoints.
    #[error("agent {agent} has an empty path")]
    EmptyPath { agent: AgentId },
    /// A waypoint lies outside the arena grid.
    #[error("agent {agent} step {step}: point {point} is outside the arena")]
    OutOfBounds {
        agent: AgentId,
        step: usize,
        point: GridPoint,
    },
}

/// Raw arena descriptor as found on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaDescriptor {
    /// Map rows; `'*'` marks a wall or obstacle cell.
    #[serde(default)]
    pub pattern: Vec<String>,
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub length: u32,
    /// One ordered list of `[row, col]` cells per agent.
    pub paths: Vec<Vec<GridPoint>>,
}

impl ArenaDescriptor {
    /// Parses a descriptor from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self, ArenaError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads and parses a descriptor file.
    pub fn from_file(path: &Path) -> Result<Self, ArenaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// Validated, immutable arena: grid dimensions, map pattern and agent paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    width: u32,
    length: u32,
    pattern: Vec<String>,
    paths: Vec<AgentPath>,
}

impl Arena {
    /// Validates a descriptor.
    pub fn from_descriptor(descriptor: ArenaDescriptor) -> Result<Self, ArenaError> {
        let ArenaDescriptor {
            pattern,
            width,
            length,
            paths,
        } = descriptor;

        if width == 0 || length == 0 {
            return Err(ArenaError::InvalidDimensions { width, length });
        }

        let mut validated = Vec::with_capacity(paths.len());
        for (index, points) in paths.into_iter().enumerate() {
            let agent = AgentId(index as u32);

            for (step, point) in points.iter().enumerate() {
                let in_rows = point.row >= 0 && (point.row as u32) < length;
                let in_cols = point.col >= 0 && (point.col as u32) < width;
                if !(in_rows && in_cols) {
                    return Err(ArenaError::OutOfBounds {
                        agent,
                        step,
                        point: *point,
                    });
                }
            }

            let path = AgentPath::new(points).map_err(|_| ArenaError::EmptyPath { agent })?;
            validated.push(path);
        }

        tracing::debug!(
            "Validated arena {}x{} with {} agents",
            width,
            length,
            validated.len()
        );

        Ok(Self {
            width,
            length,
            pattern,
            paths: validated,
        })
    }

    /// Parses and validates a descriptor from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self, ArenaError> {
        Self::from_descriptor(ArenaDescriptor::from_json_str(content)?)
    }

    /// Reads, parses and validates a descriptor file.
    pub fn from_file(path: &Path) -> Result<Self, ArenaError> {
        let arena = Self::from_descriptor(ArenaDescriptor::from_file(path)?)?;
        tracing::info!(
            "Loaded arena from {:?} ({} agents, span {})",
            path,
            arena.agent_count(),
            arena.span()
        );
        Ok(arena)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    /// Map pattern rows, possibly empty.
    pub fn pattern(&self) -> &[String] {
        &self.pattern
    }

    /// All agent paths in agent order.
    pub fn paths(&self) -> &[AgentPath] {
        &self.paths
    }

    pub fn agent_count(&self) -> usize {
        self.paths.len()
    }

    /// Agent identifiers in enumeration order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.paths.len()).map(|i| AgentId(i as u32))
    }

    /// Path for an agent, if it exists.
    pub fn path(&self, agent: AgentId) -> Option<&AgentPath> {
        self.paths.get(agent.index())
    }

    /// Step count of the longest path; the length of the shared timeline.
    pub fn span(&self) -> usize {
        self.paths
            .iter()
            .map(AgentPath::last_index)
            .max()
            .unwrap_or(0)
    }

    /// World x of column 0.
    pub fn offset_column(&self) -> f64 {
        centering_offset(self.width)
    }

    /// World z of row 0.
    pub fn offset_row(&self) -> f64 {
        centering_offset(self.length)
    }

    /// World `(x, z)` of a cell centre: x from the column, z from the row.
    pub fn cell_center(&self, point: GridPoint) -> (f64, f64) {
        (
            self.offset_column() + point.col as f64,
            self.offset_row() + point.row as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(paths: Vec<Vec<[i32; 2]>>) -> ArenaDescriptor {
        ArenaDescriptor {
            pattern: Vec::new(),
            width: 17,
            length: 17,
            paths: paths
                .into_iter()
                .map(|p| p.into_iter().map(GridPoint::from).collect())
                .collect(),
        }
    }

    #[test]
    fn test_parse_descriptor_without_pattern() {
        let json = r#"{"width": 4, "length": 3, "paths": [[[0, 0], [0, 1]]]}"#;
        let descriptor = ArenaDescriptor::from_json_str(json).unwrap();

        assert!(descriptor.pattern.is_empty());
        assert_eq!(descriptor.width, 4);
        assert_eq!(descriptor.length, 3);
        assert_eq!(descriptor.paths[0][1], GridPoint::new(0, 1));
    }

    #[test]
    fn test_parse_descriptor_rejects_missing_paths() {
        let json = r#"{"width": 4, "length": 3}"#;
        assert!(matches!(
            ArenaDescriptor::from_json_str(json),
            Err(ArenaError::Json(_))
        ));
    }

    #[test]
    fn test_span_is_longest_step_count() {
        let arena = Arena::from_descriptor(descriptor(vec![
            vec![[1, 1], [2, 1], [3, 1]],
            vec![[5, 5]],
            vec![[1, 2], [1, 3], [1, 4], [1, 5]],
        ]))
        .unwrap();

        assert_eq!(arena.span(), 3);
        assert_eq!(arena.agent_count(), 3);
    }

    #[test]
    fn test_span_of_stationary_agents_is_zero() {
        let arena = Arena::from_descriptor(descriptor(vec![vec![[1, 1]], vec![[2, 2]]])).unwrap();
        assert_eq!(arena.span(), 0);
    }

    #[test]
    fn test_span_without_agents_is_zero() {
        let arena = Arena::from_descriptor(descriptor(Vec::new())).unwrap();
        assert_eq!(arena.span(), 0);
        assert_eq!(arena.agent_ids().count(), 0);
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let result = Arena::from_descriptor(descriptor(vec![vec![[1, 1]], Vec::new()]));
        assert!(matches!(
            result,
            Err(ArenaError::EmptyPath { agent: AgentId(1) })
        ));
    }

    #[test]
    fn test_out_of_bounds_point_is_rejected() {
        let result = Arena::from_descriptor(descriptor(vec![vec![[1, 1], [1, 17]]]));
        match result {
            Err(ArenaError::OutOfBounds { agent, step, point }) => {
                assert_eq!(agent, AgentId(0));
                assert_eq!(step, 1);
                assert_eq!(point, GridPoint::new(1, 17));
            }
            other => panic!("expected out of bounds error, got {:?}", other),
        }

        let negative = Arena::from_descriptor(descriptor(vec![vec![[-1, 0]]]));
        assert!(matches!(negative, Err(ArenaError::OutOfBounds { .. })));
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        let mut bad = descriptor(Vec::new());
        bad.width = 0;
        assert!(matches!(
            Arena::from_descriptor(bad),
            Err(ArenaError::InvalidDimensions { width: 0, length: 17 })
        ));
    }

    #[test]
    fn test_cell_center_uses_column_for_x_and_row_for_z() {
        let arena = Arena::from_descriptor(descriptor(vec![vec![[1, 1]]])).unwrap();
        assert_eq!(arena.offset_column(), -8.0);
        assert_eq!(arena.offset_row(), -8.0);
        assert_eq!(arena.cell_center(GridPoint::new(1, 2)), (-6.0, -7.0));
    }

    #[test]
    fn test_rectangular_offsets() {
        let json = r#"{"width": 6, "length": 3, "paths": []}"#;
        let arena = Arena::from_json_str(json).unwrap();
        assert_eq!(arena.offset_column(), -2.5);
        assert_eq!(arena.offset_row(), -1.0);
    }
}
