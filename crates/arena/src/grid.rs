//! Grid Types
//!
//! Discrete cell coordinates and the per-agent paths built from them.
//!
//! # Example
//!
//! ```
//! use arena::{AgentPath, GridPoint};
//!
//! let path = AgentPath::new(vec![GridPoint::new(1, 1), GridPoint::new(2, 1)]).unwrap();
//! assert_eq!(path.last_index(), 1);
//! assert_eq!(path.get_clamped(7), GridPoint::new(2, 1));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset that centres a grid axis of `dimension` cells on the world origin.
///
/// Cell `i` along the axis sits at world coordinate `offset + i`.
pub fn centering_offset(dimension: u32) -> f64 {
    0.5 - 0.5 * dimension as f64
}

/// A single grid cell.
///
/// Serializes as a `[row, col]` pair to match the arena descriptor format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct GridPoint {
    pub row: i32,
    pub col: i32,
}

impl GridPoint {
    /// Creates a new grid point.
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl From<[i32; 2]> for GridPoint {
    fn from([row, col]: [i32; 2]) -> Self {
        Self { row, col }
    }
}

impl From<GridPoint> for [i32; 2] {
    fn from(point: GridPoint) -> Self {
        [point.row, point.col]
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

/// Stable agent identifier: the agent's ordinal in descriptor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Returns the ordinal as an index into the arena's path list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when constructing an [`AgentPath`] from no points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("agent path must contain at least one point")]
pub struct EmptyPathError;

/// Ordered, non-empty sequence of grid cells one agent visits, one per step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AgentPath {
    points: Vec<GridPoint>,
}

impl AgentPath {
    /// Creates a path, rejecting empty input.
    pub fn new(points: Vec<GridPoint>) -> Result<Self, EmptyPathError> {
        if points.is_empty() {
            return Err(EmptyPathError);
        }
        Ok(Self { points })
    }

    /// All points in step order.
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// Number of points (always at least 1).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of the final waypoint.
    pub fn last_index(&self) -> usize {
        self.points.len() - 1
    }

    /// Point at `step`, or the final waypoint once the path is exhausted.
    pub fn get_clamped(&self, step: usize) -> GridPoint {
        self.points[step.min(self.last_index())]
    }

    /// Point at `step`, if the path reaches that far.
    pub fn get(&self, step: usize) -> Option<GridPoint> {
        self.points.get(step).copied()
    }

    /// First waypoint.
    pub fn first(&self) -> GridPoint {
        self.points[0]
    }

    /// Final waypoint.
    pub fn last(&self) -> GridPoint {
        self.points[self.last_index()]
    }

    /// True if the agent never moves.
    pub fn is_stationary(&self) -> bool {
        self.points.len() == 1
    }
}

impl TryFrom<Vec<GridPoint>> for AgentPath {
    type Error = EmptyPathError;

    fn try_from(points: Vec<GridPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}
