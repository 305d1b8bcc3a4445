//! Static map geometry derived from the arena pattern.
//!
//! Every `'*'` in the pattern becomes a box. Cells on the outer ring are thin,
//! low barriers pushed towards the arena edge; interior cells are tall
//! obstacles filling the whole cell.

use serde::{Deserialize, Serialize};

use crate::descriptor::Arena;
use crate::grid::centering_offset;
use crate::state::WorldPoint;

/// Pattern character marking an occupied cell.
pub const WALL_CELL: char = '*';

/// Extra floor extent beyond the arena width.
pub const FLOOR_MARGIN: f64 = 1.6;

/// Floor slab thickness.
pub const FLOOR_THICKNESS: f64 = 0.2;

const BARRIER_HEIGHT: f64 = 0.7;
const OBSTACLE_HEIGHT: f64 = 1.5;
const BARRIER_DEPTH: f64 = 0.5;
const EDGE_SHIFT: f64 = 0.25;

/// What a block represents in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Perimeter wall segment.
    Barrier,
    /// Interior obstacle (a shelf in the warehouse scene).
    Obstacle,
}

/// Axis-aligned box placed in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Centre of the box; y is half its height so it rests on the floor.
    pub center: WorldPoint,
    /// Extent along x, y and z.
    pub size: WorldPoint,
}

/// All static geometry for an arena.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapLayout {
    pub blocks: Vec<Block>,
    /// Side of the square floor slab.
    pub floor_size: f64,
}

impl MapLayout {
    /// Builds the layout for an arena's pattern and dimensions.
    pub fn from_arena(arena: &Arena) -> Self {
        Self::from_pattern(arena.pattern(), arena.width(), arena.length())
    }

    /// Builds the layout from raw pattern rows.
    pub fn from_pattern(pattern: &[String], width: u32, length: u32) -> Self {
        let start = centering_offset(width);
        let end = start.abs();
        let last_row = pattern.len().saturating_sub(1);

        let mut blocks = Vec::new();
        let mut row = centering_offset(length);
        for (index, line) in pattern.iter().enumerate() {
            let mut column = start;
            for cell in line.chars() {
                if cell == WALL_CELL {
                    blocks.push(Self::block_at(index, last_row, column, row, start, end));
                }
                column += 1.0;
            }
            row += 1.0;
        }

        Self {
            blocks,
            floor_size: width as f64 + FLOOR_MARGIN,
        }
    }

    fn block_at(index: usize, last_row: usize, column: f64, row: f64, start: f64, end: f64) -> Block {
        let horizontal = index == 0 || index == last_row;
        let vertical = column == start || column == end;
        let barrier = horizontal || vertical;

        let height = if barrier { BARRIER_HEIGHT } else { OBSTACLE_HEIGHT };
        let size = WorldPoint::new(
            if vertical { BARRIER_DEPTH } else { 1.0 },
            height,
            if horizontal { BARRIER_DEPTH } else { 1.0 },
        );

        let shift_x = if column == start {
            EDGE_SHIFT
        } else if column == end {
            -EDGE_SHIFT
        } else {
            0.0
        };
        let shift_z = if index == 0 {
            EDGE_SHIFT
        } else if index == last_row {
            -EDGE_SHIFT
        } else {
            0.0
        };

        Block {
            kind: if barrier {
                BlockKind::Barrier
            } else {
                BlockKind::Obstacle
            },
            center: WorldPoint::new(column + shift_x, 0.5 * height, row + shift_z),
            size,
        }
    }

    /// Blocks of one kind.
    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }
}
