//! Team assignment and display colours.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grid::AgentId;

/// Display palette as sRGB bytes, indexed by team.
pub const TEAM_PALETTE: [[u8; 3]; 17] = [
    [0xf4, 0x15, 0x5b],
    [0x15, 0x6c, 0xf4],
    [0xf4, 0x9d, 0x15],
    [0x6a, 0x32, 0xe6],
    [0x5b, 0xf4, 0x15],
    [0xf2, 0x5f, 0x5c],
    [0x24, 0x7b, 0xa0],
    [0xf0, 0xb6, 0x7f],
    [0x9b, 0xc1, 0xbc],
    [0xfe, 0x5f, 0x55],
    [0xf4, 0xf1, 0xbb],
    [0xd6, 0xd1, 0xb1],
    [0xed, 0x6a, 0x5a],
    [0xc7, 0xef, 0xcf],
    [0xee, 0xf5, 0xdb],
    [0x50, 0x51, 0x4f],
    [0x70, 0xc1, 0xb3],
];

/// Team an agent belongs to, fixed by its ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    /// Even ordinals play for red, odd ones for blue.
    pub fn for_agent(agent: AgentId) -> Self {
        if agent.0 % 2 == 0 {
            Team::Red
        } else {
            Team::Blue
        }
    }

    pub fn index(self) -> usize {
        match self {
            Team::Red => 0,
            Team::Blue => 1,
        }
    }

    /// sRGB colour from [`TEAM_PALETTE`].
    pub fn color(self) -> [u8; 3] {
        TEAM_PALETTE[self.index() % TEAM_PALETTE.len()]
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => write!(f, "red"),
            Team::Blue => write!(f, "blue"),
        }
    }
}
