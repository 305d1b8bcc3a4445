//! Arena data types for grid-path playback.
//!
//! This crate contains pure data structures with no playback logic and no
//! rendering. It is a dependency for all other crates in the workspace.

pub mod descriptor;
pub mod fixtures;
pub mod grid;
pub mod layout;
pub mod state;
pub mod team;

// Re-export grid types
pub use grid::{centering_offset, AgentId, AgentPath, EmptyPathError, GridPoint};

// Re-export descriptor types
pub use descriptor::{Arena, ArenaDescriptor, ArenaError};

// Re-export layout types
pub use layout::{Block, BlockKind, MapLayout, FLOOR_MARGIN, FLOOR_THICKNESS};

// Re-export state types
pub use state::{AgentState, WorldPoint};

// Re-export team types
pub use team::{Team, TEAM_PALETTE};
