//! Bundled sample arena.
//!
//! The warehouse arena is the default scene for the visualizer and the
//! reference data set for tests across the workspace.
//!
//! # Example
//!
//! ```
//! use arena::fixtures;
//!
//! let arena = fixtures::warehouse();
//! assert_eq!(arena.agent_count(), 5);
//! assert_eq!(arena.span(), 32);
//! ```

use crate::descriptor::{Arena, ArenaDescriptor};

/// Raw JSON of the warehouse descriptor.
pub const WAREHOUSE_JSON: &str = include_str!("../tests/fixtures/warehouse.json");

/// Returns the raw warehouse descriptor.
///
/// A 17x17 grid with a walled perimeter, interior shelving and five agents
/// whose routes overlap in the west corridor and along row 15.
pub fn warehouse_descriptor() -> ArenaDescriptor {
    ArenaDescriptor::from_json_str(WAREHOUSE_JSON).expect("Failed to parse warehouse.json")
}

/// Returns the validated warehouse arena.
pub fn warehouse() -> Arena {
    Arena::from_descriptor(warehouse_descriptor()).expect("warehouse.json failed validation")
}
