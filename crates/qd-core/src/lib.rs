//! qd-core: level generation and navigation core for a quantum dungeon crawler
//!
//! This crate contains the seed-reproducible content engine, the spatial
//! Room/Hallway graph with fog-of-war visibility, and the level builder
//! that assembles a playable map from a parsed level description.
//! It has no I/O or rendering dependencies and is designed to be pure
//! and testable; the grammar front end, the amplitude simulator and the
//! achievement store are consumed through trait boundaries.

pub mod collectibles;
pub mod dungeon;
pub mod errors;
pub mod events;
pub mod generator;
pub mod logic;
pub mod navigation;
pub mod rng;
pub mod tiles;

pub use dungeon::map::LevelMap;
pub use errors::{DrawError, GenerateError};
pub use generator::LevelGenerator;
pub use navigation::{Coordinate, Direction};
pub use rng::SeededRng;
