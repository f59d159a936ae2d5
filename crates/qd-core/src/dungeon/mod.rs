//! The spatial level structure: areas on a unit grid, rooms and the
//! hallways between them, and the playable map on top.

pub mod area;
pub mod map;
pub mod rooms;

pub use area::{Area, AreaFlags, Visibility};
pub use map::LevelMap;
pub use rooms::{EnemyGroup, Hallway, Room, RoomKind};
