//! Coordinates and directions.
//!
//! [`Coordinate`] is used both at map scale (global positions) and at
//! area scale (local tile positions, origin top-left).

use std::ops::Add;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Integer (x, y) pair, origin top-left, y growing south.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add<Direction> for Coordinate {
    type Output = Coordinate;

    fn add(self, direction: Direction) -> Coordinate {
        Coordinate::new(self.x + direction.dx(), self.y + direction.dy())
    }
}

impl Add<Coordinate> for Coordinate {
    type Output = Coordinate;

    fn add(self, other: Coordinate) -> Coordinate {
        Coordinate::new(self.x + other.x, self.y + other.y)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.x, self.y)
    }
}

/// Movement/attachment direction. `Center` is the no-op direction used
/// for the initial spawn placement.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum Direction {
    North,
    East,
    South,
    West,
    #[default]
    Center,
}

impl Direction {
    /// The four cardinal directions, in room-attachment order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn dx(&self) -> i32 {
        match self {
            Direction::East => 1,
            Direction::West => -1,
            _ => 0,
        }
    }

    pub const fn dy(&self) -> i32 {
        match self {
            Direction::North => -1,
            Direction::South => 1,
            _ => 0,
        }
    }

    /// East and West are the horizontal directions.
    pub const fn is_horizontal(&self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    pub const fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Center => Direction::Center,
        }
    }
}
