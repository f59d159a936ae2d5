//! Areas: rectangular tile patches with a shared visibility state.
//!
//! Rooms are `UNIT_WIDTH x UNIT_HEIGHT` areas; hallways are one-tile
//! strips. Visibility works at area granularity: a whole area is
//! either unknown, fogged, or fully shown.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::navigation::Direction;
use crate::tiles::Tile;

/// Width of a room in tiles.
pub const UNIT_WIDTH: usize = 7;
/// Height of a room in tiles.
pub const UNIT_HEIGHT: usize = 7;
/// Column of a room's vertical midline (door openings north/south).
pub const MID_X: usize = UNIT_WIDTH / 2;
/// Row of a room's horizontal midline (door openings east/west).
pub const MID_Y: usize = UNIT_HEIGHT / 2;
/// Width of the room interior inside the wall fence.
pub const INNER_WIDTH: usize = UNIT_WIDTH - 2;
/// Height of the room interior inside the wall fence.
pub const INNER_HEIGHT: usize = UNIT_HEIGHT - 2;

static INVALID_TILE: Tile = Tile::Invalid;
static VOID_TILE: Tile = Tile::Void;
static FOG_TILE: Tile = Tile::FogOfWar;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct AreaFlags: u8 {
        /// Adjacent to a visited area; rendered as fog.
        const IN_SIGHT = 1 << 0;
        /// Fully revealed.
        const VISIBLE = 1 << 1;
        /// The player has stood inside at least once.
        const VISITED = 1 << 2;
    }
}

/// How much of an area the player currently sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Nothing; the area reads as empty space.
    Void,
    /// Outline only; tiles are fogged.
    InSight,
    /// Everything.
    Visible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    id: u32,
    /// Row-major, `tiles[y][x]`.
    tiles: Vec<Vec<Tile>>,
    flags: AreaFlags,
}

impl Area {
    pub fn new(id: u32, tiles: Vec<Vec<Tile>>) -> Self {
        Self {
            id,
            tiles,
            flags: AreaFlags::empty(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn width(&self) -> usize {
        self.tiles.first().map(Vec::len).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.tiles.len()
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.tiles
    }

    pub fn visibility(&self) -> Visibility {
        if self.flags.contains(AreaFlags::VISIBLE) {
            Visibility::Visible
        } else if self.flags.contains(AreaFlags::IN_SIGHT) {
            Visibility::InSight
        } else {
            Visibility::Void
        }
    }

    pub fn is_visited(&self) -> bool {
        self.flags.contains(AreaFlags::VISITED)
    }

    /// Reveal the area. Visibility only ever increases.
    pub fn make_visible(&mut self) {
        self.flags |= AreaFlags::VISIBLE | AreaFlags::IN_SIGHT;
    }

    /// Put the area in sight (fogged). Never downgrades a visible area.
    pub fn make_in_sight(&mut self) {
        self.flags |= AreaFlags::IN_SIGHT;
    }

    /// The player stepped into the area.
    pub fn enter(&mut self) {
        self.flags |= AreaFlags::VISITED;
        self.make_visible();
    }

    /// The player stepped out of the area heading `direction`. The
    /// transition counterpart of `enter`; areas keep no per-exit state,
    /// so the visibility flags stay as they are.
    pub fn leave(&mut self, _direction: Direction) {}

    /// The tile at local `(x, y)` as the player sees it.
    ///
    /// `force` bypasses the visibility filter (movement logic needs the
    /// real tile); `reveal_all` is the map-wide debug switch.
    pub fn at(&self, x: usize, y: usize, force: bool, reveal_all: bool) -> &Tile {
        let Some(tile) = self.tiles.get(y).and_then(|row| row.get(x)) else {
            return &INVALID_TILE;
        };
        if force || reveal_all {
            return tile;
        }
        match self.visibility() {
            Visibility::Void => &VOID_TILE,
            Visibility::InSight => &FOG_TILE,
            Visibility::Visible => tile,
        }
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        self.tiles.get(y).and_then(|row| row.get(x))
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(y).and_then(|row| row.get_mut(x))
    }

    pub fn set_tile(&mut self, x: usize, y: usize, tile: Tile) {
        if let Some(slot) = self.tile_mut(x, y) {
            *slot = tile;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_area() -> Area {
        Area::new(0, vec![vec![Tile::Floor; UNIT_WIDTH]; UNIT_HEIGHT])
    }

    #[test]
    fn test_visibility_progression() {
        let mut area = floor_area();
        assert_eq!(area.visibility(), Visibility::Void);
        assert_eq!(*area.at(3, 3, false, false), Tile::Void);

        area.make_in_sight();
        assert_eq!(area.visibility(), Visibility::InSight);
        assert_eq!(*area.at(3, 3, false, false), Tile::FogOfWar);

        area.enter();
        assert_eq!(area.visibility(), Visibility::Visible);
        assert!(area.is_visited());
        assert_eq!(*area.at(3, 3, false, false), Tile::Floor);
    }

    #[test]
    fn test_leave_keeps_visibility_and_visited() {
        let mut area = floor_area();
        area.enter();
        area.leave(Direction::East);
        assert_eq!(area.visibility(), Visibility::Visible);
        assert!(area.is_visited());
    }

    #[test]
    fn test_in_sight_never_downgrades() {
        let mut area = floor_area();
        area.make_visible();
        area.make_in_sight();
        assert_eq!(area.visibility(), Visibility::Visible);
    }

    #[test]
    fn test_force_and_reveal_all_bypass_fog() {
        let area = floor_area();
        assert_eq!(*area.at(0, 0, true, false), Tile::Floor);
        assert_eq!(*area.at(0, 0, false, true), Tile::Floor);
    }

    #[test]
    fn test_out_of_bounds_is_invalid() {
        let area = floor_area();
        assert_eq!(*area.at(UNIT_WIDTH, 0, true, false), Tile::Invalid);
    }
}
