//! The playable map: a room matrix with hallway seams, the player
//! position on a global tile grid, and the movement loop.
//!
//! Rooms sit on an 8-tile pitch: 7 tiles of room plus a one-tile seam
//! for the hallway strip. A global position therefore resolves to a
//! room or hallway purely arithmetically; the seam intersection points
//! (both coordinates on a seam) belong to no area.

use serde::{Deserialize, Serialize};

use super::area::{Area, Visibility, MID_X, MID_Y, UNIT_WIDTH};
use super::rooms::{Hallway, Room};
use crate::errors::GenerateError;
use crate::events::EventStore;
use crate::logic::{Robot, StateVector};
use crate::navigation::{Coordinate, Direction};
use crate::tiles::{LevelEvent, Tile};

/// Maximum room-matrix width, in rooms.
pub const MAX_WIDTH: usize = 7;
/// Maximum room-matrix height, in rooms.
pub const MAX_HEIGHT: usize = 3;
/// Grid distance between the origins of adjacent rooms.
pub const PITCH: i32 = UNIT_WIDTH as i32 + 1;

static INVALID_TILE: Tile = Tile::Invalid;
static VOID_TILE: Tile = Tile::Void;

/// The area a global position falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaRef {
    /// Room-matrix position.
    Room(Coordinate),
    /// Index into the hallway arena.
    Hallway(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMap {
    name: String,
    seed: u64,
    /// `rooms[row][col]`; rows are padded to equal length.
    rooms: Vec<Vec<Option<Room>>>,
    hallways: Vec<Hallway>,
    robot: Robot,
    player_pos: Coordinate,
    current_area: AreaRef,
    reveal_all: bool,
    events: Vec<LevelEvent>,
    warnings: Vec<String>,
}

impl LevelMap {
    /// Assemble the map and place the player at the center of the
    /// spawn room.
    ///
    /// Every hallway must reference a room on both sides; a dangling
    /// one is a level-description defect and fails the build.
    pub fn new(
        name: &str,
        seed: u64,
        rooms: Vec<Vec<Option<Room>>>,
        hallways: Vec<Hallway>,
        robot: Robot,
        spawn_room: Coordinate,
        reveal_all: bool,
    ) -> Result<Self, GenerateError> {
        for (idx, hallway) in hallways.iter().enumerate() {
            if !hallway.both_connected() {
                return Err(GenerateError::UnresolvedHallway(format!(
                    "hallway {idx} (area {}) is connected on one side only",
                    hallway.area().id()
                )));
            }
        }

        let spawn_exists = rooms
            .get(spawn_room.y as usize)
            .and_then(|row| row.get(spawn_room.x as usize))
            .is_some_and(Option::is_some);
        if !spawn_exists {
            return Err(GenerateError::UnresolvedRoom(format!(
                "spawn room at {spawn_room}"
            )));
        }

        let player_pos = Coordinate::new(
            spawn_room.x * PITCH + MID_X as i32,
            spawn_room.y * PITCH + MID_Y as i32,
        );
        let mut map = Self {
            name: name.to_string(),
            seed,
            rooms,
            hallways,
            robot,
            player_pos,
            current_area: AreaRef::Room(spawn_room),
            reveal_all,
            events: Vec::new(),
            warnings: Vec::new(),
        };
        // Rooms revealed up front (declared visible) fog their
        // hallways in the same way an entered room does.
        let mut revealed = Vec::new();
        for (y, row) in map.rooms.iter().enumerate() {
            for (x, slot) in row.iter().enumerate() {
                if slot
                    .as_ref()
                    .is_some_and(|room| room.area().visibility() == Visibility::Visible)
                {
                    revealed.push(Coordinate::new(x as i32, y as i32));
                }
            }
        }
        for pos in revealed {
            map.reveal_room(pos);
        }
        map.enter_area(AreaRef::Room(spawn_room));
        Ok(map)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut Robot {
        &mut self.robot
    }

    pub fn player_pos(&self) -> Coordinate {
        self.player_pos
    }

    pub fn current_area(&self) -> AreaRef {
        self.current_area
    }

    pub fn set_reveal_all(&mut self, reveal_all: bool) {
        self.reveal_all = reveal_all;
    }

    /// Map width in tiles.
    pub fn width(&self) -> i32 {
        let cols = self.rooms.first().map(Vec::len).unwrap_or(0) as i32;
        (cols * PITCH - 1).max(0)
    }

    /// Map height in tiles.
    pub fn height(&self) -> i32 {
        let rows = self.rooms.len() as i32;
        (rows * PITCH - 1).max(0)
    }

    fn in_bounds(&self, pos: Coordinate) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width() && pos.y < self.height()
    }

    pub fn room_at(&self, pos: Coordinate) -> Option<&Room> {
        self.rooms
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
            .and_then(Option::as_ref)
    }

    fn room_at_mut(&mut self, pos: Coordinate) -> Option<&mut Room> {
        self.rooms
            .get_mut(pos.y as usize)
            .and_then(|row| row.get_mut(pos.x as usize))
            .and_then(Option::as_mut)
    }

    pub fn hallways(&self) -> &[Hallway] {
        &self.hallways
    }

    /// Resolve a global position to its owning area and the local tile
    /// position within it.
    ///
    /// Returns `None` outside the map, on a seam intersection point,
    /// and on a seam whose room has no hallway on that side.
    pub fn resolve(&self, pos: Coordinate) -> Option<(AreaRef, Coordinate)> {
        if !self.in_bounds(pos) {
            return None;
        }
        let (ux, xm) = (pos.x / PITCH, pos.x % PITCH);
        let (uy, ym) = (pos.y / PITCH, pos.y % PITCH);
        let seam_x = xm == PITCH - 1;
        let seam_y = ym == PITCH - 1;
        let room_pos = Coordinate::new(ux, uy);

        if seam_x && seam_y {
            return None;
        }
        if seam_x {
            let idx = self.room_at(room_pos)?.hallway(Direction::East)?;
            return Some((AreaRef::Hallway(idx), Coordinate::new(0, ym)));
        }
        if seam_y {
            let idx = self.room_at(room_pos)?.hallway(Direction::South)?;
            return Some((AreaRef::Hallway(idx), Coordinate::new(xm, 0)));
        }
        self.room_at(room_pos)?;
        Some((AreaRef::Room(room_pos), Coordinate::new(xm, ym)))
    }

    fn area_of(&self, aref: AreaRef) -> Option<&Area> {
        match aref {
            AreaRef::Room(pos) => self.room_at(pos).map(Room::area),
            AreaRef::Hallway(idx) => self.hallways.get(idx).map(Hallway::area),
        }
    }

    /// The real tile at an already resolved position.
    fn tile_ref(&self, aref: AreaRef, local: Coordinate) -> &Tile {
        match self.area_of(aref) {
            Some(area) => area.at(local.x as usize, local.y as usize, true, false),
            None => &INVALID_TILE,
        }
    }

    fn tile_mut(&mut self, aref: AreaRef, local: Coordinate) -> Option<&mut Tile> {
        let area = match aref {
            AreaRef::Room(pos) => self.room_at_mut(pos).map(Room::area_mut),
            AreaRef::Hallway(idx) => self.hallways.get_mut(idx).map(Hallway::area_mut),
        };
        area.and_then(|area| area.tile_mut(local.x as usize, local.y as usize))
    }

    /// The tile at a global position as the player sees it. Seam
    /// points without a hallway read as void, positions outside the
    /// map as invalid.
    pub fn tile_at(&self, pos: Coordinate) -> &Tile {
        if !self.in_bounds(pos) {
            return &INVALID_TILE;
        }
        match self.resolve(pos) {
            Some((aref, local)) => match self.area_of(aref) {
                Some(area) => {
                    area.at(local.x as usize, local.y as usize, false, self.reveal_all)
                }
                None => &INVALID_TILE,
            },
            None => &VOID_TILE,
        }
    }

    /// Try to move the player one step.
    ///
    /// The move is rejected (returning `false`, position unchanged) if
    /// the target is outside any area or the target tile refuses the
    /// step. On success the target tile's effects run and any raised
    /// interactions are queued.
    pub fn move_player(&mut self, direction: Direction, events: &mut dyn EventStore) -> bool {
        let target = self.player_pos + direction;
        let Some((aref, local)) = self.resolve(target) else {
            return false;
        };
        if !self
            .tile_ref(aref, local)
            .is_walkable(direction, &self.robot, events)
        {
            return false;
        }

        if aref != self.current_area {
            self.leave_area(direction);
            self.enter_area(aref);
        }

        let mut out = Vec::new();
        let mut robot = std::mem::take(&mut self.robot);
        if let Some(tile) = self.tile_mut(aref, local) {
            tile.on_walk(direction, &mut robot, events, &mut out);
        }
        self.robot = robot;
        self.events.append(&mut out);
        self.player_pos = target;
        true
    }

    /// Notify the departed area before its successor is entered.
    fn leave_area(&mut self, direction: Direction) {
        match self.current_area {
            AreaRef::Room(pos) => {
                if let Some(room) = self.room_at_mut(pos) {
                    room.area_mut().leave(direction);
                }
            }
            AreaRef::Hallway(idx) => {
                if let Some(hallway) = self.hallways.get_mut(idx) {
                    hallway.area_mut().leave(direction);
                }
            }
        }
    }

    /// Bring a hallway into sight: the one-tile strip shows fully and
    /// the rooms on both of its ends fog in.
    fn hallway_in_sight(&mut self, idx: usize) {
        let mut sides = [None, None];
        if let Some(hallway) = self.hallways.get_mut(idx) {
            hallway.area_mut().make_visible();
            sides = [hallway.room(true), hallway.room(false)];
        }
        for pos in sides.into_iter().flatten() {
            if let Some(room) = self.room_at_mut(pos) {
                room.area_mut().make_in_sight();
            }
        }
    }

    /// Reveal a room and bring its attached hallways into sight. The
    /// cascade stops at the fogged rooms beyond those hallways.
    fn reveal_room(&mut self, pos: Coordinate) {
        let mut attached = Vec::new();
        if let Some(room) = self.room_at_mut(pos) {
            room.area_mut().make_visible();
            attached = room.hallway_indices();
        }
        for idx in attached {
            self.hallway_in_sight(idx);
        }
    }

    /// Visibility bookkeeping when the player crosses an area border.
    /// Entering a room reveals it; entering a hallway reveals the
    /// rooms on both sides (the door is open, both ends show).
    fn enter_area(&mut self, aref: AreaRef) {
        match aref {
            AreaRef::Room(pos) => {
                if let Some(room) = self.room_at_mut(pos) {
                    room.area_mut().enter();
                }
                self.reveal_room(pos);
            }
            AreaRef::Hallway(idx) => {
                let mut sides = [None, None];
                if let Some(hallway) = self.hallways.get_mut(idx) {
                    hallway.area_mut().enter();
                    sides = [hallway.room(true), hallway.room(false)];
                }
                for pos in sides.into_iter().flatten() {
                    self.reveal_room(pos);
                }
            }
        }
        self.current_area = aref;
    }

    /// Report the outcome of the fight the player is standing on.
    ///
    /// Victory clears the enemy's whole group and grants its reward;
    /// defeat records the outcome and leaves the enemies in place.
    pub fn resolve_fight(&mut self, victory: bool) {
        let Some((AreaRef::Room(room_pos), local)) = self.resolve(self.player_pos) else {
            return;
        };
        let fought = self.room_at(room_pos).and_then(|room| {
            match room.area().tile(local.x as usize, local.y as usize) {
                Some(Tile::Enemy { group, reward, .. }) => Some((*group, reward.clone())),
                _ => None,
            }
        });
        let Some((group, reward)) = fought else {
            return;
        };
        if let Some(room) = self.room_at_mut(room_pos) {
            room.resolve_group(group, local, victory);
        }
        if victory {
            self.robot.give(reward);
        }
    }

    /// Submit an answer to the riddle the player is standing on.
    /// `None` when there is no riddler underfoot.
    pub fn attempt_riddle(&mut self, candidate: &StateVector) -> Option<bool> {
        let (aref, local) = self.resolve(self.player_pos)?;
        let mut reward = None;
        let solved = match self.tile_mut(aref, local)? {
            Tile::Riddler { riddle, .. } => {
                let solved = riddle.attempt(candidate);
                if solved {
                    reward = Some(riddle.reward().clone());
                }
                solved
            }
            _ => return None,
        };
        if let Some(reward) = reward {
            self.robot.give(reward);
        }
        Some(solved)
    }

    /// Buy item `index` from the shopkeeper the player is standing on.
    pub fn buy(&mut self, index: usize) -> bool {
        let Some((aref, local)) = self.resolve(self.player_pos) else {
            return false;
        };
        let mut robot = std::mem::take(&mut self.robot);
        let bought = match self.tile_mut(aref, local) {
            Some(Tile::ShopKeeper { inventory, .. }) if index < inventory.len() => {
                let price = inventory[index].price.max(0) as u32;
                if robot.spend(price) {
                    let item = inventory.remove(index);
                    robot.give(item.collectible);
                    true
                } else {
                    false
                }
            }
            _ => false,
        };
        self.robot = robot;
        bought
    }

    /// Drain the queued interactions raised since the last call.
    pub fn take_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn extend_warnings(&mut self, warnings: Vec<String>) {
        self.warnings.extend(warnings);
    }
}
