//! Rooms and hallways.
//!
//! A room is a walled `UNIT_WIDTH x UNIT_HEIGHT` area with up to four
//! attached hallways, one per cardinal direction. A hallway is a
//! one-tile strip holding a single door; it references the rooms on
//! its two sides by their position in the map's room matrix.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::area::{
    Area, INNER_HEIGHT, INNER_WIDTH, MID_X, MID_Y, UNIT_HEIGHT, UNIT_WIDTH,
};
use crate::errors::DrawError;
use crate::logic::{EnemyFactory, Robot};
use crate::navigation::{Coordinate, Direction};
use crate::rng::SeededRng;
use crate::tiles::{Door, Tile};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize, Deserialize,
)]
pub enum RoomKind {
    Spawn,
    Wild,
    Gate,
    Riddle,
    Shop,
    Treasure,
    Boss,
    #[default]
    Custom,
    /// Reserves a grid slot without content.
    Placeholder,
}

impl RoomKind {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            RoomKind::Spawn => "SR",
            RoomKind::Wild => "WR",
            RoomKind::Gate => "GR",
            RoomKind::Riddle => "RR",
            RoomKind::Shop => "$R",
            RoomKind::Treasure => "TR",
            RoomKind::Boss => "BR",
            RoomKind::Custom => "CR",
            RoomKind::Placeholder => "_R",
        }
    }

    pub fn from_abbreviation(code: &str) -> Option<RoomKind> {
        match code {
            "SR" => Some(RoomKind::Spawn),
            "WR" => Some(RoomKind::Wild),
            "GR" => Some(RoomKind::Gate),
            "RR" => Some(RoomKind::Riddle),
            "$R" => Some(RoomKind::Shop),
            "TR" => Some(RoomKind::Treasure),
            "BR" => Some(RoomKind::Boss),
            "CR" => Some(RoomKind::Custom),
            "_R" => Some(RoomKind::Placeholder),
            _ => None,
        }
    }
}

/// Enemies sharing a group id within one room. They resolve together:
/// one fight decides the fate of every member.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnemyGroup {
    members: Vec<Coordinate>,
    outcome: Option<bool>,
}

impl EnemyGroup {
    pub fn members(&self) -> &[Coordinate] {
        &self.members
    }

    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }
}

fn cardinal_index(direction: Direction) -> Option<usize> {
    Direction::CARDINALS.iter().position(|d| *d == direction)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    area: Area,
    kind: RoomKind,
    /// Hallway arena indices, one slot per cardinal direction.
    hallways: [Option<usize>; 4],
    /// Enemy groups by id; id 0 (solitary) is never listed here.
    groups: HashMap<u8, EnemyGroup>,
}

impl Room {
    /// Number of shared enemy group ids (1 through `GROUP_COUNT`).
    pub const GROUP_COUNT: u8 = 4;

    /// Build a room from its interior. `inner` holds at most
    /// `INNER_HEIGHT` rows of at most `INNER_WIDTH` tiles; missing
    /// tiles become floor. The wall fence is added around it.
    pub fn new(id: u32, kind: RoomKind, inner: Vec<Vec<Tile>>) -> Self {
        let mut tiles = vec![vec![Tile::Wall; UNIT_WIDTH]; UNIT_HEIGHT];
        for row in tiles.iter_mut().skip(1).take(INNER_HEIGHT) {
            for tile in row.iter_mut().skip(1).take(INNER_WIDTH) {
                *tile = Tile::Floor;
            }
        }
        for (y, row) in inner.into_iter().take(INNER_HEIGHT).enumerate() {
            for (x, tile) in row.into_iter().take(INNER_WIDTH).enumerate() {
                tiles[y + 1][x + 1] = tile;
            }
        }

        let mut room = Self {
            area: Area::new(id, tiles),
            kind,
            hallways: [None; 4],
            groups: HashMap::new(),
        };
        room.index_groups();
        room
    }

    /// A fully procedural room: enemies scattered over the interior.
    ///
    /// The enemy count is `chance` times the interior size, rounded
    /// down or up by a single coin flip regardless of the fraction.
    /// Positions are drawn without replacement; each enemy gets a
    /// random group id (0 = solitary) and a target/reward from
    /// `factory`.
    pub fn wild(
        id: u32,
        factory: &mut EnemyFactory,
        chance: f64,
        robot: &Robot,
        rng: &mut SeededRng,
    ) -> Result<Self, DrawError> {
        let interior = (INNER_WIDTH * INNER_HEIGHT) as f64;
        let expected = interior * chance.clamp(0.0, 1.0);
        let count = if rng.real() < 0.5 {
            expected.floor()
        } else {
            expected.ceil()
        } as usize;
        let count = count.min(INNER_WIDTH * INNER_HEIGHT);

        let mut open: Vec<Coordinate> = (0..INNER_HEIGHT as i32)
            .flat_map(|y| (0..INNER_WIDTH as i32).map(move |x| Coordinate::new(x, y)))
            .collect();

        let mut inner = vec![vec![Tile::Floor; INNER_WIDTH]; INNER_HEIGHT];
        for _ in 0..count {
            let pos = rng.remove_element(&mut open)?;
            let group = rng.int(0, i64::from(Self::GROUP_COUNT) + 1) as u8;
            let target = factory.produce_target(robot, rng);
            let reward = factory.produce_reward(rng)?;
            inner[pos.y as usize][pos.x as usize] = Tile::enemy(group, target, reward);
        }
        Ok(Self::new(id, RoomKind::Wild, inner))
    }

    fn index_groups(&mut self) {
        self.groups.clear();
        for y in 0..UNIT_HEIGHT {
            for x in 0..UNIT_WIDTH {
                if let Some(Tile::Enemy { group, .. }) = self.area.tile(x, y) {
                    if *group > 0 {
                        self.groups
                            .entry(*group)
                            .or_default()
                            .members
                            .push(Coordinate::new(x as i32, y as i32));
                    }
                }
            }
        }
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn area_mut(&mut self) -> &mut Area {
        &mut self.area
    }

    pub fn id(&self) -> u32 {
        self.area.id()
    }

    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    pub fn hallway(&self, direction: Direction) -> Option<usize> {
        cardinal_index(direction).and_then(|i| self.hallways[i])
    }

    pub fn hallway_indices(&self) -> Vec<usize> {
        self.hallways.iter().flatten().copied().collect()
    }

    /// Wire a hallway to one side and carve the wall opening towards
    /// it. Fails if the side is already taken or `direction` is not a
    /// cardinal.
    pub fn attach_hallway(&mut self, direction: Direction, hallway: usize) -> bool {
        let Some(slot) = cardinal_index(direction) else {
            return false;
        };
        if self.hallways[slot].is_some() {
            return false;
        }
        self.hallways[slot] = Some(hallway);
        let (x, y) = match direction {
            Direction::North => (MID_X, 0),
            Direction::East => (UNIT_WIDTH - 1, MID_Y),
            Direction::South => (MID_X, UNIT_HEIGHT - 1),
            Direction::West => (0, MID_Y),
            Direction::Center => return false,
        };
        self.area.set_tile(x, y, Tile::Floor);
        true
    }

    pub fn group(&self, id: u8) -> Option<&EnemyGroup> {
        self.groups.get(&id)
    }

    /// Settle a fight fought at local position `at`.
    ///
    /// Group 0 resolves only the fought tile; a shared group records
    /// the outcome for all members. Victory clears the enemy tiles.
    pub fn resolve_group(&mut self, group: u8, at: Coordinate, victory: bool) {
        if group == 0 {
            if victory {
                self.area.set_tile(at.x as usize, at.y as usize, Tile::Floor);
            }
            return;
        }
        let members = match self.groups.get_mut(&group) {
            Some(entry) => {
                entry.outcome = Some(victory);
                entry.members.clone()
            }
            None => return,
        };
        if victory {
            for member in members {
                self.area
                    .set_tile(member.x as usize, member.y as usize, Tile::Floor);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hallway {
    area: Area,
    door_direction: Direction,
    /// Room-matrix positions of the two sides; slot 0 is the room
    /// north or west of the hallway.
    rooms: [Option<Coordinate>; 2],
}

impl Hallway {
    /// Build the one-tile strip around `door`. A door facing east or
    /// west connects rooms side by side, so the strip runs vertically;
    /// otherwise it runs horizontally.
    pub fn new(id: u32, door: Door) -> Self {
        let door_direction = door.direction();
        let strip = vec![
            Tile::Void,
            Tile::Void,
            Tile::Wall,
            Tile::Door(door),
            Tile::Wall,
            Tile::Void,
            Tile::Void,
        ];
        let tiles = if door_direction.is_horizontal() {
            strip.into_iter().map(|tile| vec![tile]).collect()
        } else {
            vec![strip]
        };
        Self {
            area: Area::new(id, tiles),
            door_direction,
            rooms: [None; 2],
        }
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn area_mut(&mut self) -> &mut Area {
        &mut self.area
    }

    pub fn door_direction(&self) -> Direction {
        self.door_direction
    }

    /// Whether this hallway sits between two horizontally adjacent
    /// rooms.
    pub fn connects_horizontally(&self) -> bool {
        self.door_direction.is_horizontal()
    }

    /// Whether a room reaching the hallway via `direction` occupies
    /// the first slot (the north/west side).
    pub fn is_first(direction: Direction) -> bool {
        matches!(direction, Direction::East | Direction::South)
    }

    /// Register the room at `room_pos` as one side of the hallway;
    /// `direction` is the attachment direction from the room's view.
    pub fn set_room(&mut self, room_pos: Coordinate, direction: Direction) {
        let slot = if Self::is_first(direction) { 0 } else { 1 };
        self.rooms[slot] = Some(room_pos);
    }

    pub fn room(&self, first: bool) -> Option<Coordinate> {
        self.rooms[if first { 0 } else { 1 }]
    }

    pub fn both_connected(&self) -> bool {
        self.rooms.iter().all(Option::is_some)
    }

    /// The door tile of the strip.
    pub fn door(&self) -> Option<&Door> {
        let (x, y) = if self.connects_horizontally() {
            (0, MID_Y)
        } else {
            (MID_X, 0)
        };
        match self.area.tile(x, y) {
            Some(Tile::Door(door)) => Some(door),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectibles::factory::CollectibleFactory;
    use crate::collectibles::Collectible;
    use crate::logic::ExplicitTargetDifficulty;

    fn empty_room(kind: RoomKind) -> Room {
        Room::new(0, kind, vec![])
    }

    #[test]
    fn test_room_is_fenced() {
        let room = empty_room(RoomKind::Spawn);
        for x in 0..UNIT_WIDTH {
            assert_eq!(*room.area().at(x, 0, true, false), Tile::Wall);
            assert_eq!(*room.area().at(x, UNIT_HEIGHT - 1, true, false), Tile::Wall);
        }
        for y in 1..UNIT_HEIGHT - 1 {
            assert_eq!(*room.area().at(0, y, true, false), Tile::Wall);
            assert_eq!(*room.area().at(UNIT_WIDTH - 1, y, true, false), Tile::Wall);
            for x in 1..UNIT_WIDTH - 1 {
                assert_eq!(*room.area().at(x, y, true, false), Tile::Floor);
            }
        }
    }

    #[test]
    fn test_attach_hallway_carves_opening() {
        let mut room = empty_room(RoomKind::Wild);
        assert!(room.attach_hallway(Direction::East, 3));
        assert_eq!(room.hallway(Direction::East), Some(3));
        assert_eq!(
            *room.area().at(UNIT_WIDTH - 1, MID_Y, true, false),
            Tile::Floor
        );
        // The side is taken now.
        assert!(!room.attach_hallway(Direction::East, 4));
    }

    #[test]
    fn test_group_resolution() {
        use crate::logic::StateVector;

        let mut inner = vec![vec![Tile::Floor; INNER_WIDTH]; INNER_HEIGHT];
        inner[0][0] = Tile::enemy(2, StateVector::basis(1), Collectible::Coin(1));
        inner[0][2] = Tile::enemy(2, StateVector::basis(1), Collectible::Coin(1));
        inner[2][2] = Tile::enemy(0, StateVector::basis(1), Collectible::Coin(1));
        let mut room = Room::new(7, RoomKind::Wild, inner);

        let group = room.group(2).unwrap();
        assert_eq!(group.members().len(), 2);
        assert_eq!(group.outcome(), None);

        room.resolve_group(2, Coordinate::new(1, 1), true);
        assert_eq!(room.group(2).unwrap().outcome(), Some(true));
        assert_eq!(*room.area().at(1, 1, true, false), Tile::Floor);
        assert_eq!(*room.area().at(3, 1, true, false), Tile::Floor);
        // The solitary enemy is untouched.
        assert!(matches!(
            room.area().at(3, 3, true, false),
            Tile::Enemy { .. }
        ));
    }

    #[test]
    fn test_wild_room_full_chance() {
        let rewards = CollectibleFactory::new(vec![Collectible::Coin(1)]);
        let difficulty = ExplicitTargetDifficulty::new(vec![], rewards, false);
        let mut factory = EnemyFactory::new(difficulty);
        let robot = Robot::new(1, vec![]);
        let mut rng = SeededRng::new(99);

        let room = Room::wild(1, &mut factory, 1.0, &robot, &mut rng).unwrap();
        let mut enemies = 0;
        for y in 1..UNIT_HEIGHT - 1 {
            for x in 1..UNIT_WIDTH - 1 {
                if let Tile::Enemy { group, .. } = room.area().at(x, y, true, false) {
                    assert!(*group <= Room::GROUP_COUNT);
                    enemies += 1;
                }
            }
        }
        assert_eq!(enemies, INNER_WIDTH * INNER_HEIGHT);
    }

    #[test]
    fn test_wild_room_rounds_fraction_with_a_coin_flip() {
        // chance 0.004 over the 25-tile interior expects 0.1 enemies,
        // so every room holds 0 or 1 and the rate of 1s must sit near
        // one half, not near the fraction.
        let mut ones = 0;
        for seed in 0..400 {
            let rewards = CollectibleFactory::new(vec![Collectible::Coin(1)]);
            let difficulty = ExplicitTargetDifficulty::new(vec![], rewards, false);
            let mut factory = EnemyFactory::new(difficulty);
            let robot = Robot::new(1, vec![]);
            let mut rng = SeededRng::new(seed);

            let room = Room::wild(1, &mut factory, 0.004, &robot, &mut rng).unwrap();
            let mut enemies = 0;
            for y in 1..UNIT_HEIGHT - 1 {
                for x in 1..UNIT_WIDTH - 1 {
                    if matches!(room.area().at(x, y, true, false), Tile::Enemy { .. }) {
                        enemies += 1;
                    }
                }
            }
            assert!(enemies <= 1);
            ones += enemies;
        }
        assert!((140..=260).contains(&ones), "round-up count {ones} of 400");
    }

    #[test]
    fn test_hallway_orientation() {
        let east = Hallway::new(0, Door::new(Direction::East));
        assert!(east.connects_horizontally());
        assert_eq!(east.area().width(), 1);
        assert_eq!(east.area().height(), UNIT_HEIGHT);
        assert!(east.door().is_some());

        let south = Hallway::new(1, Door::new(Direction::South));
        assert!(!south.connects_horizontally());
        assert_eq!(south.area().width(), UNIT_WIDTH);
        assert_eq!(south.area().height(), 1);
        assert!(south.door().is_some());
    }

    #[test]
    fn test_hallway_room_slots() {
        let mut hallway = Hallway::new(0, Door::new(Direction::East));
        // The west room reaches the hallway heading east.
        hallway.set_room(Coordinate::new(0, 0), Direction::East);
        hallway.set_room(Coordinate::new(1, 0), Direction::West);
        assert_eq!(hallway.room(true), Some(Coordinate::new(0, 0)));
        assert_eq!(hallway.room(false), Some(Coordinate::new(1, 0)));
        assert!(hallway.both_connected());
    }
}
