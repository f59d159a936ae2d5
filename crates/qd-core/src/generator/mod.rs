//! Turns a parsed level description into a playable map.
//!
//! Construction follows a fixed order so that the same seed and source
//! always produce the same level: robot, messages, reward pools,
//! state-vector pools, hallways, rooms, layout. Defects in the source
//! that have a sensible fallback (unknown references, malformed
//! entries, oversized layouts) are repaired and recorded as warnings;
//! only structural problems fail the build.

pub mod source;

use std::collections::HashMap;

use source::{
    CollectibleDef, CollectibleDescriptor, DoorDef, DoorLockDef, EnemyDescriptor, LevelParser,
    LevelSource, PoolSelector, RewardSource, RiddleDescriptor, RoomDef, RoomVisibility,
    ShopDescriptor, StvSource,
};

use crate::collectibles::factory::{CollectibleFactory, ShopFactory};
use crate::collectibles::{Collectible, GateType};
use crate::dungeon::area::{INNER_HEIGHT, INNER_WIDTH};
use crate::dungeon::map::{MAX_HEIGHT, MAX_WIDTH};
use crate::dungeon::{Hallway, LevelMap, Room, RoomKind};
use crate::errors::{DrawError, GenerateError};
use crate::logic::{
    EnemyFactory, ExplicitTargetDifficulty, Message, Riddle, Robot, StateVector,
    TargetDifficulty,
};
use crate::navigation::{Coordinate, Direction};
use crate::rng::SeededRng;
use crate::tiles::{Door, DoorOpenState, Tile};

/// Enemy density of a wild room generated without a glyph grid.
const WILD_ENEMY_CHANCE: f64 = 0.6;
/// Energy amount of an energy glyph without a descriptor.
const DEFAULT_ENERGY: u32 = 10;
/// Inventory size of a shop glyph without a descriptor.
const DEFAULT_SHOP_ITEMS: i64 = 3;

pub struct LevelGenerator {
    seed: u64,
    reveal_all: bool,
}

impl LevelGenerator {
    pub fn new(seed: u64, reveal_all: bool) -> Self {
        Self { seed, reveal_all }
    }

    /// Parse `text` with the given front end and build the level.
    pub fn generate(
        &self,
        parser: &dyn LevelParser,
        text: &str,
    ) -> Result<LevelMap, GenerateError> {
        let source = parser.parse(text)?;
        self.generate_from_source(&source)
    }

    pub fn generate_from_source(&self, source: &LevelSource) -> Result<LevelMap, GenerateError> {
        Builder::new(self.seed, self.reveal_all, source).build()
    }
}

/// Per-kind cursors into a room's descriptor queues.
#[derive(Default)]
struct Queues {
    enemies: usize,
    collectibles: usize,
    triggers: usize,
    energies: usize,
    riddles: usize,
    shops: usize,
    messages: usize,
}

/// Advance a descriptor queue; an exhausted queue repeats its last
/// entry.
fn next_from<'t, T>(items: &'t [T], cursor: &mut usize) -> Option<&'t T> {
    if items.is_empty() {
        return None;
    }
    let idx = (*cursor).min(items.len() - 1);
    *cursor += 1;
    Some(&items[idx])
}

struct Builder<'a> {
    source: &'a LevelSource,
    seed: u64,
    reveal_all: bool,
    rng: SeededRng,
    warnings: Vec<String>,
    robot: Robot,
    messages: HashMap<String, Message>,
    reward_pools: HashMap<String, CollectibleFactory>,
    default_rewards: CollectibleFactory,
    stv_pools: HashMap<String, ExplicitTargetDifficulty>,
    default_enemies: EnemyFactory,
    doors: HashMap<String, Door>,
    room_defs: HashMap<String, &'a RoomDef>,
    next_area_id: u32,
}

impl<'a> Builder<'a> {
    fn new(seed: u64, reveal_all: bool, source: &'a LevelSource) -> Self {
        let placeholder_rewards = CollectibleFactory::new(vec![Collectible::Key(0)]);
        Self {
            source,
            seed,
            reveal_all,
            rng: SeededRng::new(seed),
            warnings: Vec::new(),
            robot: Robot::default(),
            messages: HashMap::new(),
            reward_pools: HashMap::new(),
            default_rewards: placeholder_rewards.clone(),
            stv_pools: HashMap::new(),
            default_enemies: EnemyFactory::new(ExplicitTargetDifficulty::new(
                vec![],
                placeholder_rewards,
                false,
            )),
            doors: HashMap::new(),
            room_defs: HashMap::new(),
            next_area_id: 0,
        }
    }

    fn build(mut self) -> Result<LevelMap, GenerateError> {
        self.load_robot();
        self.load_messages();
        self.load_reward_pools();
        self.load_stv_pools();
        self.load_hallways();
        self.load_room_defs();
        self.build_layout()
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_area_id;
        self.next_area_id += 1;
        id
    }

    fn load_gate(&mut self, name: &str) -> GateType {
        match name.to_ascii_lowercase().as_str() {
            "i" => GateType::I,
            "x" => GateType::X,
            "y" => GateType::Y,
            "z" => GateType::Z,
            "h" => GateType::H,
            "cx" | "cnot" => GateType::Cx,
            "swap" => GateType::Swap,
            other => {
                self.warn(format!("unknown gate '{other}', using the identity gate"));
                GateType::I
            }
        }
    }

    fn load_robot(&mut self) {
        let source = self.source;
        let gates = source
            .robot
            .gates
            .iter()
            .map(|name| self.load_gate(name))
            .collect();
        self.robot = Robot::new(source.robot.num_qubits, gates);
    }

    fn load_messages(&mut self) {
        let source = self.source;
        for def in &source.messages {
            if self.messages.contains_key(&def.id) {
                self.warn(format!("duplicate message '{}', keeping the later one", def.id));
            }
            let message = Message::new(
                &def.id,
                def.speaker.as_deref().unwrap_or(Message::DEFAULT_SPEAKER),
                &def.text,
                def.event_condition.clone(),
                def.alt_message.clone(),
            );
            self.messages.insert(def.id.clone(), message);
        }

        // Second pass: pull alternate texts in from the finished table.
        let ids: Vec<String> = self.messages.keys().cloned().collect();
        for id in ids {
            let alt_id = self
                .messages
                .get(&id)
                .and_then(|m| m.alt_message_ref())
                .map(str::to_string);
            let Some(alt_id) = alt_id else { continue };
            match self.messages.get(&alt_id).cloned() {
                Some(alt) => {
                    if let Some(message) = self.messages.get_mut(&id) {
                        message.resolve_alt(&alt);
                    }
                }
                None => self.warn(format!(
                    "message '{id}' references unknown alternate '{alt_id}'"
                )),
            }
        }
    }

    fn lookup_message(&mut self, id: &str) -> Message {
        let found = self.messages.get(id).cloned();
        match found {
            Some(message) => message,
            None => {
                self.warn(format!("unknown message '{id}'"));
                Message::error(&format!("[missing message '{id}']"))
            }
        }
    }

    fn load_collectible(&mut self, def: &CollectibleDef) -> Collectible {
        match def {
            CollectibleDef::Coin(amount) => Collectible::Coin(*amount),
            CollectibleDef::Key(count) => Collectible::Key(*count),
            CollectibleDef::Health(hp) => Collectible::Heart(*hp),
            CollectibleDef::Energy(amount) => Collectible::Energy(*amount),
            CollectibleDef::Qubit(count) => Collectible::Qubit(*count),
            CollectibleDef::Gate(name) => Collectible::Gate(self.load_gate(name)),
        }
    }

    /// Well-known pool names usable without a definition.
    fn builtin_pool(id: &str) -> Option<Vec<Collectible>> {
        match id {
            "coin" => Some(vec![
                Collectible::Coin(1),
                Collectible::Coin(2),
                Collectible::Coin(3),
            ]),
            "key" => Some(vec![Collectible::Key(1)]),
            "hp" | "health" => Some(vec![Collectible::Heart(1), Collectible::Heart(2)]),
            _ => None,
        }
    }

    fn load_reward_pools(&mut self) {
        let source = self.source;
        for def in &source.reward_pools.pools {
            let pool = def
                .collectibles
                .iter()
                .map(|c| self.load_collectible(c))
                .collect();
            if self.reward_pools.contains_key(&def.id) {
                self.warn(format!(
                    "duplicate reward pool '{}', keeping the later one",
                    def.id
                ));
            }
            self.reward_pools
                .insert(def.id.clone(), CollectibleFactory::with_strategy(pool, def.strategy));
        }
        self.default_rewards = self.resolve_reward_pool(&source.reward_pools.default);
    }

    fn resolve_reward_pool(&mut self, selector: &PoolSelector) -> CollectibleFactory {
        let defined = self.reward_pools.get(&selector.id).map(|f| f.pool().to_vec());
        let pool = match defined.or_else(|| Self::builtin_pool(&selector.id)) {
            Some(pool) => pool,
            None => {
                self.warn(format!(
                    "unknown reward pool '{}', falling back to a worthless key",
                    selector.id
                ));
                vec![Collectible::Key(0)]
            }
        };
        if selector.ordered {
            CollectibleFactory::ordered(pool)
        } else {
            CollectibleFactory::new(pool)
        }
    }

    /// Draw rewards from a named pool (or the default one), advancing
    /// that pool's cursor so ordered pools progress across the level.
    fn draw_rewards(
        &mut self,
        pool: Option<&str>,
        times: usize,
    ) -> Result<Vec<Collectible>, DrawError> {
        let Some(id) = pool else {
            return self.default_rewards.produce_multiple(&mut self.rng, times, false);
        };
        if let Some(factory) = self.reward_pools.get_mut(id) {
            return factory.produce_multiple(&mut self.rng, times, false);
        }
        if let Some(builtin) = Self::builtin_pool(id) {
            return CollectibleFactory::new(builtin).produce_multiple(&mut self.rng, times, false);
        }
        self.warn(format!(
            "unknown reward pool '{id}', falling back to a worthless key"
        ));
        Ok(vec![Collectible::Key(0); times])
    }

    fn load_stv_pools(&mut self) {
        let source = self.source;
        for def in &source.stv_pools.pools {
            let mut states = Vec::with_capacity(def.states.len());
            for amplitudes in &def.states {
                let stv = StateVector::new(amplitudes.clone());
                if stv.is_valid() {
                    states.push(stv);
                } else {
                    self.warn(format!(
                        "invalid state vector in pool '{}', using a basis state",
                        def.id
                    ));
                    states.push(StateVector::basis(self.robot.num_qubits()));
                }
            }
            let rewards = match &def.reward_pool {
                Some(id) => self.resolve_reward_pool(&PoolSelector {
                    id: id.clone(),
                    ordered: false,
                }),
                None => self.default_rewards.clone(),
            };
            if self.stv_pools.contains_key(&def.id) {
                self.warn(format!(
                    "duplicate state-vector pool '{}', keeping the later one",
                    def.id
                ));
            }
            self.stv_pools.insert(
                def.id.clone(),
                ExplicitTargetDifficulty::new(states, rewards, def.ordered),
            );
        }

        let default = &source.stv_pools.default;
        let difficulty = match self.stv_pools.get(&default.id).cloned() {
            Some(difficulty) => difficulty,
            None => {
                if !default.id.is_empty() {
                    self.warn(format!(
                        "unknown default state-vector pool '{}', enemies fall back to basis states",
                        default.id
                    ));
                }
                ExplicitTargetDifficulty::new(
                    vec![],
                    self.default_rewards.clone(),
                    default.ordered,
                )
            }
        };
        self.default_enemies = EnemyFactory::new(difficulty);
    }

    fn build_door(&mut self, def: &DoorDef) -> Door {
        let open_state = match def.lock {
            DoorLockDef::Open => DoorOpenState::Open,
            DoorLockDef::Closed => DoorOpenState::Closed,
            DoorLockDef::KeyLocked => DoorOpenState::KeyLocked,
            DoorLockDef::EventLocked => match &def.event_id {
                Some(id) => DoorOpenState::EventLocked(id.clone()),
                None => {
                    self.warn(
                        "event locked door without an event id, closing it instead".to_string(),
                    );
                    DoorOpenState::Closed
                }
            },
        };
        let mut door = Door::with_state(def.direction, open_state, def.one_way);
        if let Some(id) = &def.explanation {
            let message = self.lookup_message(id);
            door.set_explanation(message);
        }
        if let Some(event_id) = &def.trigger {
            door.set_event(event_id);
        }
        door
    }

    fn load_hallways(&mut self) {
        let source = self.source;
        for def in &source.hallways {
            if self.doors.contains_key(&def.id) {
                self.warn(format!("duplicate hallway '{}', keeping the later one", def.id));
            }
            let door = self.build_door(&def.door);
            self.doors.insert(def.id.clone(), door);
        }
    }

    fn load_room_defs(&mut self) {
        for def in &self.source.rooms {
            if self.room_defs.contains_key(&def.id) {
                self.warn(format!("duplicate room '{}', keeping the later one", def.id));
            }
            self.room_defs.insert(def.id.clone(), def);
        }
    }

    fn collectible_tile(&mut self, desc: &CollectibleDescriptor) -> Tile {
        let times = desc.times.max(1) as usize;
        match self.draw_rewards(desc.pool.as_deref(), times) {
            Ok(mut items) if items.len() == 1 => match items.pop() {
                Some(item) => Tile::collectible(item),
                None => Tile::Floor,
            },
            Ok(items) => Tile::collectible(Collectible::Multi(items)),
            Err(err) => {
                self.warn(format!("collectible tile could not be filled: {err}"));
                Tile::Floor
            }
        }
    }

    fn enemy_tile(&mut self, group: u8, desc: &EnemyDescriptor) -> Tile {
        let target = match desc.stv_pool.as_deref() {
            Some(id) => {
                let drawn = self
                    .stv_pools
                    .get_mut(id)
                    .map(|pool| pool.create_statevector(&self.robot, &mut self.rng));
                match drawn {
                    Some(target) => target,
                    None => {
                        self.warn(format!("unknown state-vector pool '{id}' for an enemy"));
                        StateVector::basis(self.robot.num_qubits())
                    }
                }
            }
            None => self.default_enemies.produce_target(&self.robot, &mut self.rng),
        };

        let reward = if desc.reward_pool.is_some() {
            self.draw_rewards(desc.reward_pool.as_deref(), 1)
                .map(|mut items| items.pop().unwrap_or(Collectible::Key(0)))
        } else if let Some(id) = desc.stv_pool.as_deref() {
            match self.stv_pools.get_mut(id) {
                Some(pool) => pool.produce_reward(&mut self.rng),
                None => self.default_enemies.produce_reward(&mut self.rng),
            }
        } else {
            self.default_enemies.produce_reward(&mut self.rng)
        };
        let reward = match reward {
            Ok(reward) => reward,
            Err(err) => {
                self.warn(format!("enemy reward could not be drawn: {err}"));
                Collectible::Key(0)
            }
        };
        Tile::enemy(group, target, reward)
    }

    fn riddler_tile(&mut self, desc: &RiddleDescriptor) -> Tile {
        let target = match &desc.target {
            StvSource::Explicit(amplitudes) => {
                let stv = StateVector::new(amplitudes.clone());
                if stv.is_valid() {
                    stv
                } else {
                    self.warn("invalid riddle target state, using a basis state".to_string());
                    StateVector::basis(self.robot.num_qubits())
                }
            }
            StvSource::Pool(id) => {
                let drawn = self
                    .stv_pools
                    .get_mut(id)
                    .map(|pool| pool.create_statevector(&self.robot, &mut self.rng));
                match drawn {
                    Some(target) => target,
                    None => {
                        self.warn(format!("unknown state-vector pool '{id}' for a riddle"));
                        StateVector::basis(self.robot.num_qubits())
                    }
                }
            }
        };
        let reward = match &desc.reward {
            RewardSource::Explicit(def) => self.load_collectible(def),
            RewardSource::Pool(id) => {
                let id = id.clone();
                match self.draw_rewards(Some(&id), 1) {
                    Ok(mut items) => items.pop().unwrap_or(Collectible::Key(0)),
                    Err(err) => {
                        self.warn(format!("riddle reward could not be drawn: {err}"));
                        Collectible::Key(0)
                    }
                }
            }
        };
        let attempts = desc.attempts.unwrap_or(Riddle::DEFAULT_ATTEMPTS);
        Tile::riddler(Riddle::new(target, reward, attempts))
    }

    fn shop_tile(&mut self, desc: Option<&ShopDescriptor>) -> Tile {
        let (pool, num_items) = match desc {
            Some(desc) => (desc.pool.clone(), desc.num_items),
            None => (None, DEFAULT_SHOP_ITEMS),
        };
        let common = match pool.as_deref() {
            Some(id) => {
                let defined = self.reward_pools.get(id).map(|f| f.pool().to_vec());
                match defined.or_else(|| Self::builtin_pool(id)) {
                    Some(pool) => pool,
                    None => {
                        self.warn(format!("unknown reward pool '{id}' for a shop"));
                        vec![Collectible::Key(0)]
                    }
                }
            }
            None => self.default_rewards.pool().to_vec(),
        };
        let num_items = num_items.max(1);
        let factory = ShopFactory::new(common, vec![], 0, num_items, num_items + 1, false);
        match factory.produce(&mut self.rng, num_items) {
            Ok(inventory) => Tile::shop_keeper(inventory),
            Err(err) => {
                self.warn(format!("shop could not be stocked: {err}"));
                Tile::Floor
            }
        }
    }

    fn build_tile(&mut self, def: &'a RoomDef, glyph: char, queues: &mut Queues) -> Tile {
        match glyph {
            '_' | ' ' => Tile::Floor,
            'o' => Tile::Obstacle,
            'c' => {
                let desc = next_from(&def.collectibles, &mut queues.collectibles)
                    .cloned()
                    .unwrap_or_default();
                self.collectible_tile(&desc)
            }
            'e' => {
                let amount = next_from(&def.energies, &mut queues.energies)
                    .copied()
                    .unwrap_or(DEFAULT_ENERGY);
                Tile::collectible(Collectible::Energy(amount))
            }
            't' => match next_from(&def.triggers, &mut queues.triggers).cloned() {
                Some(event_id) => Tile::trigger(&event_id),
                None => {
                    self.warn(format!(
                        "trigger glyph in room '{}' without an event, placing floor",
                        def.id
                    ));
                    Tile::Floor
                }
            },
            'm' => match next_from(&def.messages, &mut queues.messages).cloned() {
                Some(desc) => {
                    let message = self.lookup_message(&desc.id);
                    Tile::message(message, desc.times)
                }
                None => {
                    self.warn(format!(
                        "message glyph in room '{}' without a descriptor, placing floor",
                        def.id
                    ));
                    Tile::Floor
                }
            },
            'r' => match next_from(&def.riddles, &mut queues.riddles).cloned() {
                Some(desc) => self.riddler_tile(&desc),
                None => {
                    self.warn(format!(
                        "riddle glyph in room '{}' without a descriptor, placing floor",
                        def.id
                    ));
                    Tile::Floor
                }
            },
            '$' => {
                let desc = next_from(&def.shops, &mut queues.shops).cloned();
                self.shop_tile(desc.as_ref())
            }
            digit @ '0'..='9' => {
                let group = digit as u8 - b'0';
                if group > Room::GROUP_COUNT {
                    self.warn(format!(
                        "enemy group {group} in room '{}' is out of range, placing floor",
                        def.id
                    ));
                    return Tile::Floor;
                }
                let desc = next_from(&def.enemies, &mut queues.enemies)
                    .cloned()
                    .unwrap_or_default();
                self.enemy_tile(group, &desc)
            }
            other => {
                self.warn(format!(
                    "unknown tile glyph '{other}' in room '{}', placing floor",
                    def.id
                ));
                Tile::Floor
            }
        }
    }

    fn build_room(&mut self, def: &'a RoomDef) -> Room {
        let area_id = self.next_id();

        if def.kind == RoomKind::Wild && def.rows.is_empty() {
            let robot = self.robot.clone();
            let mut factory = self.default_enemies.clone();
            match Room::wild(area_id, &mut factory, WILD_ENEMY_CHANCE, &robot, &mut self.rng) {
                Ok(room) => return self.finish_room(room, def),
                Err(err) => {
                    self.warn(format!(
                        "wild room '{}' could not be populated ({err}), leaving it empty",
                        def.id
                    ));
                    return self.finish_room(Room::new(area_id, RoomKind::Wild, vec![]), def);
                }
            }
        }

        if def.rows.len() > INNER_HEIGHT
            || def.rows.iter().any(|row| row.chars().count() > INNER_WIDTH)
        {
            self.warn(format!(
                "room '{}' grid exceeds {INNER_WIDTH}x{INNER_HEIGHT}, truncating",
                def.id
            ));
        }

        let mut queues = Queues::default();
        let mut inner = Vec::with_capacity(def.rows.len().min(INNER_HEIGHT));
        for row in def.rows.iter().take(INNER_HEIGHT) {
            let tiles: Vec<Tile> = row
                .chars()
                .take(INNER_WIDTH)
                .map(|glyph| self.build_tile(def, glyph, &mut queues))
                .collect();
            inner.push(tiles);
        }
        self.finish_room(Room::new(area_id, def.kind, inner), def)
    }

    fn finish_room(&mut self, mut room: Room, def: &RoomDef) -> Room {
        match def.visibility {
            RoomVisibility::Hidden => {}
            RoomVisibility::InSight => room.area_mut().make_in_sight(),
            RoomVisibility::Visible => room.area_mut().make_visible(),
        }
        room
    }

    fn build_room_by_id(&mut self, id: &str) -> Room {
        if id.starts_with('_') {
            let area_id = self.next_id();
            return Room::new(area_id, RoomKind::Placeholder, vec![]);
        }
        match self.room_defs.get(id).copied() {
            Some(def) => self.build_room(def),
            None => {
                self.warn(format!("unknown room '{id}' in layout, placing an empty room"));
                let area_id = self.next_id();
                Room::new(area_id, RoomKind::Custom, vec![])
            }
        }
    }

    fn splice_hallway(
        &mut self,
        rooms: &mut [Vec<Option<Room>>],
        hallways: &mut Vec<Hallway>,
        id: &str,
        from: Coordinate,
        direction: Direction,
    ) {
        let to = from + direction;
        let occupied = |pos: Coordinate| {
            rooms
                .get(pos.y as usize)
                .and_then(|row| row.get(pos.x as usize))
                .is_some_and(Option::is_some)
        };
        if !occupied(from) || !occupied(to) {
            self.warn(format!(
                "hallway '{id}' between {from} and {to} misses a room on one side, skipping it"
            ));
            return;
        }

        let mut door = match self.doors.get(id).cloned() {
            Some(door) => door,
            None => {
                self.warn(format!("unknown hallway '{id}' in layout, using a plain door"));
                Door::new(direction)
            }
        };
        // The door must match the axis of the adjacency it serves.
        if door.direction().is_horizontal() != direction.is_horizontal() {
            door.set_direction(direction);
        }

        // Both sides must still be free before anything is wired up,
        // so a rejected hallway leaves no dangling references.
        let side_free = |pos: Coordinate, dir: Direction| {
            rooms
                .get(pos.y as usize)
                .and_then(|row| row.get(pos.x as usize))
                .and_then(Option::as_ref)
                .is_some_and(|room| room.hallway(dir).is_none())
        };
        if !side_free(from, direction) || !side_free(to, direction.opposite()) {
            self.warn(format!(
                "hallway '{id}' overlaps another hallway between {from} and {to}"
            ));
            return;
        }

        let idx = hallways.len();
        let area_id = self.next_id();
        let mut hallway = Hallway::new(area_id, door);
        hallway.set_room(from, direction);
        hallway.set_room(to, direction.opposite());

        let mut attach = |pos: Coordinate, dir: Direction| {
            if let Some(room) = rooms
                .get_mut(pos.y as usize)
                .and_then(|row| row.get_mut(pos.x as usize))
                .and_then(Option::as_mut)
            {
                room.attach_hallway(dir, idx);
            }
        };
        attach(from, direction);
        attach(to, direction.opposite());
        hallways.push(hallway);
    }

    fn build_layout(mut self) -> Result<LevelMap, GenerateError> {
        let source = self.source;
        let layout = &source.layout;
        if layout.room_rows.is_empty() {
            return Err(GenerateError::MissingSection("layout"));
        }

        if layout.room_rows.len() > MAX_HEIGHT {
            self.warn(format!(
                "layout has {} room rows, only the first {MAX_HEIGHT} are used",
                layout.room_rows.len()
            ));
        }
        let rows_used = layout.room_rows.len().min(MAX_HEIGHT);

        let widest = layout
            .room_rows
            .iter()
            .take(rows_used)
            .map(|row| row.rooms.len())
            .max()
            .unwrap_or(0);
        if widest > MAX_WIDTH {
            self.warn(format!(
                "layout is {widest} rooms wide, only the first {MAX_WIDTH} columns are used"
            ));
        }
        let cols_used = widest.min(MAX_WIDTH);
        if cols_used == 0 {
            return Err(GenerateError::MissingSection("layout"));
        }

        // Rooms first; ragged rows are padded with empty slots.
        let mut rooms: Vec<Vec<Option<Room>>> = (0..rows_used)
            .map(|_| {
                let mut row = Vec::with_capacity(cols_used);
                row.resize_with(cols_used, || None);
                row
            })
            .collect();
        let mut spawn: Option<Coordinate> = None;

        for (y, row) in layout.room_rows.iter().take(rows_used).enumerate() {
            for (x, slot) in row.rooms.iter().take(cols_used).enumerate() {
                let Some(id) = slot else { continue };
                let room = self.build_room_by_id(id);
                if room.kind() == RoomKind::Spawn {
                    if spawn.is_some() {
                        self.warn(format!(
                            "multiple spawn rooms in layout, using the one at {x}|{y}"
                        ));
                    }
                    spawn = Some(Coordinate::new(x as i32, y as i32));
                }
                rooms[y][x] = Some(room);
            }
        }

        // Hallways second, so both sides of every seam exist.
        let mut hallways: Vec<Hallway> = Vec::new();
        for (y, row) in layout.room_rows.iter().take(rows_used).enumerate() {
            for (x, slot) in row.connectors.iter().enumerate() {
                let Some(id) = slot.as_deref() else { continue };
                if x + 1 >= cols_used {
                    self.warn(format!(
                        "connector '{id}' in room row {y} points past the layout, skipping it"
                    ));
                    continue;
                }
                self.splice_hallway(
                    &mut rooms,
                    &mut hallways,
                    id,
                    Coordinate::new(x as i32, y as i32),
                    Direction::East,
                );
            }
        }
        for (y, row) in layout.hallway_rows.iter().enumerate() {
            if y + 1 >= rows_used {
                if row.iter().any(Option::is_some) {
                    self.warn(format!(
                        "hallway row {y} points past the layout, skipping it"
                    ));
                }
                continue;
            }
            for (x, slot) in row.iter().enumerate() {
                let Some(id) = slot.as_deref() else { continue };
                if x >= cols_used {
                    self.warn(format!(
                        "hallway '{id}' in hallway row {y} points past the layout, skipping it"
                    ));
                    continue;
                }
                self.splice_hallway(
                    &mut rooms,
                    &mut hallways,
                    id,
                    Coordinate::new(x as i32, y as i32),
                    Direction::South,
                );
            }
        }

        let Some(spawn) = spawn else {
            return Err(GenerateError::MalformedLayout(
                "layout has no spawn room".to_string(),
            ));
        };

        let mut map = LevelMap::new(
            &source.name,
            self.seed,
            rooms,
            hallways,
            self.robot.clone(),
            spawn,
            self.reveal_all,
        )?;
        map.extend_warnings(self.warnings);
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::source::{
        HallwayDef, LayoutDef, LayoutRoomRow, MessageDef, PoolSelector, RewardPoolDef,
        RewardPoolSection, RobotDef, StvPoolDef, StvPoolSection,
    };
    use super::*;
    use crate::collectibles::factory::DrawStrategy;
    use crate::logic::Amplitude;

    fn minimal_source() -> LevelSource {
        LevelSource {
            name: "test-level".to_string(),
            robot: RobotDef {
                num_qubits: 2,
                gates: vec!["x".to_string(), "h".to_string()],
            },
            messages: vec![MessageDef {
                id: "welcome".to_string(),
                speaker: None,
                text: "Good luck in there.".to_string(),
                event_condition: None,
                alt_message: None,
            }],
            reward_pools: RewardPoolSection {
                pools: vec![RewardPoolDef {
                    id: "loot".to_string(),
                    strategy: DrawStrategy::Ordered,
                    collectibles: vec![
                        CollectibleDef::Coin(3),
                        CollectibleDef::Key(1),
                    ],
                }],
                default: PoolSelector {
                    id: "loot".to_string(),
                    ordered: true,
                },
            },
            stv_pools: StvPoolSection {
                pools: vec![StvPoolDef {
                    id: "easy".to_string(),
                    ordered: true,
                    states: vec![vec![
                        Amplitude::ONE,
                        Amplitude::ZERO,
                        Amplitude::ZERO,
                        Amplitude::ZERO,
                    ]],
                    reward_pool: None,
                }],
                default: PoolSelector {
                    id: "easy".to_string(),
                    ordered: true,
                },
            },
            hallways: vec![HallwayDef {
                id: "h1".to_string(),
                door: DoorDef::default(),
            }],
            rooms: vec![
                RoomDef {
                    id: "start".to_string(),
                    kind: RoomKind::Spawn,
                    rows: vec!["_____".to_string(); 5],
                    ..RoomDef::default()
                },
                RoomDef {
                    id: "arena".to_string(),
                    kind: RoomKind::Wild,
                    rows: vec![
                        "_1_1_".to_string(),
                        "_____".to_string(),
                        "__c__".to_string(),
                        "_____".to_string(),
                        "_____".to_string(),
                    ],
                    ..RoomDef::default()
                },
            ],
            layout: LayoutDef {
                room_rows: vec![LayoutRoomRow {
                    rooms: vec![Some("start".to_string()), Some("arena".to_string())],
                    connectors: vec![Some("h1".to_string())],
                }],
                hallway_rows: vec![],
            },
        }
    }

    #[test]
    fn test_minimal_level_builds() {
        let generator = LevelGenerator::new(11, false);
        let map = generator.generate_from_source(&minimal_source()).unwrap();

        assert_eq!(map.name(), "test-level");
        assert_eq!(map.robot().num_qubits(), 2);
        assert_eq!(
            map.robot().gates(),
            &[GateType::X, GateType::H]
        );
        assert!(map.warnings().is_empty(), "{:?}", map.warnings());
        assert_eq!(map.hallways().len(), 1);
        assert_eq!(map.player_pos(), Coordinate::new(3, 3));

        // The arena keeps its two group-1 enemies and the collectible.
        let arena = map.room_at(Coordinate::new(1, 0)).unwrap();
        assert_eq!(arena.group(1).unwrap().members().len(), 2);
    }

    #[test]
    fn test_event_lock_without_id_downgrades_with_warning() {
        let mut source = minimal_source();
        source.hallways[0].door.lock = DoorLockDef::EventLocked;
        source.hallways[0].door.event_id = None;

        let map = LevelGenerator::new(0, false)
            .generate_from_source(&source)
            .unwrap();
        assert_eq!(map.warnings().len(), 1);
        assert_eq!(
            map.hallways()[0].door().unwrap().open_state(),
            &DoorOpenState::Closed
        );
    }

    #[test]
    fn test_unknown_glyph_becomes_floor_with_warning() {
        let mut source = minimal_source();
        source.rooms[0].rows[0] = "__?__".to_string();

        let map = LevelGenerator::new(0, false)
            .generate_from_source(&source)
            .unwrap();
        assert_eq!(map.warnings().len(), 1);
        assert!(map.warnings()[0].contains('?'));
        let start = map.room_at(Coordinate::new(0, 0)).unwrap();
        assert_eq!(*start.area().at(3, 1, true, false), Tile::Floor);
    }

    #[test]
    fn test_duplicate_spawn_later_wins() {
        let mut source = minimal_source();
        source.rooms[1].kind = RoomKind::Spawn;

        let map = LevelGenerator::new(0, false)
            .generate_from_source(&source)
            .unwrap();
        assert_eq!(map.warnings().len(), 1);
        // Spawn moved to the second room.
        assert_eq!(map.player_pos(), Coordinate::new(8 + 3, 3));
    }

    #[test]
    fn test_missing_spawn_fails() {
        let mut source = minimal_source();
        source.rooms[0].kind = RoomKind::Custom;

        let err = LevelGenerator::new(0, false)
            .generate_from_source(&source)
            .unwrap_err();
        assert!(matches!(err, GenerateError::MalformedLayout(_)));
    }

    #[test]
    fn test_unknown_room_becomes_empty_with_warning() {
        let mut source = minimal_source();
        source.layout.room_rows[0].rooms[1] = Some("nowhere".to_string());

        let map = LevelGenerator::new(0, false)
            .generate_from_source(&source)
            .unwrap();
        assert_eq!(map.warnings().len(), 1);
        assert!(map.warnings()[0].contains("nowhere"));
        let stand_in = map.room_at(Coordinate::new(1, 0)).unwrap();
        assert_eq!(stand_in.kind(), RoomKind::Custom);
        // The connector still splices against the stand-in.
        assert_eq!(map.hallways().len(), 1);
    }

    #[test]
    fn test_dangling_connector_is_skipped_with_warning() {
        let mut source = minimal_source();
        source.layout.room_rows[0].rooms[1] = None;

        let map = LevelGenerator::new(0, false)
            .generate_from_source(&source)
            .unwrap();
        assert!(map.hallways().is_empty());
        assert_eq!(map.warnings().len(), 1);
    }

    #[test]
    fn test_door_rotated_to_adjacency_axis() {
        let mut source = minimal_source();
        // A door facing north cannot serve a left-right adjacency.
        source.hallways[0].door.direction = Direction::North;

        let map = LevelGenerator::new(0, false)
            .generate_from_source(&source)
            .unwrap();
        assert_eq!(
            map.hallways()[0].door().unwrap().direction(),
            Direction::East
        );
    }

    #[test]
    fn test_ordered_default_pool_progresses_across_tiles() {
        let mut source = minimal_source();
        // Two collectible glyphs drawing from the ordered default pool.
        source.rooms[0].rows[0] = "c___c".to_string();

        let map = LevelGenerator::new(0, false)
            .generate_from_source(&source)
            .unwrap();
        let start = map.room_at(Coordinate::new(0, 0)).unwrap();
        let first = start.area().tile(1, 1).unwrap();
        let second = start.area().tile(5, 1).unwrap();
        assert_eq!(
            *first,
            Tile::collectible(Collectible::Coin(3))
        );
        assert_eq!(
            *second,
            Tile::collectible(Collectible::Key(1))
        );
    }
}
