//! The parsed level description.
//!
//! The grammar front end lives outside this crate; it implements
//! [`LevelParser`] and hands over a [`LevelSource`], a plain data
//! model of the level file. The builder in the parent module turns it
//! into a playable [`crate::dungeon::LevelMap`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collectibles::factory::DrawStrategy;
use crate::dungeon::RoomKind;
use crate::errors::GenerateError;
use crate::logic::Amplitude;
use crate::navigation::Direction;
use crate::tiles::DoorOneWayState;

/// Error from the grammar front end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error: {message}")]
pub struct SyntaxError {
    pub message: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<SyntaxError> for GenerateError {
    fn from(err: SyntaxError) -> Self {
        GenerateError::Syntax(err.message)
    }
}

/// Turns level description text into a [`LevelSource`].
pub trait LevelParser {
    fn parse(&self, text: &str) -> Result<LevelSource, SyntaxError>;
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelSource {
    pub name: String,
    pub robot: RobotDef,
    pub messages: Vec<MessageDef>,
    pub reward_pools: RewardPoolSection,
    pub stv_pools: StvPoolSection,
    pub hallways: Vec<HallwayDef>,
    pub rooms: Vec<RoomDef>,
    pub layout: LayoutDef,
}

/// The robot line: circuit size and starting gates by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotDef {
    pub num_qubits: u8,
    pub gates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageDef {
    pub id: String,
    pub speaker: Option<String>,
    pub text: String,
    /// Event that must have happened for `text` to show.
    pub event_condition: Option<String>,
    /// Message shown while the condition is unmet.
    pub alt_message: Option<String>,
}

/// A collectible as written in the level file. Gate names stay raw
/// here; the builder resolves them (and warns on unknown ones).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CollectibleDef {
    Coin(u32),
    Key(u32),
    Health(u32),
    Energy(u32),
    Qubit(u8),
    Gate(String),
}

/// Reference to a pool by id, with the draw order requested at the
/// reference site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoolSelector {
    pub id: String,
    pub ordered: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardPoolSection {
    pub pools: Vec<RewardPoolDef>,
    pub default: PoolSelector,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardPoolDef {
    pub id: String,
    pub strategy: DrawStrategy,
    pub collectibles: Vec<CollectibleDef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StvPoolSection {
    pub pools: Vec<StvPoolDef>,
    pub default: PoolSelector,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StvPoolDef {
    pub id: String,
    pub ordered: bool,
    /// Raw amplitude lists; validated by the builder.
    pub states: Vec<Vec<Amplitude>>,
    /// Reward pool used for enemies drawing from this pool; the
    /// default reward pool when absent.
    pub reward_pool: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorLockDef {
    Open,
    #[default]
    Closed,
    KeyLocked,
    EventLocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorDef {
    pub direction: Direction,
    pub lock: DoorLockDef,
    /// Required for `EventLocked`; the builder downgrades the lock to
    /// `Closed` when it is missing.
    pub event_id: Option<String>,
    pub one_way: DoorOneWayState,
    /// Message id shown the first time the door is used.
    pub explanation: Option<String>,
    /// Event fired on every pass-through.
    pub trigger: Option<String>,
}

impl Default for DoorDef {
    fn default() -> Self {
        Self {
            direction: Direction::East,
            lock: DoorLockDef::Closed,
            event_id: None,
            one_way: DoorOneWayState::None,
            explanation: None,
            trigger: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HallwayDef {
    pub id: String,
    pub door: DoorDef,
}

/// Initial visibility of a room, before the player gets near it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoomVisibility {
    #[default]
    Hidden,
    InSight,
    Visible,
}

/// Where a target state comes from: a named pool or spelled out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StvSource {
    Pool(String),
    Explicit(Vec<Amplitude>),
}

/// Where a reward comes from: a named pool or spelled out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RewardSource {
    Pool(String),
    Explicit(CollectibleDef),
}

/// Fills the next enemy glyph of a room.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnemyDescriptor {
    pub stv_pool: Option<String>,
    pub reward_pool: Option<String>,
}

/// Fills the next collectible glyph; `times` draws are bundled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleDescriptor {
    pub pool: Option<String>,
    pub times: u32,
}

impl Default for CollectibleDescriptor {
    fn default() -> Self {
        Self {
            pool: None,
            times: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiddleDescriptor {
    pub target: StvSource,
    pub reward: RewardSource,
    pub attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopDescriptor {
    pub pool: Option<String>,
    pub num_items: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    pub id: String,
    pub times: u32,
}

/// A room blueprint: a tile glyph grid plus descriptor queues feeding
/// the interactive glyphs in reading order. An exhausted queue repeats
/// its last entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomDef {
    pub id: String,
    pub kind: RoomKind,
    pub visibility: RoomVisibility,
    /// Interior rows of tile glyphs, up to 5x5. Ragged or short rows
    /// are padded with floor.
    pub rows: Vec<String>,
    pub enemies: Vec<EnemyDescriptor>,
    pub collectibles: Vec<CollectibleDescriptor>,
    /// Event ids for trigger glyphs.
    pub triggers: Vec<String>,
    /// Energy amounts for energy glyphs.
    pub energies: Vec<u32>,
    pub riddles: Vec<RiddleDescriptor>,
    pub shops: Vec<ShopDescriptor>,
    pub messages: Vec<MessageDescriptor>,
}

/// One row of rooms plus the hallway ids between horizontal
/// neighbors; `connectors[i]` sits between `rooms[i]` and
/// `rooms[i + 1]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutRoomRow {
    pub rooms: Vec<Option<String>>,
    pub connectors: Vec<Option<String>>,
}

/// The level layout: room rows interleaved with rows of vertical
/// hallway ids. `hallway_rows[i][col]` connects the rooms at `col` in
/// room rows `i` and `i + 1`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutDef {
    pub room_rows: Vec<LayoutRoomRow>,
    pub hallway_rows: Vec<Vec<Option<String>>>,
}
