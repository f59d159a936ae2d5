//! The tiles a room or hallway is paved with, and the events walking
//! on them raises towards the host.

mod door;

pub use door::{Door, DoorOneWayState, DoorOpenState};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::collectibles::{Collectible, ShopItem};
use crate::events::EventStore;
use crate::logic::{Message, Riddle, Robot, StateVector};
use crate::navigation::Direction;

/// What happened when the player walked onto a tile. The map queues
/// these; the host drains them and runs the matching interaction
/// (puzzle screen, shop screen, dialogue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    /// An undefeated enemy was stepped on.
    Fight {
        group: u8,
        target: StateVector,
        reward: Collectible,
    },
    /// An active riddle wants to be solved.
    OpenRiddle { riddle: Riddle },
    /// A shopkeeper presented their inventory.
    VisitShop { inventory: Vec<ShopItem> },
    /// Dialogue to display.
    ShowMessage { speaker: String, text: String },
    /// A collectible was picked up and already applied to the robot.
    Collected { collectible: Collectible },
}

/// Side effects shared by the interactive tiles: a one-shot
/// explanation message and an event fired on every walk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WalkHooks {
    explanation: Option<Message>,
    explained: bool,
    event: Option<String>,
}

impl WalkHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_explanation(mut self, message: Message) -> Self {
        self.explanation = Some(message);
        self
    }

    pub fn with_event(mut self, event_id: &str) -> Self {
        self.event = Some(event_id.to_string());
        self
    }

    fn fire(&mut self, events: &mut dyn EventStore, out: &mut Vec<LevelEvent>) {
        if let Some(message) = &self.explanation {
            if !self.explained {
                self.explained = true;
                out.push(LevelEvent::ShowMessage {
                    speaker: message.speaker().to_string(),
                    text: message.text_for(events).to_string(),
                });
            }
        }
        if let Some(event_id) = &self.event {
            events.trigger_event(event_id);
        }
    }
}

/// Discriminant of a [`Tile`], used for rendering and diagnostics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum TileCode {
    Invalid,
    Void,
    Floor,
    Wall,
    Obstacle,
    FogOfWar,
    Collectible,
    Enemy,
    Riddler,
    ShopKeeper,
    Trigger,
    Message,
    Door,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tile {
    /// Outside any area, or a diagnostic placeholder.
    Invalid,
    Void,
    Floor,
    Wall,
    Obstacle,
    /// What an unvisited tile of an in-sight area looks like.
    FogOfWar,
    Collectible {
        payload: Option<Collectible>,
        hooks: WalkHooks,
    },
    Enemy {
        group: u8,
        target: StateVector,
        reward: Collectible,
        defeated: bool,
        hooks: WalkHooks,
    },
    Riddler {
        riddle: Riddle,
        hooks: WalkHooks,
    },
    ShopKeeper {
        inventory: Vec<ShopItem>,
        hooks: WalkHooks,
    },
    Trigger {
        event: String,
        hooks: WalkHooks,
    },
    Message {
        message: Message,
        times: u32,
        hooks: WalkHooks,
    },
    Door(Door),
}

impl Tile {
    pub fn collectible(payload: Collectible) -> Self {
        Tile::Collectible {
            payload: Some(payload),
            hooks: WalkHooks::new(),
        }
    }

    pub fn enemy(group: u8, target: StateVector, reward: Collectible) -> Self {
        Tile::Enemy {
            group,
            target,
            reward,
            defeated: false,
            hooks: WalkHooks::new(),
        }
    }

    pub fn riddler(riddle: Riddle) -> Self {
        Tile::Riddler {
            riddle,
            hooks: WalkHooks::new(),
        }
    }

    pub fn shop_keeper(inventory: Vec<ShopItem>) -> Self {
        Tile::ShopKeeper {
            inventory,
            hooks: WalkHooks::new(),
        }
    }

    pub fn trigger(event: &str) -> Self {
        Tile::Trigger {
            event: event.to_string(),
            hooks: WalkHooks::new(),
        }
    }

    pub fn message(message: Message, times: u32) -> Self {
        Tile::Message {
            message,
            times,
            hooks: WalkHooks::new(),
        }
    }

    pub fn code(&self) -> TileCode {
        match self {
            Tile::Invalid => TileCode::Invalid,
            Tile::Void => TileCode::Void,
            Tile::Floor => TileCode::Floor,
            Tile::Wall => TileCode::Wall,
            Tile::Obstacle => TileCode::Obstacle,
            Tile::FogOfWar => TileCode::FogOfWar,
            Tile::Collectible { .. } => TileCode::Collectible,
            Tile::Enemy { .. } => TileCode::Enemy,
            Tile::Riddler { .. } => TileCode::Riddler,
            Tile::ShopKeeper { .. } => TileCode::ShopKeeper,
            Tile::Trigger { .. } => TileCode::Trigger,
            Tile::Message { .. } => TileCode::Message,
            Tile::Door(_) => TileCode::Door,
        }
    }

    /// Whether the player may step onto this tile, moving towards
    /// `direction`.
    pub fn is_walkable(
        &self,
        direction: Direction,
        robot: &Robot,
        events: &dyn EventStore,
    ) -> bool {
        match self {
            Tile::Invalid | Tile::Void | Tile::Wall | Tile::Obstacle | Tile::FogOfWar => false,
            Tile::Door(door) => door.is_walkable(direction, robot, events),
            _ => true,
        }
    }

    /// Apply the tile's effects after the player stepped onto it.
    /// Raised interactions are appended to `out`.
    pub fn on_walk(
        &mut self,
        direction: Direction,
        robot: &mut Robot,
        events: &mut dyn EventStore,
        out: &mut Vec<LevelEvent>,
    ) {
        match self {
            Tile::Collectible { payload, hooks } => {
                if let Some(collectible) = payload.take() {
                    robot.give(collectible.clone());
                    out.push(LevelEvent::Collected { collectible });
                }
                hooks.fire(events, out);
            }
            Tile::Enemy {
                group,
                target,
                reward,
                defeated,
                hooks,
            } => {
                if !*defeated {
                    out.push(LevelEvent::Fight {
                        group: *group,
                        target: target.clone(),
                        reward: reward.clone(),
                    });
                }
                hooks.fire(events, out);
            }
            Tile::Riddler { riddle, hooks } => {
                if riddle.is_active() {
                    out.push(LevelEvent::OpenRiddle {
                        riddle: riddle.clone(),
                    });
                }
                hooks.fire(events, out);
            }
            Tile::ShopKeeper { inventory, hooks } => {
                out.push(LevelEvent::VisitShop {
                    inventory: inventory.clone(),
                });
                hooks.fire(events, out);
            }
            Tile::Trigger { event, hooks } => {
                events.trigger_event(event);
                hooks.fire(events, out);
            }
            Tile::Message {
                message,
                times,
                hooks,
            } => {
                if *times > 0 {
                    *times -= 1;
                    out.push(LevelEvent::ShowMessage {
                        speaker: message.speaker().to_string(),
                        text: message.text_for(events).to_string(),
                    });
                }
                hooks.fire(events, out);
            }
            Tile::Door(door) => door.on_walk(direction, robot, events, out),
            _ => {}
        }
    }
}
