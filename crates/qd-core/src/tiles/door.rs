//! Doors: the single interactive tile of every hallway.

use serde::{Deserialize, Serialize};

use super::LevelEvent;
use crate::events::EventStore;
use crate::logic::{Message, Robot};
use crate::navigation::Direction;

/// Lock state of a door.
///
/// `EventLocked` always carries a non-empty event id; the level
/// builder downgrades an event lock without an id to `Closed` and
/// records a warning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorOpenState {
    Open,
    #[default]
    Closed,
    KeyLocked,
    EventLocked(String),
}

/// One-way restriction of a door, relative to its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorOneWayState {
    #[default]
    None,
    /// Directional until opened once, then passable both ways.
    Temporary,
    /// Directional forever.
    Permanent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    direction: Direction,
    open_state: DoorOpenState,
    one_way: DoorOneWayState,
    explanation: Option<Message>,
    explained: bool,
    event_to_trigger: Option<String>,
}

impl Door {
    /// A plain closed door facing `direction`.
    pub fn new(direction: Direction) -> Self {
        Self::with_state(direction, DoorOpenState::Closed, DoorOneWayState::None)
    }

    pub fn with_state(
        direction: Direction,
        open_state: DoorOpenState,
        one_way: DoorOneWayState,
    ) -> Self {
        Self {
            direction,
            open_state,
            one_way,
            explanation: None,
            explained: false,
            event_to_trigger: None,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Reorient the door; used when the layout splices a hallway in a
    /// direction the hallway table did not anticipate.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn open_state(&self) -> &DoorOpenState {
        &self.open_state
    }

    pub fn one_way(&self) -> DoorOneWayState {
        self.one_way
    }

    pub fn is_open(&self) -> bool {
        self.open_state == DoorOpenState::Open
    }

    pub fn set_explanation(&mut self, message: Message) {
        self.explanation = Some(message);
    }

    /// Event fired on every pass-through.
    pub fn set_event(&mut self, event_id: &str) {
        self.event_to_trigger = Some(event_id.to_string());
    }

    pub fn is_walkable(
        &self,
        direction: Direction,
        robot: &Robot,
        events: &dyn EventStore,
    ) -> bool {
        let one_way_blocks = match self.one_way {
            DoorOneWayState::None => false,
            DoorOneWayState::Temporary => !self.is_open() && direction != self.direction,
            DoorOneWayState::Permanent => direction != self.direction,
        };
        if one_way_blocks {
            return false;
        }

        match &self.open_state {
            DoorOpenState::Open | DoorOpenState::Closed => true,
            DoorOpenState::KeyLocked => robot.keys() > 0,
            DoorOpenState::EventLocked(event_id) => events.check_achievement(event_id),
        }
    }

    pub fn on_walk(
        &mut self,
        _direction: Direction,
        robot: &mut Robot,
        events: &mut dyn EventStore,
        out: &mut Vec<LevelEvent>,
    ) {
        if self.open_state == DoorOpenState::KeyLocked {
            robot.use_key();
        }
        self.open_state = DoorOpenState::Open;

        if let Some(event_id) = &self.event_to_trigger {
            events.trigger_event(event_id);
        }
        if let Some(message) = &self.explanation {
            if !self.explained {
                self.explained = true;
                out.push(LevelEvent::ShowMessage {
                    speaker: message.speaker().to_string(),
                    text: message.text_for(events).to_string(),
                });
            }
        }
    }
}
