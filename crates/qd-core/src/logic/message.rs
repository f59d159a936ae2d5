//! Level messages, optionally conditional on a game event.

use serde::{Deserialize, Serialize};

use crate::events::EventStore;

/// A named message from the level description.
///
/// When `event_condition` is set the main text is only shown once the
/// event has happened; until then the resolved alternate text (another
/// message in the level's table) is shown instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    speaker: String,
    text: String,
    event_condition: Option<String>,
    alt_message: Option<String>,
    resolved_alt_text: Option<String>,
}

impl Message {
    pub const DEFAULT_SPEAKER: &'static str = "Scientist";

    pub fn new(
        id: &str,
        speaker: &str,
        text: &str,
        event_condition: Option<String>,
        alt_message: Option<String>,
    ) -> Self {
        Self {
            id: id.to_string(),
            speaker: speaker.to_string(),
            text: text.to_string(),
            event_condition,
            alt_message,
            resolved_alt_text: None,
        }
    }

    /// Unconditional message with the default speaker.
    pub fn simple(id: &str, text: &str) -> Self {
        Self::new(id, Self::DEFAULT_SPEAKER, text, None, None)
    }

    /// Placeholder for a broken message reference.
    pub fn error(text: &str) -> Self {
        Self::simple("error", text)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn alt_message_ref(&self) -> Option<&str> {
        self.alt_message.as_deref()
    }

    /// Store the alternate message's text after table lookup. Cycle
    /// detection happens in the builder, before this is called.
    pub fn resolve_alt(&mut self, alt: &Message) {
        self.resolved_alt_text = Some(alt.text.clone());
    }

    /// The text to display given the current event state.
    pub fn text_for(&self, events: &dyn EventStore) -> &str {
        match &self.event_condition {
            Some(event) if !events.check_achievement(event) => {
                self.resolved_alt_text.as_deref().unwrap_or(&self.text)
            }
            _ => &self.text,
        }
    }
}
