//! Achievement/event store boundary.
//!
//! Doors with event locks and trigger tiles talk to the host's
//! achievement system through this trait; the core never persists
//! anything itself.

use std::collections::HashSet;

/// External achievement/event capability consumed by doors and
/// trigger tiles.
pub trait EventStore {
    /// Whether the given event/achievement has already happened.
    fn check_achievement(&self, event_id: &str) -> bool;

    /// Record that an event happened.
    fn trigger_event(&mut self, event_id: &str);
}

/// Simple in-memory store for tests and hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    triggered: HashSet<String>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-record an event, e.g. to unlock an event-locked door.
    pub fn with_event(mut self, event_id: &str) -> Self {
        self.triggered.insert(event_id.to_string());
        self
    }
}

impl EventStore for MemoryEventStore {
    fn check_achievement(&self, event_id: &str) -> bool {
        self.triggered.contains(event_id)
    }

    fn trigger_event(&mut self, event_id: &str) {
        self.triggered.insert(event_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryEventStore::new();
        assert!(!store.check_achievement("boss-defeated"));
        store.trigger_event("boss-defeated");
        assert!(store.check_achievement("boss-defeated"));
    }
}
