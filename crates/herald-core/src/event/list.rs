use crate::event::types::Event;

/// Record of the events a tracking manager has dispatched, oldest first.
///
/// The list is unbounded. Every dispatch on a tracking manager adds a
/// snapshot, and a local manager also adds one to its tracking global
/// manager. Long-lived processes should reset it with
/// [`EventManager::set_event_list`](crate::event::EventManager::set_event_list)
/// or stop tracking with
/// [`EventManager::unset_event_list`](crate::event::EventManager::unset_event_list).
#[derive(Debug, Clone, Default)]
pub struct EventList {
    events: Vec<Event>,
}

impl EventList {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn add(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// Whether an event called `name` was recorded
    pub fn has_event(&self, name: &str) -> bool {
        self.events.iter().any(|event| event.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
