#![cfg(test)]

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::event::{
    Event, EventDispatcher, EventListener, EventManager, EventSystemError, Invocation,
    ListenerResult, Subscription,
};

/// Shared, ordered record of handler invocations
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Declarative listener that logs `<name>.<handler>` and returns a fixed value per handler
pub struct RecordingListener {
    name: String,
    events: Vec<(String, Subscription)>,
    returns: Vec<(String, Value)>,
    log: CallLog,
}

impl RecordingListener {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            events: Vec::new(),
            returns: Vec::new(),
            log: Arc::clone(log),
        }
    }

    pub fn on(mut self, event_name: &str, subscription: impl Into<Subscription>) -> Self {
        self.events.push((event_name.to_string(), subscription.into()));
        self
    }

    pub fn returning(mut self, handler: &str, value: Value) -> Self {
        self.returns.push((handler.to_string(), value));
        self
    }

    fn declares(&self, handler: &str) -> bool {
        self.events
            .iter()
            .flat_map(|(_, subscription)| subscription.handlers())
            .any(|declared| declared.name == handler)
    }
}

impl EventListener for RecordingListener {
    fn implemented_events(&self) -> Vec<(String, Subscription)> {
        self.events.clone()
    }

    fn handle(&self, handler: &str, invocation: Invocation<'_>) -> ListenerResult {
        if !self.declares(handler) {
            return Err(EventSystemError::UnknownHandler { handler: handler.to_string() }.into());
        }
        let entry = match invocation {
            Invocation::Event(event) => format!("{}.{}({})", self.name, handler, event.name()),
            Invocation::Params(params) => {
                let rendered: Vec<String> = params.iter().map(Value::to_string).collect();
                format!("{}.{}[{}]", self.name, handler, rendered.join(","))
            }
        };
        self.log.lock().unwrap().push(entry);
        Ok(self
            .returns
            .iter()
            .find(|(name, _)| name == handler)
            .map(|(_, value)| value.clone()))
    }
}

/// A record type owning its own local manager, the way a model would
pub struct Article {
    pub title: String,
    events: EventManager,
}

impl Article {
    pub fn new(title: &str, events: EventManager) -> Arc<Self> {
        Arc::new(Self {
            title: title.to_string(),
            events,
        })
    }

    /// Dispatch `Model.beforeSave` with this article as the subject
    pub fn save(self: &Arc<Self>) -> crate::event::Result<Event> {
        let event = Event::new("Model.beforeSave")
            .with_subject(self)
            .with_param("title", self.title.clone());
        self.events.dispatch(event)
    }
}

impl EventDispatcher for Article {
    fn event_manager(&self) -> &EventManager {
        &self.events
    }
}
