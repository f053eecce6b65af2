use std::any::Any;
use std::sync::{Arc, Weak};

use serde_json::{Map, Value};

/// Ordered payload carried by an [`Event`].
///
/// Insertion order is kept so that listeners attached with `pass_params`
/// receive the values in the order they were added.
pub type EventData = Map<String, Value>;

/// A named occurrence dispatched to interested listeners.
///
/// The subject is held as a weak reference: an event never keeps the object
/// that triggered it alive.
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    subject: Option<Weak<dyn Any + Send + Sync>>,
    data: EventData,
    stopped: bool,
    result: Option<Value>,
}

impl Event {
    /// Create an event with no subject and an empty payload
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: None,
            data: EventData::new(),
            stopped: false,
            result: None,
        }
    }

    /// Attach the object that triggered this event
    pub fn with_subject<T: Any + Send + Sync>(mut self, subject: &Arc<T>) -> Self {
        let weak: Weak<T> = Arc::downgrade(subject);
        self.subject = Some(weak);
        self
    }

    /// Replace the whole payload
    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    /// Append a single payload entry
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The subject as a type-erased handle, if it is still alive
    pub fn subject_any(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.subject.as_ref().and_then(Weak::upgrade)
    }

    /// The subject downcast to `T`.
    ///
    /// Returns `None` when no subject was set, the subject has been dropped,
    /// or it is not a `T`.
    pub fn subject<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.subject_any().and_then(|subject| subject.downcast::<T>().ok())
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut EventData {
        &mut self.data
    }

    /// Look up one payload value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Set one payload value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    /// Stop any further listener from receiving this event
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, result: Option<Value>) {
        self.result = result;
    }
}

impl From<&str> for Event {
    fn from(name: &str) -> Self {
        Event::new(name)
    }
}

impl From<String> for Event {
    fn from(name: String) -> Self {
        Event::new(name)
    }
}
