use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::event::error::{EventSystemError, ListenerError};
use crate::event::types::Event;

/// What a listener hands back to the dispatcher.
///
/// `Ok(None)` (or `Ok(Some(Value::Null))`) leaves the event result untouched,
/// `Ok(Some(Value::Bool(false)))` stops propagation, any other value becomes
/// the event result. An `Err` aborts the dispatch.
pub type ListenerResult = std::result::Result<Option<Value>, ListenerError>;

/// How a listener is being called for one dispatch.
#[derive(Debug)]
pub enum Invocation<'a> {
    /// The listener receives the event itself and may mutate it
    Event(&'a mut Event),
    /// The listener receives the event payload values, in insertion order
    Params(&'a [Value]),
}

type CallableFn = dyn for<'a> Fn(Invocation<'a>) -> ListenerResult + Send + Sync;

/// A shareable listener function.
///
/// Clones share the same underlying closure; two callables are equal when
/// they share it, which is what [`detach`](crate::event::EventManager::detach)
/// matches on.
#[derive(Clone)]
pub struct Callable {
    func: Arc<CallableFn>,
    label: Option<Arc<str>>,
}

impl Callable {
    /// Wrap a closure that handles both invocation shapes
    pub fn new<F>(func: F) -> Self
    where
        F: for<'a> Fn(Invocation<'a>) -> ListenerResult + Send + Sync + 'static,
    {
        Self { func: Arc::new(func), label: None }
    }

    /// Wrap a closure that only accepts the event itself
    pub fn from_event<F>(func: F) -> Self
    where
        F: Fn(&mut Event) -> ListenerResult + Send + Sync + 'static,
    {
        Self::new(move |invocation| match invocation {
            Invocation::Event(event) => func(event),
            Invocation::Params(_) => Err(EventSystemError::UnsupportedInvocation {
                expected: "the event",
            }
            .into()),
        })
    }

    /// Wrap a closure that only accepts spread payload values
    pub fn from_params<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> ListenerResult + Send + Sync + 'static,
    {
        Self::new(move |invocation| match invocation {
            Invocation::Params(params) => func(params),
            Invocation::Event(_) => Err(EventSystemError::UnsupportedInvocation {
                expected: "spread parameters",
            }
            .into()),
        })
    }

    /// Give the callable a name shown in debug output and traces
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(Arc::from(label.into()));
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn call(&self, invocation: Invocation<'_>) -> ListenerResult {
        (self.func)(invocation)
    }

    /// Whether both callables wrap the same closure
    pub fn same_as(&self, other: &Callable) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.func), Arc::as_ptr(&other.func))
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// One handler declared by an [`EventListener`].
///
/// Deserializes from `{"callable": "name", "priority": 5, "passParams": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Handler {
    #[serde(rename = "callable")]
    pub name: String,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default, rename = "passParams")]
    pub pass_params: bool,
}

impl Handler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), priority: None, pass_params: false }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn pass_params(mut self, pass_params: bool) -> Self {
        self.pass_params = pass_params;
        self
    }
}

/// The handlers a declarative listener binds to one event name.
///
/// Deserializes untagged from a bare handler name, a single handler map, or
/// a list of handler maps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Subscription {
    Single(String),
    WithOptions(Handler),
    Multiple(Vec<Handler>),
}

impl Subscription {
    /// Normalize every shape into a list of handlers
    pub fn handlers(&self) -> Vec<Handler> {
        match self {
            Subscription::Single(name) => vec![Handler::new(name.clone())],
            Subscription::WithOptions(handler) => vec![handler.clone()],
            Subscription::Multiple(handlers) => handlers.clone(),
        }
    }
}

impl From<&str> for Subscription {
    fn from(name: &str) -> Self {
        Subscription::Single(name.to_string())
    }
}

impl From<Handler> for Subscription {
    fn from(handler: Handler) -> Self {
        Subscription::WithOptions(handler)
    }
}

impl From<Vec<Handler>> for Subscription {
    fn from(handlers: Vec<Handler>) -> Self {
        Subscription::Multiple(handlers)
    }
}

/// An object that declares which events it handles.
///
/// Attaching it registers every declared handler at once; the handler names
/// are routed back to [`handle`](EventListener::handle).
pub trait EventListener: Send + Sync {
    /// Event name to subscription mapping, in registration order
    fn implemented_events(&self) -> Vec<(String, Subscription)>;

    /// Run the handler called `handler`
    fn handle(&self, handler: &str, invocation: Invocation<'_>) -> ListenerResult;

    /// Name prefixed to handler labels as `name.handler`
    fn name(&self) -> Option<&str> {
        None
    }
}

/// Anything the event manager can attach or detach.
#[derive(Clone)]
pub enum Listener {
    Callable(Callable),
    Subscriber(Arc<dyn EventListener>),
}

impl Listener {
    /// Identity of a declarative listener, stable for the lifetime of its `Arc`
    pub(crate) fn subscriber_key(subscriber: &Arc<dyn EventListener>) -> usize {
        Arc::as_ptr(subscriber) as *const () as usize
    }

    /// Bind one declared handler of `subscriber` into a callable
    pub(crate) fn bind(subscriber: &Arc<dyn EventListener>, handler: &str) -> Callable {
        let label = match subscriber.name() {
            Some(owner) => format!("{}.{}", owner, handler),
            None => handler.to_string(),
        };
        let target = Arc::clone(subscriber);
        let name = handler.to_string();
        Callable::new(move |invocation| target.handle(&name, invocation)).with_label(label)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Callable(callable) => f.debug_tuple("Callable").field(callable).finish(),
            Listener::Subscriber(subscriber) => f
                .debug_tuple("Subscriber")
                .field(&Listener::subscriber_key(subscriber))
                .finish(),
        }
    }
}

impl From<Callable> for Listener {
    fn from(callable: Callable) -> Self {
        Listener::Callable(callable)
    }
}

impl From<Arc<dyn EventListener>> for Listener {
    fn from(subscriber: Arc<dyn EventListener>) -> Self {
        Listener::Subscriber(subscriber)
    }
}

impl<L: EventListener + 'static> From<Arc<L>> for Listener {
    fn from(subscriber: Arc<L>) -> Self {
        Listener::Subscriber(subscriber)
    }
}
