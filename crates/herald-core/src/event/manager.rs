use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, trace, warn};
use serde_json::Value;

use crate::event::DEFAULT_PRIORITY;
use crate::event::error::{EventSystemError, Result};
use crate::event::list::EventList;
use crate::event::listener::{EventListener, Invocation, Listener};
use crate::event::registry::{ListenerEntry, ListenerRegistry, PriorityBuckets, merge_buckets};
use crate::event::types::{Event, EventData};

/// Options applied when attaching a listener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachOptions {
    /// Bucket to register in; `None` uses the manager's default priority
    pub priority: Option<i32>,
    /// Call the listener with the payload values instead of the event
    pub pass_params: bool,
}

impl AttachOptions {
    pub fn new() -> Self {
        Self::default()
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

#[derive(Debug)]
struct ManagerState {
    registry: ListenerRegistry,
    default_priority: i32,
    is_global: bool,
    event_list: Option<EventList>,
}

impl ManagerState {
    fn new() -> Self {
        Self {
            registry: ListenerRegistry::new(),
            default_priority: DEFAULT_PRIORITY,
            is_global: false,
            event_list: None,
        }
    }
}

/// Registers listeners and dispatches events to them.
///
/// A manager is a cheap handle: clones share the same registry. A manager
/// obtained from [`EventContext::manager`] is *local* and merges the
/// context's global listeners into every dispatch; one created with
/// [`EventManager::new`] stands alone.
#[derive(Clone)]
pub struct EventManager {
    state: Arc<Mutex<ManagerState>>,
    context: Option<EventContext>,
}

impl EventManager {
    /// Create a standalone manager that never consults a global registry
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ManagerState::new())),
            context: None,
        }
    }

    fn bound(context: EventContext) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManagerState::new())),
            context: Some(context),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ManagerState>> {
        self.state.lock().map_err(|_| EventSystemError::DispatcherPoisoned {
            component: "listener_registry".to_string(),
        })
    }

    /// Whether both handles share one registry
    pub fn same_as(&self, other: &EventManager) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Whether this manager is currently installed as a context's global instance
    pub fn is_global(&self) -> Result<bool> {
        Ok(self.lock()?.is_global)
    }

    pub fn default_priority(&self) -> Result<i32> {
        Ok(self.lock()?.default_priority)
    }

    /// Priority used for attachments that do not specify one
    pub fn set_default_priority(&self, priority: i32) -> Result<()> {
        self.lock()?.default_priority = priority;
        Ok(())
    }

    /// Register a listener.
    ///
    /// A [`Callable`](crate::event::Callable) needs `event_name`; without one
    /// this fails with [`EventSystemError::MissingEventName`]. A declarative
    /// [`EventListener`] registers every handler it declares and ignores
    /// `event_name`; `options` act as defaults for handlers that leave a
    /// setting out.
    pub fn attach(
        &self,
        listener: impl Into<Listener>,
        event_name: Option<&str>,
        options: AttachOptions,
    ) -> Result<()> {
        match listener.into() {
            Listener::Callable(callable) => {
                let event_name = event_name.ok_or(EventSystemError::MissingEventName)?;
                let mut state = self.lock()?;
                let priority = options.priority.unwrap_or(state.default_priority);
                debug!(
                    "Attaching listener {} to '{}' at priority {}",
                    callable.label().unwrap_or("<anonymous>"),
                    event_name,
                    priority
                );
                let entry = ListenerEntry::new(callable, priority, options.pass_params);
                state.registry.insert(event_name, entry);
                Ok(())
            }
            Listener::Subscriber(subscriber) => self.attach_subscriber(&subscriber, options),
        }
    }

    fn attach_subscriber(
        &self,
        subscriber: &Arc<dyn EventListener>,
        options: AttachOptions,
    ) -> Result<()> {
        let owner = Listener::subscriber_key(subscriber);
        let declared = subscriber.implemented_events();

        let mut state = self.lock()?;
        for (event_name, subscription) in declared {
            for handler in subscription.handlers() {
                let priority = handler
                    .priority
                    .or(options.priority)
                    .unwrap_or(state.default_priority);
                let pass_params = handler.pass_params || options.pass_params;
                debug!(
                    "Attaching handler '{}' to '{}' at priority {}",
                    handler.name, event_name, priority
                );
                let callable = Listener::bind(subscriber, &handler.name);
                let entry = ListenerEntry::new(callable, priority, pass_params).owned_by(owner);
                state.registry.insert(&event_name, entry);
            }
        }
        Ok(())
    }

    /// Remove a listener, returning how many registrations were dropped.
    ///
    /// Without `event_name` a callable is removed from every event and a
    /// declarative listener from every event it declares. Naming an event a
    /// declarative listener never declared removes nothing.
    pub fn detach(&self, listener: impl Into<Listener>, event_name: Option<&str>) -> Result<usize> {
        match listener.into() {
            Listener::Callable(callable) => {
                let mut state = self.lock()?;
                let names = match event_name {
                    Some(name) => vec![name.to_string()],
                    None => state.registry.event_names(),
                };
                let removed: usize = names
                    .iter()
                    .map(|name| state.registry.remove_callable(name, &callable))
                    .sum();
                debug!(
                    "Detached listener {} from {} registration(s)",
                    callable.label().unwrap_or("<anonymous>"),
                    removed
                );
                Ok(removed)
            }
            Listener::Subscriber(subscriber) => {
                let owner = Listener::subscriber_key(&subscriber);
                let declared: Vec<String> = subscriber
                    .implemented_events()
                    .into_iter()
                    .map(|(name, _)| name)
                    .filter(|name| event_name.is_none_or(|wanted| wanted == name.as_str()))
                    .collect();

                let mut state = self.lock()?;
                let removed: usize = declared
                    .iter()
                    .map(|name| state.registry.remove_owned(name, owner))
                    .sum();
                debug!("Detached declarative listener from {} registration(s)", removed);
                Ok(removed)
            }
        }
    }

    /// Run every listener of the event in priority order.
    ///
    /// Stops early once a listener stops propagation or returns `false`.
    /// A non-null return value becomes the event result. A listener error
    /// aborts the remaining chain and is returned as
    /// [`EventSystemError::ListenerFailed`].
    pub fn dispatch(&self, event: impl Into<Event>) -> Result<Event> {
        let mut event = event.into();
        let listeners = self.listeners(event.name())?;
        trace!("Dispatching '{}' to {} listener(s)", event.name(), listeners.len());

        for entry in &listeners {
            if event.is_stopped() {
                break;
            }

            trace!(
                "Invoking {} for '{}'",
                entry.callable().label().unwrap_or("<anonymous>"),
                event.name()
            );
            let outcome = if entry.pass_params() {
                let params: Vec<Value> = event.data().values().cloned().collect();
                entry.callable().call(Invocation::Params(&params))
            } else {
                entry.callable().call(Invocation::Event(&mut event))
            };

            let returned = outcome.map_err(|source| {
                warn!("Listener failed while handling '{}': {}", event.name(), source);
                EventSystemError::ListenerFailed {
                    event_name: event.name().to_string(),
                    source,
                }
            })?;

            match returned {
                None | Some(Value::Null) => {}
                Some(value) => {
                    if value == Value::Bool(false) {
                        event.stop_propagation();
                    }
                    event.set_result(Some(value));
                }
            }
        }

        self.record(&event)?;
        Ok(event)
    }

    /// Every listener that a dispatch of `event_name` would run, in order.
    ///
    /// For a local manager the global listeners of a priority run before the
    /// local listeners of that same priority.
    pub fn listeners(&self, event_name: &str) -> Result<Vec<ListenerEntry>> {
        let local = self.prioritised_listeners(event_name)?;
        let global = match self.global()? {
            Some(global) => global.prioritised_listeners(event_name)?,
            None => PriorityBuckets::new(),
        };
        Ok(merge_buckets(&global, &local))
    }

    /// This manager's own buckets for `event_name`
    pub fn prioritised_listeners(&self, event_name: &str) -> Result<PriorityBuckets> {
        Ok(self.lock()?.registry.prioritised(event_name))
    }

    /// This manager's own buckets for every event name containing `pattern`
    pub fn matching_listeners(&self, pattern: &str) -> Result<BTreeMap<String, PriorityBuckets>> {
        Ok(self.lock()?.registry.matching(pattern))
    }

    /// Event names this manager has listeners for
    pub fn event_names(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.registry.event_names())
    }

    /// Start or stop recording dispatched events.
    ///
    /// Enabling keeps an existing list; disabling drops it. The list grows
    /// with every dispatch until it is replaced or tracking stops.
    pub fn track_events(&self, enabled: bool) -> Result<()> {
        let mut state = self.lock()?;
        if enabled {
            state.event_list.get_or_insert_with(EventList::new);
        } else {
            state.event_list = None;
        }
        Ok(())
    }

    pub fn is_tracking_events(&self) -> Result<bool> {
        Ok(self.lock()?.event_list.is_some())
    }

    /// Snapshot of the recorded events, if tracking
    pub fn event_list(&self) -> Result<Option<EventList>> {
        Ok(self.lock()?.event_list.clone())
    }

    /// Replace the recorded events and enable tracking
    pub fn set_event_list(&self, list: EventList) -> Result<()> {
        self.lock()?.event_list = Some(list);
        Ok(())
    }

    /// Drop the recorded events and disable tracking
    pub fn unset_event_list(&self) -> Result<()> {
        self.lock()?.event_list = None;
        Ok(())
    }

    /// The context's global manager, unless this manager is that global
    fn global(&self) -> Result<Option<EventManager>> {
        let Some(context) = &self.context else {
            return Ok(None);
        };
        let global = context.instance()?;
        if global.same_as(self) {
            Ok(None)
        } else {
            Ok(Some(global))
        }
    }

    fn record(&self, event: &Event) -> Result<()> {
        if let Some(list) = self.lock()?.event_list.as_mut() {
            list.add(event.clone());
        }
        if let Some(global) = self.global()? {
            if let Some(list) = global.lock()?.event_list.as_mut() {
                list.add(event.clone());
            }
        }
        Ok(())
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

// Manual Debug implementation summarizing registry contents
impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("EventManager");
        match self.state.lock() {
            Ok(state) => {
                let counts: BTreeMap<String, usize> = state
                    .registry
                    .event_names()
                    .into_iter()
                    .map(|name| {
                        let count = state.registry.count(&name);
                        (name, count)
                    })
                    .collect();
                debug
                    .field("listeners", &counts)
                    .field("default_priority", &state.default_priority)
                    .field("is_global", &state.is_global)
                    .field("tracking_events", &state.event_list.is_some())
                    .field(
                        "tracked_events",
                        &state.event_list.as_ref().map_or(0, EventList::len),
                    );
            }
            Err(_) => {
                debug.field("state", &"<poisoned>");
            }
        }
        debug.field("bound_to_context", &self.context.is_some()).finish()
    }
}

/// Owner of the global event manager.
///
/// Pass a context to whatever needs the shared registry instead of reaching
/// for process-wide state. Clones refer to the same global slot.
#[derive(Clone, Default)]
pub struct EventContext {
    global: Arc<Mutex<Option<EventManager>>>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<EventManager>>> {
        self.global.lock().map_err(|_| EventSystemError::DispatcherPoisoned {
            component: "global_instance".to_string(),
        })
    }

    /// The global manager, created on first access
    pub fn instance(&self) -> Result<EventManager> {
        let mut slot = self.lock()?;
        let global = slot.get_or_insert_with(|| {
            debug!("Creating global event manager");
            let manager = EventManager::new();
            if let Ok(mut state) = manager.state.lock() {
                state.is_global = true;
            }
            manager
        });
        Ok(global.clone())
    }

    /// Install `manager` as the global instance.
    ///
    /// Local managers pick the replacement up on their next dispatch. The
    /// previous instance, if any, stops reporting itself as global.
    pub fn set_instance(&self, manager: EventManager) -> Result<EventManager> {
        // The stored handle holds no context link so the slot never owns itself.
        let installed = EventManager {
            state: Arc::clone(&manager.state),
            context: None,
        };
        installed.lock()?.is_global = true;

        let previous = self.lock()?.replace(installed.clone());
        if let Some(previous) = previous {
            if !previous.same_as(&installed) {
                previous.lock()?.is_global = false;
            }
        }
        debug!("Replaced global event manager");
        Ok(installed)
    }

    /// Create a local manager whose dispatches include this context's global listeners
    pub fn manager(&self) -> EventManager {
        EventManager::bound(self.clone())
    }
}

impl fmt::Debug for EventContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_instance = self.global.lock().map(|slot| slot.is_some()).unwrap_or(false);
        f.debug_struct("EventContext")
            .field("has_instance", &has_instance)
            .finish()
    }
}

/// Implemented by objects that own a local event manager.
pub trait EventDispatcher {
    fn event_manager(&self) -> &EventManager;

    /// Build an event from `name` and `data` and dispatch it through
    /// [`event_manager`](Self::event_manager)
    fn dispatch_event(&self, name: &str, data: EventData) -> Result<Event> {
        self.event_manager().dispatch(Event::new(name).with_data(data))
    }
}
