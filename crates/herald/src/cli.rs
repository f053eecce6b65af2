//! Listeners scripted from a configuration file, and the printing used by
//! the `listeners` and `dispatch` commands.
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use herald_core::config::ConfigError;
use herald_core::event::{
    EventListener, EventManager, EventSystemError, Invocation, ListenerResult, Subscription,
};
use herald_core::kernel::error::Result;
use herald_core::{AttachOptions, Application, ConfigData, Event};

/// Which manager a scripted listener is attached to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    #[default]
    Local,
}

impl Scope {
    fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Local => "local",
        }
    }
}

/// One entry of the `listeners` configuration list
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerConfig {
    pub name: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub events: Map<String, Value>,
    #[serde(default)]
    pub returns: Map<String, Value>,
}

/// Declarative listener whose handlers print a trace line and return a configured value
#[derive(Debug)]
pub struct ScriptedListener {
    name: String,
    scope: Scope,
    events: Vec<(String, Subscription)>,
    returns: Map<String, Value>,
}

impl ScriptedListener {
    pub fn from_config(index: usize, entry: ListenerConfig) -> Result<Self> {
        let mut events = Vec::with_capacity(entry.events.len());
        for (event_name, raw) in entry.events {
            let subscription = serde_json::from_value(raw).map_err(|e| ConfigError::InvalidValue {
                key: format!("listeners[{}].events.{}", index, event_name),
                reason: e.to_string(),
            })?;
            events.push((event_name, subscription));
        }
        Ok(Self {
            name: entry.name,
            scope: entry.scope,
            events,
            returns: entry.returns,
        })
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    fn declares(&self, handler: &str) -> bool {
        self.events
            .iter()
            .flat_map(|(_, subscription)| subscription.handlers())
            .any(|declared| declared.name == handler)
    }
}

impl EventListener for ScriptedListener {
    fn implemented_events(&self) -> Vec<(String, Subscription)> {
        self.events.clone()
    }

    fn handle(&self, handler: &str, invocation: Invocation<'_>) -> ListenerResult {
        if !self.declares(handler) {
            return Err(EventSystemError::UnknownHandler {
                handler: handler.to_string(),
            }
            .into());
        }
        let received = match invocation {
            Invocation::Event(event) => format!("event {}", event.name()),
            Invocation::Params(params) => format!("params {}", Value::Array(params.to_vec())),
        };
        println!("-> {} {}.{} ({})", self.scope.as_str(), self.name, handler, received);
        Ok(self.returns.get(handler).cloned())
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Managers populated from a configuration file
#[derive(Debug)]
pub struct Wiring {
    pub global: EventManager,
    pub local: EventManager,
}

/// Attach every configured listener to the global or a fresh local manager
pub fn wire(app: &Application, config: &ConfigData) -> Result<Wiring> {
    let global = app.global_manager()?;
    let local = app.local_manager()?;

    let entries: Vec<ListenerConfig> = config.try_get("listeners")?.unwrap_or_default();
    for (index, entry) in entries.into_iter().enumerate() {
        let listener = ScriptedListener::from_config(index, entry)?;
        let target = match listener.scope() {
            Scope::Global => &global,
            Scope::Local => &local,
        };
        log::debug!(
            "Attaching scripted listener '{}' ({})",
            listener.name,
            listener.scope.as_str()
        );
        target.attach(Arc::new(listener), None, AttachOptions::default())?;
    }

    Ok(Wiring { global, local })
}

/// Print the merged, priority-ordered listeners of every event, or only of `only`
pub fn print_listeners(wiring: &Wiring, only: Option<&str>) -> Result<()> {
    let mut names = wiring.global.event_names()?;
    names.extend(wiring.local.event_names()?);
    names.sort();
    names.dedup();
    if let Some(only) = only {
        names.retain(|name| name == only);
    }

    if names.is_empty() {
        println!("No listeners registered.");
        return Ok(());
    }

    for name in names {
        let global_buckets = wiring.global.prioritised_listeners(&name)?;
        println!("{}:", name);
        for entry in wiring.local.listeners(&name)? {
            let is_global = global_buckets
                .values()
                .flatten()
                .any(|candidate| candidate.callable().same_as(entry.callable()));
            let scope = if is_global { Scope::Global } else { Scope::Local };
            let params = if entry.pass_params() { " (passParams)" } else { "" };
            println!(
                "  {:>4}  {:<6}  {}{}",
                entry.priority(),
                scope.as_str(),
                entry.callable().label().unwrap_or("<anonymous>"),
                params
            );
        }
    }
    Ok(())
}

/// Dispatch `event_name` through the local manager and print the outcome
pub fn dispatch_and_report(
    wiring: &Wiring,
    event_name: &str,
    params: Vec<(String, Value)>,
) -> Result<Event> {
    let event = params
        .into_iter()
        .fold(Event::new(event_name), |event, (key, value)| event.with_param(key, value));

    let event = wiring.local.dispatch(event)?;
    println!("stopped: {}", event.is_stopped());
    match event.result() {
        Some(result) => println!("result: {}", result),
        None => println!("result: null"),
    }
    if let Some(list) = wiring.local.event_list()? {
        println!("tracked: {}", list.len());
    }
    Ok(event)
}

/// Parse a `key=value` argument; the value is read as JSON, falling back to a plain string
pub fn parse_param(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
