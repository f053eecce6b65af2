//! # Herald Event System
//!
//! Priority-ordered publish/subscribe.
//!
//! Listeners are attached to an [`EventManager`] under an event name and a
//! priority; lower priorities run first and equal priorities run in attach
//! order. A local manager (from [`EventContext::manager`]) also runs the
//! listeners of its context's global manager, global ones first within a
//! shared priority.
//!
//! Listeners are either plain [`Callable`]s or declarative
//! [`EventListener`] objects that map event names to their own handlers.
pub mod error;
pub mod list;
pub mod listener;
pub mod manager;
pub mod registry;
pub mod types;

/// Priority used when an attachment does not name one
pub const DEFAULT_PRIORITY: i32 = 10;

/// Re-export important types
pub use error::{EventSystemError, ListenerError, Result};
pub use list::EventList;
pub use listener::{
    Callable, EventListener, Handler, Invocation, Listener, ListenerResult, Subscription,
};
pub use manager::{AttachOptions, EventContext, EventDispatcher, EventManager};
pub use registry::{ListenerEntry, PriorityBuckets};
pub use types::{Event, EventData};

// Test module declaration
#[cfg(test)]
mod tests;
