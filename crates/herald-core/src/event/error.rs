//! # Herald Event System Errors
//!
//! Defines error types specific to the Herald event system.
//!
//! [`EventSystemError`] covers invalid listener registrations, failures raised
//! by listeners while an event is being dispatched, and poisoned registry
//! locks.
use thiserror::Error;

/// Boxed error a listener may return to abort a dispatch.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("An event name is required when attaching a plain callable")]
    MissingEventName,

    #[error("Listener failed while handling event '{event_name}': {source}")]
    ListenerFailed {
        event_name: String,
        #[source]
        source: ListenerError,
    },

    #[error("Listener cannot be invoked this way, it expects {expected}")]
    UnsupportedInvocation {
        expected: &'static str,
    },

    #[error("Listener does not provide a handler named '{handler}'")]
    UnknownHandler {
        handler: String,
    },

    #[error("Attempted to operate on a poisoned event manager component: {component}")]
    DispatcherPoisoned {
        component: String, // e.g., "listener_registry", "global_instance"
    },
}

/// Shorthand for results produced by the event system.
pub type Result<T> = std::result::Result<T, EventSystemError>;
