//! # Herald Core
//!
//! Priority-ordered event dispatch with global and local listener
//! registries, declarative listeners and configuration loading.
pub mod config;
pub mod event;
pub mod kernel;

// Re-export key public types/traits for easier use by the binary
pub use config::{ConfigData, ConfigFormat, EventSettings};
pub use event::{
    AttachOptions, Callable, Event, EventContext, EventDispatcher, EventListener, EventManager,
    Handler, Invocation, ListenerResult, Subscription,
};
pub use kernel::Application;
pub use kernel::error::Error as KernelError;

#[cfg(test)]
mod tests;
