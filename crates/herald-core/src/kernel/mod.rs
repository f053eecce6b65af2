//! # Herald Kernel
//!
//! The `kernel` module ties the subsystems together.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application)
//!   owns the [`EventContext`](crate::event::EventContext) and the
//!   [`EventSettings`](crate::config::EventSettings) applied to every manager
//!   it hands out.
//! - **Core Constants**: application name and version, in the `constants`
//!   submodule.
//! - **Error Handling**: the crate-level [`Error`](error::Error) wrapping the
//!   event and configuration errors, and a `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use error::{Error, Result};
