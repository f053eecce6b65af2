//! Event system settings read from a [`ConfigData`].
use serde::{Deserialize, Serialize};

use super::{ConfigData, Result};
use crate::event::{self, DEFAULT_PRIORITY, EventManager};

/// Configuration key for the default listener priority
pub const DEFAULT_PRIORITY_KEY: &str = "default_priority";
/// Configuration key enabling event tracking on new managers
pub const TRACK_EVENTS_KEY: &str = "track_events";

/// Settings applied to every event manager handed out by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSettings {
    pub default_priority: i32,
    pub track_events: bool,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            track_events: false,
        }
    }
}

impl EventSettings {
    /// Read the settings, falling back to defaults for missing keys.
    ///
    /// A key present with the wrong shape is an error rather than silently ignored.
    pub fn from_config(config: &ConfigData) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            default_priority: config
                .try_get(DEFAULT_PRIORITY_KEY)?
                .unwrap_or(defaults.default_priority),
            track_events: config.try_get(TRACK_EVENTS_KEY)?.unwrap_or(defaults.track_events),
        })
    }

    /// Write the settings back into `config`
    pub fn store(&self, config: &mut ConfigData) -> Result<()> {
        config.set(DEFAULT_PRIORITY_KEY, self.default_priority)?;
        config.set(TRACK_EVENTS_KEY, self.track_events)
    }

    /// Configure `manager` with these settings
    pub fn apply(&self, manager: &EventManager) -> event::Result<()> {
        manager.set_default_priority(self.default_priority)?;
        if self.track_events {
            manager.track_events(true)?;
        }
        Ok(())
    }
}
