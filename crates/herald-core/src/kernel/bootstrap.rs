use std::path::Path;

use crate::config::{ConfigData, EventSettings};
use crate::event::{EventContext, EventManager};
use crate::kernel::constants;
use crate::kernel::error::Result;

/// Main application struct owning the event context and its settings
#[derive(Debug, Clone)]
pub struct Application {
    context: EventContext,
    settings: EventSettings,
}

impl Application {
    /// Creates a new application with default event settings.
    pub fn new() -> Result<Self> {
        Self::with_settings(EventSettings::default())
    }

    /// Creates a new application whose managers use `settings`.
    ///
    /// The global manager is created eagerly so the settings reach it.
    pub fn with_settings(settings: EventSettings) -> Result<Self> {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        let context = EventContext::new();
        settings.apply(&context.instance()?)?;
        log::debug!(
            "Event settings: default priority {}, tracking {}",
            settings.default_priority,
            settings.track_events
        );
        Ok(Application { context, settings })
    }

    /// Creates an application from already loaded configuration.
    pub fn from_config(config: &ConfigData) -> Result<Self> {
        Self::with_settings(EventSettings::from_config(config)?)
    }

    /// Loads the configuration file at `path` and creates an application from it.
    pub fn load(path: &Path) -> Result<(Self, ConfigData)> {
        let config = ConfigData::load(path)?;
        log::info!("Using configuration file: {}", path.display());
        let app = Self::from_config(&config)?;
        Ok((app, config))
    }

    pub fn context(&self) -> &EventContext {
        &self.context
    }

    pub fn settings(&self) -> &EventSettings {
        &self.settings
    }

    /// The context's global manager
    pub fn global_manager(&self) -> Result<EventManager> {
        Ok(self.context.instance()?)
    }

    /// Replace the global manager, applying the application settings to it
    pub fn set_global_manager(&self, manager: EventManager) -> Result<EventManager> {
        self.settings.apply(&manager)?;
        Ok(self.context.set_instance(manager)?)
    }

    /// A fresh local manager bound to the context, with the settings applied
    pub fn local_manager(&self) -> Result<EventManager> {
        let manager = self.context.manager();
        self.settings.apply(&manager)?;
        Ok(manager)
    }
}
