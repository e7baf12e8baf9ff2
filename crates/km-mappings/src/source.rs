//! External supply of mapping definitions
//!
//! Persistence is outside this workspace; whatever owns the stored
//! mapping definitions and preference-backed defaults implements
//! [`MappingSource`] and the host feeds a [`crate::MappingStore`] from it
//! on startup and on every change signal.

use crate::{DefaultOptions, MappingConfig, MappingResult, MappingStore};

/// Supplies the configured mapping set and the global default options
pub trait MappingSource: Send + Sync {
    /// The current mapping configurations
    fn mapping_configs(&self) -> Vec<MappingConfig>;

    /// The current global defaults
    fn default_options(&self) -> DefaultOptions;
}

impl MappingStore {
    /// Replace this store's contents from a source
    pub fn sync_from(&self, source: &dyn MappingSource) -> MappingResult<()> {
        self.reload(source.mapping_configs())
    }
}

/// A source over a fixed in-memory set, for tests and tools
pub struct StaticMappingSource {
    configs: Vec<MappingConfig>,
    options: DefaultOptions,
}

impl StaticMappingSource {
    /// Create a source over the given configs with default options
    pub fn new(configs: Vec<MappingConfig>) -> Self {
        Self {
            configs,
            options: DefaultOptions::default(),
        }
    }

    /// Set the default options the source reports
    pub fn with_options(mut self, options: DefaultOptions) -> Self {
        self.options = options;
        self
    }
}

impl MappingSource for StaticMappingSource {
    fn mapping_configs(&self) -> Vec<MappingConfig> {
        self.configs.clone()
    }

    fn default_options(&self) -> DefaultOptions {
        self.options
    }
}
