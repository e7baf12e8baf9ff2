//! Mappings for keymapd
//!
//! A mapping binds one trigger to an ordered list of actions plus
//! constraints. This crate owns the mapping model, its validating
//! configuration layer, the concurrent [`MappingStore`], and the global
//! timing defaults every trigger and action can fall back to.

mod mapping;
mod options;
mod source;
mod store;
mod trigger;

pub use mapping::{Mapping, MappingConfig, MappingError, MappingResult};
pub use options::DefaultOptions;
pub use source::{MappingSource, StaticMappingSource};
pub use store::MappingStore;
pub use trigger::{Trigger, TriggerMode};
