//! Mapping storage and trigger resolution
//!
//! The MappingStore holds the validated mapping set and resolves trigger
//! identifiers back to mappings. Detection and the mapping set can
//! transiently diverge during reconfiguration, so resolution of an unknown
//! trigger id is a normal miss, not an error.

use chrono::Utc;
use dashmap::DashMap;
use km_core::{MappingId, TriggerId};
use tracing::{debug, info};

use crate::{Mapping, MappingConfig, MappingError, MappingResult};

/// Manages all mappings and the trigger-id index over them
pub struct MappingStore {
    /// All mappings by ID
    mappings: DashMap<MappingId, Mapping>,
    /// Index from trigger ID to owning mapping ID
    by_trigger: DashMap<TriggerId, MappingId>,
}

impl MappingStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            mappings: DashMap::new(),
            by_trigger: DashMap::new(),
        }
    }

    /// Load mappings from configs
    pub fn load(&self, configs: Vec<MappingConfig>) -> MappingResult<()> {
        for config in configs {
            let mapping = Mapping::from_config(config)?;
            if self.by_trigger.contains_key(&mapping.trigger.id) {
                return Err(MappingError::InvalidConfig(format!(
                    "Trigger {} is already bound to another mapping",
                    mapping.trigger.id
                )));
            }
            info!(
                mapping_id = %mapping.id,
                trigger_id = %mapping.trigger.id,
                "Loaded mapping"
            );
            self.by_trigger
                .insert(mapping.trigger.id.clone(), mapping.id.clone());
            self.mappings.insert(mapping.id.clone(), mapping);
        }
        Ok(())
    }

    /// Add a new mapping
    pub fn add(&self, config: MappingConfig) -> MappingResult<MappingId> {
        let mapping = Mapping::from_config(config)?;
        let id = mapping.id.clone();

        if self.mappings.contains_key(&id) {
            return Err(MappingError::InvalidConfig(format!(
                "Mapping with ID {} already exists",
                id
            )));
        }
        if self.by_trigger.contains_key(&mapping.trigger.id) {
            return Err(MappingError::InvalidConfig(format!(
                "Trigger {} is already bound to another mapping",
                mapping.trigger.id
            )));
        }

        info!(mapping_id = %id, trigger_id = %mapping.trigger.id, "Added mapping");
        self.by_trigger
            .insert(mapping.trigger.id.clone(), id.clone());
        self.mappings.insert(id.clone(), mapping);
        Ok(id)
    }

    /// Get a mapping by ID
    pub fn get(&self, id: &MappingId) -> Option<Mapping> {
        self.mappings.get(id).map(|m| m.value().clone())
    }

    /// Resolve a trigger ID to its mapping
    pub fn resolve(&self, trigger_id: &TriggerId) -> Option<Mapping> {
        let mapping_id = self.by_trigger.get(trigger_id)?;
        self.mappings.get(mapping_id.value()).map(|m| m.clone())
    }

    /// Get all mappings
    pub fn all(&self) -> Vec<Mapping> {
        self.mappings.iter().map(|m| m.value().clone()).collect()
    }

    /// Get mapping count
    pub fn count(&self) -> usize {
        self.mappings.len()
    }

    /// Enable a mapping
    pub fn enable(&self, id: &MappingId) -> MappingResult<()> {
        let mut mapping = self
            .mappings
            .get_mut(id)
            .ok_or_else(|| MappingError::NotFound(id.to_string()))?;

        mapping.enabled = true;
        info!(mapping_id = %id, "Enabled mapping");
        Ok(())
    }

    /// Disable a mapping
    pub fn disable(&self, id: &MappingId) -> MappingResult<()> {
        let mut mapping = self
            .mappings
            .get_mut(id)
            .ok_or_else(|| MappingError::NotFound(id.to_string()))?;

        mapping.enabled = false;
        info!(mapping_id = %id, "Disabled mapping");
        Ok(())
    }

    /// Toggle a mapping, returning the new enabled state
    pub fn toggle(&self, id: &MappingId) -> MappingResult<bool> {
        let mut mapping = self
            .mappings
            .get_mut(id)
            .ok_or_else(|| MappingError::NotFound(id.to_string()))?;

        mapping.enabled = !mapping.enabled;
        info!(mapping_id = %id, enabled = mapping.enabled, "Toggled mapping");
        Ok(mapping.enabled)
    }

    /// Remove a mapping
    pub fn remove(&self, id: &MappingId) -> MappingResult<Mapping> {
        let (_, mapping) = self
            .mappings
            .remove(id)
            .ok_or_else(|| MappingError::NotFound(id.to_string()))?;

        self.by_trigger.remove(&mapping.trigger.id);
        Ok(mapping)
    }

    /// Update last triggered time
    pub fn mark_triggered(&self, id: &MappingId) {
        if let Some(mut mapping) = self.mappings.get_mut(id) {
            mapping.last_triggered = Some(Utc::now());
            debug!(mapping_id = %id, "Marked mapping as triggered");
        }
    }

    /// Replace the whole mapping set
    pub fn reload(&self, configs: Vec<MappingConfig>) -> MappingResult<()> {
        self.mappings.clear();
        self.by_trigger.clear();

        self.load(configs)?;

        info!(count = self.mappings.len(), "Reloaded mappings");
        Ok(())
    }
}

impl Default for MappingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config(mapping_id: &str, trigger_id: &str) -> MappingConfig {
        serde_json::from_str(&format!(
            r#"{{
                "id": "{mapping_id}",
                "trigger": {{
                    "id": "{trigger_id}",
                    "keys": [{{"key_code": 24}}]
                }},
                "actions": [
                    {{"data": {{"action": "volume_up"}}}}
                ]
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_load_and_resolve() {
        let store = MappingStore::new();
        store.load(vec![sample_config("m1", "t1")]).unwrap();

        assert_eq!(store.count(), 1);
        let mapping = store.resolve(&TriggerId::from("t1")).unwrap();
        assert_eq!(mapping.id, MappingId::from("m1"));
    }

    #[test]
    fn test_resolve_unknown_trigger_is_none() {
        let store = MappingStore::new();
        store.load(vec![sample_config("m1", "t1")]).unwrap();

        assert!(store.resolve(&TriggerId::from("nope")).is_none());
    }

    #[test]
    fn test_enable_disable_toggle() {
        let store = MappingStore::new();
        store.load(vec![sample_config("m1", "t1")]).unwrap();
        let id = MappingId::from("m1");

        store.disable(&id).unwrap();
        assert!(!store.get(&id).unwrap().enabled);

        store.enable(&id).unwrap();
        assert!(store.get(&id).unwrap().enabled);

        assert!(!store.toggle(&id).unwrap());
        assert!(store.toggle(&id).unwrap());
    }

    #[test]
    fn test_remove_clears_trigger_index() {
        let store = MappingStore::new();
        store.load(vec![sample_config("m1", "t1")]).unwrap();

        store.remove(&MappingId::from("m1")).unwrap();
        assert!(store.resolve(&TriggerId::from("t1")).is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = MappingStore::new();
        store.add(sample_config("m1", "t1")).unwrap();

        assert!(matches!(
            store.add(sample_config("m1", "t2")),
            Err(MappingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_duplicate_trigger_id_rejected() {
        let store = MappingStore::new();
        assert!(matches!(
            store.load(vec![sample_config("m1", "t1"), sample_config("m2", "t1")]),
            Err(MappingError::InvalidConfig(_))
        ));

        let store = MappingStore::new();
        store.add(sample_config("m1", "t1")).unwrap();
        assert!(matches!(
            store.add(sample_config("m2", "t1")),
            Err(MappingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_reload_replaces_set() {
        let store = MappingStore::new();
        store.load(vec![sample_config("m1", "t1")]).unwrap();

        store.reload(vec![sample_config("m2", "t2")]).unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.resolve(&TriggerId::from("t1")).is_none());
        assert!(store.resolve(&TriggerId::from("t2")).is_some());
    }

    #[test]
    fn test_mark_triggered_sets_timestamp() {
        let store = MappingStore::new();
        store.load(vec![sample_config("m1", "t1")]).unwrap();
        let id = MappingId::from("m1");

        assert!(store.get(&id).unwrap().last_triggered.is_none());
        store.mark_triggered(&id);
        assert!(store.get(&id).unwrap().last_triggered.is_some());
    }
}
