//! Mapping definition
//!
//! A mapping ties one trigger to an ordered list of actions plus
//! constraints. [`MappingConfig`] is what storage hands over;
//! [`Mapping::from_config`] validates every action before the mapping can
//! reach the engine, so the controller never sees a malformed repeat
//! configuration.

use chrono::{DateTime, Utc};
use km_actions::{Action, ActionConfig, ConfigError};
use km_constraints::{Constraint, ConstraintMode};
use km_core::MappingId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Trigger;

/// Mapping errors
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Mapping not found: {0}")]
    NotFound(String),

    #[error("Mapping has no actions")]
    NoActions,

    #[error("Invalid action at index {index}: {source}")]
    InvalidAction {
        index: usize,
        #[source]
        source: ConfigError,
    },

    #[error("Invalid mapping configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;

/// Mapping configuration as supplied by storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Unique ID (optional, auto-generated if not provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The trigger that fires this mapping
    pub trigger: Trigger,

    /// Actions to execute, in order
    pub actions: Vec<ActionConfig>,

    /// Constraints that gate execution
    #[serde(default)]
    pub constraints: Vec<Constraint>,

    /// How the constraints combine
    #[serde(default)]
    pub constraint_mode: ConstraintMode,

    /// Whether the mapping is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Vibrate when this mapping triggers
    #[serde(default)]
    pub vibrate: bool,

    /// Vibration duration override in ms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibrate_duration: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

/// A validated mapping
///
/// Immutable once built; the engine receives a snapshot per detection and
/// never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// Unique identifier
    pub id: MappingId,

    /// The trigger that fires this mapping
    pub trigger: Trigger,

    /// Actions to execute, in order
    pub actions: Vec<Action>,

    /// Constraints that gate execution
    pub constraints: Vec<Constraint>,

    /// How the constraints combine
    pub constraint_mode: ConstraintMode,

    /// Whether the mapping is enabled
    pub enabled: bool,

    /// Vibrate when this mapping triggers
    pub vibrate: bool,

    /// Vibration duration override in ms
    pub vibrate_duration: Option<u64>,

    /// Last time this mapping was triggered
    pub last_triggered: Option<DateTime<Utc>>,
}

impl Mapping {
    /// Validate a configuration into a mapping
    pub fn from_config(config: MappingConfig) -> MappingResult<Self> {
        if config.actions.is_empty() {
            return Err(MappingError::NoActions);
        }

        let actions = config
            .actions
            .into_iter()
            .enumerate()
            .map(|(index, action)| {
                Action::from_config(action)
                    .map_err(|source| MappingError::InvalidAction { index, source })
            })
            .collect::<MappingResult<Vec<_>>>()?;

        let id = config
            .id
            .map(MappingId::from)
            .unwrap_or_else(MappingId::generate);

        Ok(Self {
            id,
            trigger: config.trigger,
            actions,
            constraints: config.constraints,
            constraint_mode: config.constraint_mode,
            enabled: config.enabled,
            vibrate: config.vibrate,
            vibrate_duration: config.vibrate_duration,
            last_triggered: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_actions::ActionData;
    use km_core::{KeyCode, KeyDescriptor, TriggerId};

    fn sample_config() -> MappingConfig {
        serde_json::from_str(
            r#"{
                "id": "vol_up_map",
                "trigger": {
                    "id": "vol_up_short",
                    "keys": [{"key_code": 24}]
                },
                "actions": [
                    {"data": {"action": "volume_up"}}
                ],
                "constraints": [
                    {"constraint": "screen_on"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_mapping_from_config() {
        let mapping = Mapping::from_config(sample_config()).unwrap();

        assert_eq!(mapping.id.as_str(), "vol_up_map");
        assert_eq!(mapping.trigger.id, TriggerId::from("vol_up_short"));
        assert!(mapping.enabled);
        assert_eq!(mapping.actions.len(), 1);
        assert_eq!(mapping.constraints.len(), 1);
        assert_eq!(mapping.constraint_mode, ConstraintMode::And);
        assert!(mapping.last_triggered.is_none());
    }

    #[test]
    fn test_mapping_without_actions_rejected() {
        let config = MappingConfig {
            actions: vec![],
            ..sample_config()
        };
        assert!(matches!(
            Mapping::from_config(config),
            Err(MappingError::NoActions)
        ));
    }

    #[test]
    fn test_invalid_action_reports_index() {
        let mut config = sample_config();
        config.actions.push(ActionConfig {
            repeat: true,
            ..ActionConfig::once(ActionData::InputKeyEvent {
                key_code: KeyCode::VOLUME_DOWN,
                meta_state: 0,
                device_id: 0,
                event_type: Default::default(),
                scan_code: 0,
            })
        });

        match Mapping::from_config(config) {
            Err(MappingError::InvalidAction { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source, ConfigError::MissingRepeatMode);
            }
            other => panic!("expected InvalidAction, got {:?}", other),
        }
    }

    #[test]
    fn test_auto_generated_id() {
        let config = MappingConfig {
            id: None,
            ..sample_config()
        };
        let mapping = Mapping::from_config(config).unwrap();

        // ULID format
        assert_eq!(mapping.id.as_str().len(), 26);
    }

    #[test]
    fn test_trigger_keys_preserved() {
        let mut config = sample_config();
        config.trigger.keys = vec![
            KeyDescriptor::any_device(KeyCode::VOLUME_DOWN),
            KeyDescriptor::any_device(KeyCode::VOLUME_UP),
        ];

        let mapping = Mapping::from_config(config).unwrap();
        assert_eq!(mapping.trigger.keys.len(), 2);
        assert_eq!(mapping.trigger.keys[0].key_code, KeyCode::VOLUME_DOWN);
    }
}
