//! Action types
//!
//! An [`ActionConfig`] is what mapping storage hands over; it is validated
//! into an [`Action`] before it can reach the execution engine. Malformed
//! repeat configuration is rejected here, so the engine can assume every
//! action it sees is well formed.

use km_core::{InputEventType, KeyCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("repeat is enabled but no repeat mode is set")]
    MissingRepeatMode,

    #[error("repeat rate must be greater than zero")]
    ZeroRepeatRate,

    #[error("repeat until limit reached requires a repeat limit")]
    MissingRepeatLimit,

    #[error("hold down is only supported for key event actions")]
    HoldDownUnsupported,

    #[error("hold down cannot be combined with repeat")]
    HoldDownWithRepeat,
}

/// Result type for configuration validation
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Output payload of an action
///
/// Opaque to the execution engine; the [`crate::ActionPerformer`] knows how
/// to carry each one out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionData {
    /// Inject a key event
    InputKeyEvent {
        key_code: KeyCode,
        #[serde(default)]
        meta_state: u32,
        #[serde(default)]
        device_id: u32,
        #[serde(default)]
        event_type: InputEventType,
        #[serde(default)]
        scan_code: u32,
    },

    /// Type a string of text
    Text { text: String },

    /// Open a URL
    Url { url: String },

    /// Launch an app
    App { package: String },

    /// Raise the media volume
    VolumeUp {
        #[serde(default)]
        show_ui: bool,
    },

    /// Lower the media volume
    VolumeDown {
        #[serde(default)]
        show_ui: bool,
    },

    /// Toggle the flashlight
    ToggleFlashlight,

    /// Navigate back
    GoBack,

    /// Go to the home screen
    GoHome,
}

impl ActionData {
    /// Whether this payload can be held down (pressed and released later)
    pub fn supports_hold_down(&self) -> bool {
        matches!(self, ActionData::InputKeyEvent { .. })
    }

    /// The same payload with a specific input event type, for key events
    pub fn with_event_type(&self, event_type: InputEventType) -> ActionData {
        match self {
            ActionData::InputKeyEvent {
                key_code,
                meta_state,
                device_id,
                scan_code,
                ..
            } => ActionData::InputKeyEvent {
                key_code: *key_code,
                meta_state: *meta_state,
                device_id: *device_id,
                event_type,
                scan_code: *scan_code,
            },
            other => other.clone(),
        }
    }
}

/// When a repeating action stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Run exactly `repeat_limit + 1` times, independent of later presses
    LimitReached,

    /// Repeat until the trigger is pressed again (capped by the limit when
    /// one is set)
    TriggerPressedAgain,
}

/// Validated repeat behavior of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatBehavior {
    /// Stop policy
    pub mode: RepeatMode,

    /// Milliseconds between repeats; None falls back to the global default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<u64>,

    /// Maximum additional repeats after the first execution; None means
    /// unbounded (only valid for [`RepeatMode::TriggerPressedAgain`])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Validated hold-down behavior of a key action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldDown {
    /// Milliseconds to hold before releasing; None falls back to the
    /// global default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// Action configuration as supplied by mapping storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// The output payload
    pub data: ActionData,

    /// Whether the action repeats
    #[serde(default)]
    pub repeat: bool,

    /// Stop policy; required when `repeat` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_mode: Option<RepeatMode>,

    /// Milliseconds between repeats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_rate: Option<u64>,

    /// Maximum additional repeats after the first execution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_limit: Option<u32>,

    /// Whether to hold the key down instead of a full press
    #[serde(default)]
    pub hold_down: bool,

    /// Milliseconds to hold the key down before releasing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_down_duration: Option<u64>,

    /// Milliseconds to wait before the next action in the mapping runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_before_next_action: Option<u64>,
}

impl ActionConfig {
    /// Create a non-repeating action configuration
    pub fn once(data: ActionData) -> Self {
        Self {
            data,
            repeat: false,
            repeat_mode: None,
            repeat_rate: None,
            repeat_limit: None,
            hold_down: false,
            hold_down_duration: None,
            delay_before_next_action: None,
        }
    }
}

/// A validated action, ready for the execution engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// The output payload
    pub data: ActionData,

    /// Repeat behavior; None for actions that execute once per detection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatBehavior>,

    /// Hold-down behavior; Some only for hold-down key actions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_down: Option<HoldDown>,

    /// Milliseconds to wait before the next action in the mapping runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_before_next_action: Option<u64>,
}

impl Action {
    /// Validate a configuration into an action
    pub fn from_config(config: ActionConfig) -> ConfigResult<Self> {
        if config.repeat_rate == Some(0) {
            return Err(ConfigError::ZeroRepeatRate);
        }

        let repeat = if config.repeat {
            let mode = config.repeat_mode.ok_or(ConfigError::MissingRepeatMode)?;
            if mode == RepeatMode::LimitReached && config.repeat_limit.is_none() {
                return Err(ConfigError::MissingRepeatLimit);
            }
            Some(RepeatBehavior {
                mode,
                rate: config.repeat_rate,
                limit: config.repeat_limit,
            })
        } else {
            None
        };

        let hold_down = if config.hold_down {
            if !config.data.supports_hold_down() {
                return Err(ConfigError::HoldDownUnsupported);
            }
            Some(HoldDown {
                duration: config.hold_down_duration,
            })
        } else {
            None
        };

        // A repeat tick would re-press a key that is still logically held,
        // so the two behaviors are mutually exclusive.
        if repeat.is_some() && hold_down.is_some() {
            return Err(ConfigError::HoldDownWithRepeat);
        }

        Ok(Self {
            data: config.data,
            repeat,
            hold_down,
            delay_before_next_action: config.delay_before_next_action,
        })
    }

    /// Build a non-repeating action directly
    pub fn once(data: ActionData) -> Self {
        Self {
            data,
            repeat: None,
            hold_down: None,
            delay_before_next_action: None,
        }
    }

    /// Whether the action repeats after its first execution
    pub fn repeats(&self) -> bool {
        self.repeat.is_some()
    }

    /// Total executions a session of this action may perform
    ///
    /// `repeat_limit + 1` when a limit is set, None when unbounded.
    pub fn execution_cap(&self) -> Option<u64> {
        self.repeat
            .as_ref()
            .and_then(|r| r.limit)
            .map(|limit| u64::from(limit) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(key_code: u32) -> ActionData {
        ActionData::InputKeyEvent {
            key_code: KeyCode(key_code),
            meta_state: 0,
            device_id: 0,
            event_type: InputEventType::DownUp,
            scan_code: 0,
        }
    }

    #[test]
    fn test_repeat_without_mode_rejected() {
        let config = ActionConfig {
            repeat: true,
            ..ActionConfig::once(key_event(24))
        };
        assert_eq!(
            Action::from_config(config),
            Err(ConfigError::MissingRepeatMode)
        );
    }

    #[test]
    fn test_zero_repeat_rate_rejected() {
        let config = ActionConfig {
            repeat: true,
            repeat_mode: Some(RepeatMode::TriggerPressedAgain),
            repeat_rate: Some(0),
            ..ActionConfig::once(key_event(24))
        };
        assert_eq!(Action::from_config(config), Err(ConfigError::ZeroRepeatRate));
    }

    #[test]
    fn test_limit_reached_requires_limit() {
        let config = ActionConfig {
            repeat: true,
            repeat_mode: Some(RepeatMode::LimitReached),
            ..ActionConfig::once(key_event(24))
        };
        assert_eq!(
            Action::from_config(config),
            Err(ConfigError::MissingRepeatLimit)
        );
    }

    #[test]
    fn test_valid_repeat_config() {
        let config = ActionConfig {
            repeat: true,
            repeat_mode: Some(RepeatMode::LimitReached),
            repeat_rate: Some(100),
            repeat_limit: Some(10),
            ..ActionConfig::once(key_event(24))
        };
        let action = Action::from_config(config).unwrap();

        assert!(action.repeats());
        assert_eq!(action.execution_cap(), Some(11));
        assert_eq!(
            action.repeat.unwrap().mode,
            RepeatMode::LimitReached
        );
    }

    #[test]
    fn test_unbounded_pressed_again_allowed() {
        let config = ActionConfig {
            repeat: true,
            repeat_mode: Some(RepeatMode::TriggerPressedAgain),
            ..ActionConfig::once(key_event(24))
        };
        let action = Action::from_config(config).unwrap();
        assert_eq!(action.execution_cap(), None);
    }

    #[test]
    fn test_hold_down_only_for_key_events() {
        let config = ActionConfig {
            hold_down: true,
            ..ActionConfig::once(ActionData::ToggleFlashlight)
        };
        assert_eq!(
            Action::from_config(config),
            Err(ConfigError::HoldDownUnsupported)
        );

        let config = ActionConfig {
            hold_down: true,
            hold_down_duration: Some(1000),
            ..ActionConfig::once(key_event(24))
        };
        let action = Action::from_config(config).unwrap();
        assert_eq!(
            action.hold_down,
            Some(HoldDown {
                duration: Some(1000)
            })
        );
    }

    #[test]
    fn test_hold_down_with_repeat_rejected() {
        let config = ActionConfig {
            repeat: true,
            repeat_mode: Some(RepeatMode::LimitReached),
            repeat_rate: Some(100),
            repeat_limit: Some(2),
            hold_down: true,
            hold_down_duration: Some(400),
            ..ActionConfig::once(key_event(24))
        };
        assert_eq!(
            Action::from_config(config),
            Err(ConfigError::HoldDownWithRepeat)
        );
    }

    #[test]
    fn test_repeat_mode_ignored_when_repeat_unset() {
        let config = ActionConfig {
            repeat_mode: Some(RepeatMode::LimitReached),
            ..ActionConfig::once(key_event(24))
        };
        let action = Action::from_config(config).unwrap();
        assert!(!action.repeats());
    }

    #[test]
    fn test_with_event_type_rewrites_key_events_only() {
        let down = key_event(24).with_event_type(InputEventType::Down);
        assert!(matches!(
            down,
            ActionData::InputKeyEvent {
                event_type: InputEventType::Down,
                ..
            }
        ));

        let other = ActionData::GoBack.with_event_type(InputEventType::Down);
        assert_eq!(other, ActionData::GoBack);
    }

    #[test]
    fn test_action_config_deserialize() {
        let json = r#"{
            "data": {"action": "input_key_event", "key_code": 25},
            "repeat": true,
            "repeat_mode": "trigger_pressed_again",
            "repeat_rate": 100,
            "repeat_limit": 10
        }"#;

        let config: ActionConfig = serde_json::from_str(json).unwrap();
        let action = Action::from_config(config).unwrap();
        assert_eq!(action.execution_cap(), Some(11));
    }
}
