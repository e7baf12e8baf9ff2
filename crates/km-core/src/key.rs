//! Physical key descriptors
//!
//! A KeyDescriptor identifies one hardware key as the detection layer sees
//! it: its key code, optionally the input device it must come from, and the
//! raw scan code when the key has no mapped code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const BACK: KeyCode = KeyCode(4);
    pub const VOLUME_UP: KeyCode = KeyCode(24);
    pub const VOLUME_DOWN: KeyCode = KeyCode(25);
    pub const HEADSET_BUTTON: KeyCode = KeyCode(79);
    pub const MENU: KeyCode = KeyCode(82);
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keycode {}", self.0)
    }
}

/// How a key event should be delivered when imitating a press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEventType {
    /// Press and release as one unit
    #[default]
    DownUp,
    /// Press only; the release is delivered separately
    Down,
    /// Release only
    Up,
}

/// One hardware key in a trigger, as configured by the user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// The key code to match
    pub key_code: KeyCode,

    /// Restrict matching to events from this input device descriptor.
    /// None matches the key on any device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_descriptor: Option<String>,

    /// Raw scan code, for keys the platform reports without a key code
    #[serde(default)]
    pub scan_code: u32,
}

impl KeyDescriptor {
    /// Create a descriptor matching a key code on any device
    pub fn any_device(key_code: KeyCode) -> Self {
        Self {
            key_code,
            device_descriptor: None,
            scan_code: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_descriptor_any_device() {
        let key = KeyDescriptor::any_device(KeyCode::VOLUME_UP);
        assert_eq!(key.key_code, KeyCode(24));
        assert!(key.device_descriptor.is_none());
    }

    #[test]
    fn test_input_event_type_serde() {
        let t: InputEventType = serde_json::from_str("\"down_up\"").unwrap();
        assert_eq!(t, InputEventType::DownUp);
        assert_eq!(InputEventType::default(), InputEventType::DownUp);
    }
}
