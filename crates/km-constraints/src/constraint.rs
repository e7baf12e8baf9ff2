//! Constraint types
//!
//! Constraints are state-based tests evaluated once per trigger detection.
//! How they combine is controlled by the mapping's [`ConstraintMode`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Constraint errors
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("Invalid constraint configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for constraint operations
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// How a mapping's constraint list combines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintMode {
    /// All constraints must hold
    #[default]
    And,

    /// At least one constraint must hold
    Or,
}

/// Constraint definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "constraint", rename_all = "snake_case")]
pub enum Constraint {
    /// A specific app is in the foreground
    AppInForeground { package: String },

    /// A specific app is not in the foreground
    AppNotInForeground { package: String },

    /// The display is on
    ScreenOn,

    /// The display is off
    ScreenOff,

    /// A phone call is active
    InPhoneCall,

    /// No phone call is active and the phone is not ringing
    NotInPhoneCall,

    /// The phone is ringing
    PhoneRinging,

    /// A bluetooth device with this address is connected
    BtDeviceConnected { address: String },

    /// No bluetooth device with this address is connected
    BtDeviceDisconnected { address: String },

    /// Wifi is enabled
    WifiOn,

    /// Wifi is disabled
    WifiOff,

    /// Connected to a wifi network; with `ssid` set, to that network
    WifiConnected {
        #[serde(skip_serializing_if = "Option::is_none")]
        ssid: Option<String>,
    },

    /// A specific input method is the chosen one
    ImeChosen { ime_id: String },

    /// The lock screen is showing
    DeviceLocked,

    /// The lock screen is not showing
    DeviceUnlocked,

    /// The device is charging
    Charging,

    /// The device is discharging
    Discharging,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_deserialize_tagged() {
        let json = r#"{"constraint": "app_in_foreground", "package": "com.example.maps"}"#;
        let constraint: Constraint = serde_json::from_str(json).unwrap();
        assert_eq!(
            constraint,
            Constraint::AppInForeground {
                package: "com.example.maps".to_string()
            }
        );
    }

    #[test]
    fn test_unit_constraint_deserialize() {
        let json = r#"{"constraint": "screen_on"}"#;
        let constraint: Constraint = serde_json::from_str(json).unwrap();
        assert_eq!(constraint, Constraint::ScreenOn);
    }

    #[test]
    fn test_wifi_connected_any_network() {
        let json = r#"{"constraint": "wifi_connected"}"#;
        let constraint: Constraint = serde_json::from_str(json).unwrap();
        assert_eq!(constraint, Constraint::WifiConnected { ssid: None });
    }

    #[test]
    fn test_constraint_mode_default_is_and() {
        assert_eq!(ConstraintMode::default(), ConstraintMode::And);
        let mode: ConstraintMode = serde_json::from_str("\"or\"").unwrap();
        assert_eq!(mode, ConstraintMode::Or);
    }
}
