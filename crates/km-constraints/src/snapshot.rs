//! Point-in-time reads of system state
//!
//! A [`ConstraintSnapshot`] captures everything constraints can test, at
//! one instant. Fields are `Option` because adapters can be unavailable
//! (missing permission, no such hardware); an unknown field makes any
//! constraint that needs it evaluate to false.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Call state of the phone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    Idle,
    Ringing,
    InCall,
}

/// Wifi adapter state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiState {
    /// Whether the wifi adapter is enabled
    pub enabled: bool,

    /// SSID of the connected network, if connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_ssid: Option<String>,
}

/// An immutable read of system state taken once per detection event
///
/// Shared by all actions of the detection that captured it and read-only
/// from then on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSnapshot {
    /// Package name of the foreground app
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_package: Option<String>,

    /// Whether the display is on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_on: Option<bool>,

    /// Current call state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_state: Option<CallState>,

    /// Wifi adapter state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wifi: Option<WifiState>,

    /// Addresses of connected bluetooth devices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_bt_devices: Option<Vec<String>>,

    /// Whether the lock screen is showing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_locked: Option<bool>,

    /// ID of the chosen input method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_ime_id: Option<String>,

    /// Whether the device is charging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging: Option<bool>,
}

impl ConstraintSnapshot {
    /// Create a snapshot with every field unknown
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Set the foreground app package
    pub fn with_foreground_package(mut self, package: impl Into<String>) -> Self {
        self.foreground_package = Some(package.into());
        self
    }

    /// Set the screen state
    pub fn with_screen_on(mut self, on: bool) -> Self {
        self.screen_on = Some(on);
        self
    }

    /// Set the call state
    pub fn with_call_state(mut self, state: CallState) -> Self {
        self.call_state = Some(state);
        self
    }

    /// Set the wifi state
    pub fn with_wifi(mut self, enabled: bool, connected_ssid: Option<String>) -> Self {
        self.wifi = Some(WifiState {
            enabled,
            connected_ssid,
        });
        self
    }

    /// Set the connected bluetooth devices
    pub fn with_bt_devices(mut self, addresses: Vec<String>) -> Self {
        self.connected_bt_devices = Some(addresses);
        self
    }

    /// Set the lock screen state
    pub fn with_device_locked(mut self, locked: bool) -> Self {
        self.device_locked = Some(locked);
        self
    }

    /// Set the chosen input method
    pub fn with_chosen_ime(mut self, ime_id: impl Into<String>) -> Self {
        self.chosen_ime_id = Some(ime_id.into());
        self
    }

    /// Set the charging state
    pub fn with_charging(mut self, charging: bool) -> Self {
        self.charging = Some(charging);
        self
    }
}

/// Provider of constraint snapshots
///
/// The real implementation queries platform adapters (display, phone,
/// network, input method, power). The engine asks for one snapshot per
/// detection and shares it across the mapping's actions.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Capture the current system state
    async fn snapshot(&self) -> ConstraintSnapshot;
}

/// A source that always returns the same snapshot, for tests and tools
#[derive(Debug, Clone, Default)]
pub struct FixedSnapshotSource {
    snapshot: ConstraintSnapshot,
}

impl FixedSnapshotSource {
    /// Create a source returning `snapshot` on every call
    pub fn new(snapshot: ConstraintSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl SnapshotSource for FixedSnapshotSource {
    async fn snapshot(&self) -> ConstraintSnapshot {
        self.snapshot.clone()
    }
}
