//! Global timing defaults
//!
//! Every per-trigger and per-action timing option can be left unset, in
//! which case these defaults apply. The host recomputes and injects a new
//! snapshot when the preference store signals a change; the engine never
//! reads preferences ad hoc.

use serde::{Deserialize, Serialize};

/// Global default options, injected into the engine as an immutable value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultOptions {
    /// Hold time in ms before a press counts as a long press
    #[serde(default = "default_long_press_delay")]
    pub long_press_delay: u64,

    /// Maximum gap in ms between the presses of a double press
    #[serde(default = "default_double_press_delay")]
    pub double_press_delay: u64,

    /// Timeout in ms for completing a key sequence trigger
    #[serde(default = "default_sequence_trigger_timeout")]
    pub sequence_trigger_timeout: u64,

    /// Milliseconds between repeats of a repeating action
    #[serde(default = "default_repeat_rate")]
    pub repeat_rate: u64,

    /// Milliseconds a hold-down action keeps the key pressed
    #[serde(default = "default_hold_down_duration")]
    pub hold_down_duration: u64,

    /// Haptic feedback duration in ms
    #[serde(default = "default_vibrate_duration")]
    pub vibrate_duration: u64,

    /// Vibrate on every trigger, even for mappings that don't ask for it
    #[serde(default)]
    pub force_vibrate: bool,
}

fn default_long_press_delay() -> u64 {
    500
}

fn default_double_press_delay() -> u64 {
    300
}

fn default_sequence_trigger_timeout() -> u64 {
    1000
}

fn default_repeat_rate() -> u64 {
    50
}

fn default_hold_down_duration() -> u64 {
    1000
}

fn default_vibrate_duration() -> u64 {
    200
}

impl Default for DefaultOptions {
    fn default() -> Self {
        Self {
            long_press_delay: default_long_press_delay(),
            double_press_delay: default_double_press_delay(),
            sequence_trigger_timeout: default_sequence_trigger_timeout(),
            repeat_rate: default_repeat_rate(),
            hold_down_duration: default_hold_down_duration(),
            vibrate_duration: default_vibrate_duration(),
            force_vibrate: false,
        }
    }
}
