//! Trigger types
//!
//! A trigger is the configured input pattern whose recognition reduces to a
//! stable [`TriggerId`]. The raw key-event classifier lives outside this
//! workspace; it reads the timing windows resolved here.

use km_core::{KeyDescriptor, TriggerId};
use serde::{Deserialize, Serialize};

use crate::DefaultOptions;

/// Recognition mode of a trigger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// All keys pressed together and released quickly
    #[default]
    ShortPress,

    /// All keys held past the long-press delay
    LongPress,

    /// The keys pressed twice within the double-press delay
    DoublePress,

    /// The keys pressed one after another within the sequence timeout
    Sequence,
}

/// A configured input pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Stable identifier assigned at configuration time
    pub id: TriggerId,

    /// The keys of the pattern, in order (order only matters for
    /// [`TriggerMode::Sequence`])
    pub keys: Vec<KeyDescriptor>,

    /// Recognition mode
    #[serde(default)]
    pub mode: TriggerMode,

    /// Also fire when the focused app is not the host
    #[serde(default)]
    pub trigger_from_other_apps: bool,

    /// Detect this trigger while the display is off (needs elevated
    /// privileges on the host)
    #[serde(default)]
    pub screen_off_trigger: bool,

    /// Per-trigger long-press delay override in ms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_press_delay: Option<u64>,

    /// Per-trigger double-press delay override in ms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_press_delay: Option<u64>,

    /// Per-trigger sequence timeout override in ms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_trigger_timeout: Option<u64>,
}

impl Trigger {
    /// Create a trigger with no overrides and default mode
    pub fn new(id: TriggerId, keys: Vec<KeyDescriptor>) -> Self {
        Self {
            id,
            keys,
            mode: TriggerMode::default(),
            trigger_from_other_apps: false,
            screen_off_trigger: false,
            long_press_delay: None,
            double_press_delay: None,
            sequence_trigger_timeout: None,
        }
    }

    /// Set the recognition mode
    pub fn with_mode(mut self, mode: TriggerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Long-press delay for this trigger, falling back to the defaults
    pub fn long_press_delay(&self, defaults: &DefaultOptions) -> u64 {
        self.long_press_delay.unwrap_or(defaults.long_press_delay)
    }

    /// Double-press delay for this trigger, falling back to the defaults
    pub fn double_press_delay(&self, defaults: &DefaultOptions) -> u64 {
        self.double_press_delay
            .unwrap_or(defaults.double_press_delay)
    }

    /// Sequence timeout for this trigger, falling back to the defaults
    pub fn sequence_trigger_timeout(&self, defaults: &DefaultOptions) -> u64 {
        self.sequence_trigger_timeout
            .unwrap_or(defaults.sequence_trigger_timeout)
    }
}
