//! Core types for keymapd
//!
//! This crate provides the fundamental types used throughout the keymapd
//! engine: trigger and mapping identifiers, key descriptors, the causality
//! Context, and the event types fired on the event bus.

mod context;
mod event;
mod ids;
mod key;

pub use context::Context;
pub use event::{Event, EventData, EventOrigin, EventType};
pub use ids::{IdError, MappingId, TriggerId};
pub use key::{InputEventType, KeyCode, KeyDescriptor};

/// Standard event types fired by the execution engine
pub mod events {
    use super::*;
    use serde::{Deserialize, Serialize};

    /// Event type fired when a detected trigger passes resolution and at
    /// least one of its actions is about to execute
    pub const MAPPING_TRIGGERED: &str = "mapping_triggered";

    /// Event type fired after each action execution attempt
    pub const ACTION_PERFORMED: &str = "action_performed";

    /// Event type fired when a repeat session reaches its stop condition
    pub const REPEAT_SESSION_STOPPED: &str = "repeat_session_stopped";

    /// Data for MAPPING_TRIGGERED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MappingTriggeredData {
        pub trigger_id: TriggerId,
        pub mapping_id: MappingId,
        /// Vibration duration in milliseconds, when the mapping asks for
        /// haptic feedback (or force-vibrate is set globally)
        #[serde(skip_serializing_if = "Option::is_none")]
        pub vibrate_duration: Option<u64>,
    }

    impl EventData for MappingTriggeredData {
        fn event_type() -> &'static str {
            MAPPING_TRIGGERED
        }
    }

    /// Data for ACTION_PERFORMED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ActionPerformedData {
        pub trigger_id: TriggerId,
        /// Position of the action in its mapping's action list
        pub action_index: usize,
        pub success: bool,
    }

    impl EventData for ActionPerformedData {
        fn event_type() -> &'static str {
            ACTION_PERFORMED
        }
    }

    /// Why a repeat session stopped
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SessionStopReason {
        /// The session executed its full `repeat_limit + 1` quota
        LimitReached,
        /// The same trigger was detected again while the session was live
        TriggerPressedAgain,
    }

    /// Data for REPEAT_SESSION_STOPPED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RepeatSessionStoppedData {
        pub trigger_id: TriggerId,
        pub action_index: usize,
        /// Total executions the session performed, first one included
        pub executions: u64,
        pub reason: SessionStopReason,
    }

    impl EventData for RepeatSessionStoppedData {
        fn event_type() -> &'static str {
            REPEAT_SESSION_STOPPED
        }
    }
}
