//! Actions for keymapd mappings
//!
//! An action is one configured effect to perform when a trigger fires,
//! plus its repeat behavior. The payload ([`ActionData`]) is opaque to the
//! execution engine; performing it is the [`ActionPerformer`]'s job.

mod action;
mod perform;

pub use action::{
    Action, ActionConfig, ActionData, ConfigError, ConfigResult, HoldDown, RepeatBehavior,
    RepeatMode,
};
pub use perform::{ActionPerformer, PerformError, PerformResult};
