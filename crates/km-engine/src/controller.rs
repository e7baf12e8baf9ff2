//! The mapping controller
//!
//! [`MappingController::on_detected`] is the single entry point between
//! trigger detection and action execution. Per detection it takes one
//! constraint snapshot, fans out over the mapping's actions in order,
//! performs each one synchronously once, and hands repeating actions to
//! the [`RepeatScheduler`]. It returns as soon as the first executions are
//! done; repeat cadence runs in spawned tasks and never blocks the next
//! detection.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use km_actions::{Action, ActionPerformer, RepeatMode};
use km_constraints::{ConstraintEvaluator, SnapshotSource};
use km_core::events::{ActionPerformedData, MappingTriggeredData};
use km_core::{Context, InputEventType, TriggerId};
use km_event_bus::SharedEventBus;
use km_mappings::{DefaultOptions, Mapping};
use tokio::time;
use tracing::{debug, warn};

use crate::session::{RepeatScheduler, SessionKey, SessionSpec};

/// Executes mappings in response to detected triggers
pub struct MappingController {
    performer: Arc<dyn ActionPerformer>,
    snapshots: Arc<dyn SnapshotSource>,
    bus: SharedEventBus,
    scheduler: RepeatScheduler,
    defaults: RwLock<DefaultOptions>,
}

impl MappingController {
    pub fn new(
        performer: Arc<dyn ActionPerformer>,
        snapshots: Arc<dyn SnapshotSource>,
        bus: SharedEventBus,
    ) -> Self {
        let scheduler = RepeatScheduler::new(Arc::clone(&performer), Arc::clone(&bus));
        Self {
            performer,
            snapshots,
            bus,
            scheduler,
            defaults: RwLock::new(DefaultOptions::default()),
        }
    }

    /// Replace the global timing defaults
    ///
    /// The host calls this when the preference store changes. Sessions
    /// already running keep the cadence they started with.
    pub fn set_defaults(&self, options: DefaultOptions) {
        *self.defaults.write().unwrap() = options;
    }

    /// Current global timing defaults
    pub fn defaults(&self) -> DefaultOptions {
        *self.defaults.read().unwrap()
    }

    /// React to one detection of a trigger
    ///
    /// The heavy lifting per action:
    /// - a trigger-pressed-again action whose session is tracked consumes
    ///   the detection as a stop signal and does not execute
    /// - every other action executes once, synchronously
    /// - repeating actions then get a session on the scheduler
    pub async fn on_detected(&self, trigger_id: &TriggerId, mapping: &Mapping) {
        if !mapping.enabled {
            debug!(%trigger_id, mapping_id = %mapping.id, "Mapping disabled, ignoring detection");
            return;
        }

        let defaults = self.defaults();

        // One snapshot per detection; every action of this detection sees
        // the same state no matter when its session ticks.
        let snapshot = self.snapshots.snapshot().await;
        if !ConstraintEvaluator::permits(&snapshot, &mapping.constraints, mapping.constraint_mode) {
            debug!(
                %trigger_id,
                mapping_id = %mapping.id,
                "Constraints deny execution"
            );
            return;
        }

        let ctx = Context::new();
        self.bus.fire_typed(
            MappingTriggeredData {
                trigger_id: trigger_id.clone(),
                mapping_id: mapping.id.clone(),
                vibrate_duration: vibrate_duration(mapping, &defaults),
            },
            ctx.clone(),
        );

        let last = mapping.actions.len() - 1;
        for (action_index, action) in mapping.actions.iter().enumerate() {
            self.dispatch_action(trigger_id, action, action_index, &defaults, &ctx)
                .await;

            // No action follows the last one; sleeping there would only
            // keep the detection dispatcher waiting.
            if action_index < last {
                if let Some(delay) = action.delay_before_next_action {
                    time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    async fn dispatch_action(
        &self,
        trigger_id: &TriggerId,
        action: &Action,
        action_index: usize,
        defaults: &DefaultOptions,
        ctx: &Context,
    ) {
        let repeat = match &action.repeat {
            None => {
                self.execute_once(trigger_id, action, action_index, defaults, ctx)
                    .await;
                return;
            }
            Some(repeat) => repeat,
        };

        let spec = SessionSpec {
            trigger_id: trigger_id.clone(),
            action_index,
            data: action.data.clone(),
            rate: Duration::from_millis(repeat.rate.unwrap_or(defaults.repeat_rate)),
            cap: action.execution_cap(),
        };

        match repeat.mode {
            RepeatMode::LimitReached => {
                // Every detection starts its own session; earlier ones
                // keep running to their quota.
                self.execute_once(trigger_id, action, action_index, defaults, ctx)
                    .await;
                self.scheduler.start_limit_reached(spec, ctx.child());
            }
            RepeatMode::TriggerPressedAgain => {
                let key = SessionKey::new(trigger_id.clone(), action_index);
                if let Some(handle) = self.scheduler.take(&key) {
                    // This detection is the stop signal, not a new press.
                    // A handle whose session already stopped at its cap is
                    // consumed the same way; the detection after this one
                    // starts fresh.
                    debug!(
                        %trigger_id,
                        action_index,
                        "Trigger pressed again, stopping repeat session"
                    );
                    handle.cancel();
                    return;
                }
                self.execute_once(trigger_id, action, action_index, defaults, ctx)
                    .await;
                self.scheduler.start_pressed_again(key, spec, ctx.child());
            }
        }
    }

    /// Perform one execution of an action and report it on the bus
    ///
    /// A hold-down key action performs its down half now and spawns the
    /// release; anything else performs its payload whole. Failures are
    /// logged and reported, and the fan-out moves on to the next action.
    async fn execute_once(
        &self,
        trigger_id: &TriggerId,
        action: &Action,
        action_index: usize,
        defaults: &DefaultOptions,
        ctx: &Context,
    ) {
        let result = match &action.hold_down {
            Some(hold) => {
                let down = action.data.with_event_type(InputEventType::Down);
                let result = self.performer.perform(&down).await;
                if result.is_ok() {
                    let up = action.data.with_event_type(InputEventType::Up);
                    let duration =
                        Duration::from_millis(hold.duration.unwrap_or(defaults.hold_down_duration));
                    let performer = Arc::clone(&self.performer);
                    let release_trigger = trigger_id.clone();
                    tokio::spawn(async move {
                        time::sleep(duration).await;
                        if let Err(error) = performer.perform(&up).await {
                            warn!(
                                trigger_id = %release_trigger,
                                action_index,
                                %error,
                                "Hold-down release failed"
                            );
                        }
                    });
                }
                result
            }
            None => self.performer.perform(&action.data).await,
        };

        if let Err(error) = &result {
            warn!(%trigger_id, action_index, %error, "Action execution failed");
        }
        self.bus.fire_typed(
            ActionPerformedData {
                trigger_id: trigger_id.clone(),
                action_index,
                success: result.is_ok(),
            },
            ctx.clone(),
        );
    }

    /// Number of tracked keyed repeat sessions still running
    pub fn live_session_count(&self) -> usize {
        self.scheduler.live_session_count()
    }
}

/// Haptic feedback duration for a triggered mapping, None when it should
/// not vibrate
fn vibrate_duration(mapping: &Mapping, defaults: &DefaultOptions) -> Option<u64> {
    if mapping.vibrate || defaults.force_vibrate {
        Some(
            mapping
                .vibrate_duration
                .unwrap_or(defaults.vibrate_duration),
        )
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use km_mappings::MappingConfig;

    fn mapping(json: &str) -> Mapping {
        let config: MappingConfig = serde_json::from_str(json).unwrap();
        Mapping::from_config(config).unwrap()
    }

    #[test]
    fn test_vibrate_duration_resolution() {
        let defaults = DefaultOptions::default();

        let silent = mapping(
            r#"{
                "trigger": {"id": "t1", "keys": [{"key_code": 24}]},
                "actions": [{"data": {"action": "volume_up"}}]
            }"#,
        );
        assert_eq!(vibrate_duration(&silent, &defaults), None);

        let haptic = mapping(
            r#"{
                "trigger": {"id": "t1", "keys": [{"key_code": 24}]},
                "actions": [{"data": {"action": "volume_up"}}],
                "vibrate": true,
                "vibrate_duration": 150
            }"#,
        );
        assert_eq!(vibrate_duration(&haptic, &defaults), Some(150));

        let forced = DefaultOptions {
            force_vibrate: true,
            ..DefaultOptions::default()
        };
        assert_eq!(vibrate_duration(&silent, &forced), Some(200));
    }
}
