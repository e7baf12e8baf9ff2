//! Repeat session scheduling
//!
//! A repeat session is a spawned task that re-executes one action of one
//! mapping on a fixed cadence after its first execution. The two stop
//! policies are isolated here: a [`RepeatMode::LimitReached`] session runs
//! unconditionally to its quota, while a
//! [`RepeatMode::TriggerPressedAgain`] session is keyed by trigger and
//! action position so a later detection of the same trigger can stop it.
//!
//! Session tasks never touch the mapping set or the scheduler table; they
//! own clones of everything they need. Stopping one session never affects
//! another.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use km_actions::{ActionData, ActionPerformer};
use km_core::events::{ActionPerformedData, RepeatSessionStoppedData, SessionStopReason};
use km_core::{Context, TriggerId};
use km_event_bus::SharedEventBus;
use tokio::sync::oneshot;
use tokio::time;
use tracing::{debug, warn};

/// Identity of a keyed repeat session
///
/// One live session per trigger and action position. Two mappings can
/// never collide here because a trigger id belongs to exactly one mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub trigger_id: TriggerId,
    pub action_index: usize,
}

impl SessionKey {
    pub fn new(trigger_id: TriggerId, action_index: usize) -> Self {
        Self {
            trigger_id,
            action_index,
        }
    }
}

/// Everything a session task needs to run
#[derive(Clone)]
pub struct SessionSpec {
    pub trigger_id: TriggerId,
    pub action_index: usize,
    pub data: ActionData,
    /// Interval between executions
    pub rate: Duration,
    /// Total executions allowed, first one included; None is unbounded
    pub cap: Option<u64>,
}

/// Handle to a spawned keyed session
pub struct SessionHandle {
    cancel_tx: oneshot::Sender<()>,
    executions: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Request the session to stop
    ///
    /// A no-op when the session already stopped on its own; the dead entry
    /// is simply discarded.
    pub fn cancel(self) {
        let _ = self.cancel_tx.send(());
    }

    /// Executions the session has performed so far, first one included
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::SeqCst)
    }

    /// Whether the session task has exited
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

/// Spawns and tracks repeat sessions
///
/// Only trigger-pressed-again sessions are tracked: they are the only ones
/// a later detection needs to find. Limit-reached sessions are fire and
/// forget.
pub struct RepeatScheduler {
    performer: Arc<dyn ActionPerformer>,
    bus: SharedEventBus,
    sessions: DashMap<SessionKey, SessionHandle>,
}

impl RepeatScheduler {
    pub fn new(performer: Arc<dyn ActionPerformer>, bus: SharedEventBus) -> Self {
        Self {
            performer,
            bus,
            sessions: DashMap::new(),
        }
    }

    /// Remove and return the keyed session for a trigger and action, live
    /// or already finished
    pub fn take(&self, key: &SessionKey) -> Option<SessionHandle> {
        self.sessions.remove(key).map(|(_, handle)| handle)
    }

    /// Spawn an independent limit-reached session
    ///
    /// The first execution already happened; the session performs the
    /// remaining `cap - 1` on its cadence and stops. Nothing can cancel
    /// it, later detections of the same trigger included.
    pub fn start_limit_reached(&self, spec: SessionSpec, ctx: Context) {
        let performer = Arc::clone(&self.performer);
        let bus = Arc::clone(&self.bus);
        let cap = spec.cap.unwrap_or(1);

        debug!(
            trigger_id = %spec.trigger_id,
            action_index = spec.action_index,
            cap,
            "Starting limit-reached repeat session"
        );

        tokio::spawn(async move {
            let executions = AtomicU64::new(1);
            while executions.load(Ordering::SeqCst) < cap {
                time::sleep(spec.rate).await;
                perform_tick(&*performer, &bus, &ctx, &spec, &executions).await;
            }
            fire_stopped(
                &bus,
                &ctx,
                &spec,
                executions.load(Ordering::SeqCst),
                SessionStopReason::LimitReached,
            );
        });
    }

    /// Spawn and register a keyed trigger-pressed-again session
    ///
    /// The caller must have removed any previous entry under the same key
    /// first. The entry stays in the table after the session stops at its
    /// cap, so the next detection of the trigger consumes the stop instead
    /// of executing; the detection after that starts fresh.
    pub fn start_pressed_again(&self, key: SessionKey, spec: SessionSpec, ctx: Context) {
        let performer = Arc::clone(&self.performer);
        let bus = Arc::clone(&self.bus);
        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        let executions = Arc::new(AtomicU64::new(1));
        let finished = Arc::new(AtomicBool::new(false));

        debug!(
            trigger_id = %spec.trigger_id,
            action_index = spec.action_index,
            cap = ?spec.cap,
            "Starting trigger-pressed-again repeat session"
        );

        let handle = SessionHandle {
            cancel_tx,
            executions: Arc::clone(&executions),
            finished: Arc::clone(&finished),
        };
        self.sessions.insert(key, handle);

        tokio::spawn(async move {
            let reason = loop {
                if let Some(cap) = spec.cap {
                    if executions.load(Ordering::SeqCst) >= cap {
                        break SessionStopReason::LimitReached;
                    }
                }

                // Cancellation arriving in the same instant as a tick wins.
                tokio::select! {
                    biased;
                    _ = &mut cancel_rx => {
                        break SessionStopReason::TriggerPressedAgain;
                    }
                    _ = time::sleep(spec.rate) => {
                        perform_tick(&*performer, &bus, &ctx, &spec, &executions).await;
                    }
                }
            };
            finished.store(true, Ordering::SeqCst);
            fire_stopped(&bus, &ctx, &spec, executions.load(Ordering::SeqCst), reason);
        });
    }

    /// Number of tracked keyed sessions, finished entries included
    pub fn tracked_session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of tracked keyed sessions still running
    pub fn live_session_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| !entry.value().is_finished())
            .count()
    }
}

async fn perform_tick(
    performer: &dyn ActionPerformer,
    bus: &SharedEventBus,
    ctx: &Context,
    spec: &SessionSpec,
    executions: &AtomicU64,
) {
    let result = performer.perform(&spec.data).await;
    if let Err(error) = &result {
        warn!(
            trigger_id = %spec.trigger_id,
            action_index = spec.action_index,
            %error,
            "Repeat execution failed"
        );
    }
    executions.fetch_add(1, Ordering::SeqCst);
    bus.fire_typed(
        ActionPerformedData {
            trigger_id: spec.trigger_id.clone(),
            action_index: spec.action_index,
            success: result.is_ok(),
        },
        ctx.clone(),
    );
}

fn fire_stopped(
    bus: &SharedEventBus,
    ctx: &Context,
    spec: &SessionSpec,
    executions: u64,
    reason: SessionStopReason,
) {
    debug!(
        trigger_id = %spec.trigger_id,
        action_index = spec.action_index,
        executions,
        ?reason,
        "Repeat session stopped"
    );
    bus.fire_typed(
        RepeatSessionStoppedData {
            trigger_id: spec.trigger_id.clone(),
            action_index: spec.action_index,
            executions,
            reason,
        },
        ctx.clone(),
    );
}
