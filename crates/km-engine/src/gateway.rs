//! The detection gateway
//!
//! The key-event classifier lives outside this workspace; when it
//! recognizes a configured pattern it reports the trigger id here. The
//! gateway resolves the id against the mapping set and forwards the hit to
//! the [`MappingController`]. Detection and the mapping set can diverge
//! for a moment during reconfiguration, so an unknown id is a quiet miss.

use std::sync::Arc;

use km_core::TriggerId;
use km_mappings::{Mapping, MappingStore};
use tracing::debug;

use crate::MappingController;

/// Entry point for trigger detections
pub struct DetectionGateway {
    store: Arc<MappingStore>,
    controller: Arc<MappingController>,
}

impl DetectionGateway {
    pub fn new(store: Arc<MappingStore>, controller: Arc<MappingController>) -> Self {
        Self { store, controller }
    }

    /// Handle one detection of a trigger
    ///
    /// Resolves the id, runs the mapping, and stamps its last-triggered
    /// time. An id with no mapping does nothing.
    pub async fn on_detected(&self, trigger_id: &TriggerId) {
        let mapping = match self.store.resolve(trigger_id) {
            Some(mapping) => mapping,
            None => {
                debug!(%trigger_id, "No mapping for detected trigger");
                return;
            }
        };

        self.controller.on_detected(trigger_id, &mapping).await;
        self.store.mark_triggered(&mapping.id);
    }

    /// Enabled mappings whose trigger should fire outside the host app
    ///
    /// The classifier consults this set when another app has input focus.
    pub fn mappings_triggered_from_other_apps(&self) -> Vec<Mapping> {
        self.store
            .all()
            .into_iter()
            .filter(|mapping| mapping.enabled && mapping.trigger.trigger_from_other_apps)
            .collect()
    }

    /// Whether the classifier should keep listening while the display is
    /// off
    ///
    /// Screen-off detection needs an elevated grant on the host; without
    /// it the configured flag is ignored.
    pub fn detect_screen_off_triggers(&self, elevated_permission: bool) -> bool {
        elevated_permission
            && self
                .store
                .all()
                .iter()
                .any(|mapping| mapping.enabled && mapping.trigger.screen_off_trigger)
    }
}
