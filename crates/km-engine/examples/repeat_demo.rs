//! Repeat session demo
//!
//! Wires a controller to a logging performer and walks through both
//! repeat stop policies in real time. Run with:
//!
//! ```bash
//! cargo run -p km-engine --example repeat_demo
//! ```

use anyhow::Result;
use async_trait::async_trait;
use km_actions::{ActionData, ActionPerformer, PerformResult};
use km_constraints::{ConstraintSnapshot, FixedSnapshotSource};
use km_core::events::REPEAT_SESSION_STOPPED;
use km_core::TriggerId;
use km_engine::{DetectionGateway, MappingController};
use km_event_bus::EventBus;
use km_mappings::{MappingConfig, MappingStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Logs every execution instead of injecting real input
struct LoggingPerformer;

#[async_trait]
impl ActionPerformer for LoggingPerformer {
    async fn perform(&self, data: &ActionData) -> PerformResult<()> {
        info!(?data, "Performing action");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let bus = Arc::new(EventBus::new());
    let mut stopped = bus.subscribe(REPEAT_SESSION_STOPPED);

    let snapshot = ConstraintSnapshot::unknown().with_screen_on(true);
    let controller = Arc::new(MappingController::new(
        Arc::new(LoggingPerformer),
        Arc::new(FixedSnapshotSource::new(snapshot)),
        Arc::clone(&bus),
    ));

    let store = Arc::new(MappingStore::new());
    let configs: Vec<MappingConfig> = serde_json::from_str(
        r#"[
            {
                "id": "burst",
                "trigger": {"id": "vol_up_hold", "keys": [{"key_code": 24}]},
                "actions": [{
                    "data": {"action": "volume_up"},
                    "repeat": true,
                    "repeat_mode": "limit_reached",
                    "repeat_rate": 200,
                    "repeat_limit": 4
                }]
            },
            {
                "id": "toggle",
                "trigger": {"id": "vol_down_hold", "keys": [{"key_code": 25}]},
                "actions": [{
                    "data": {"action": "volume_down"},
                    "repeat": true,
                    "repeat_mode": "trigger_pressed_again",
                    "repeat_rate": 200
                }],
                "constraints": [{"constraint": "screen_on"}]
            }
        ]"#,
    )?;
    store.load(configs)?;
    let gateway = DetectionGateway::new(store, controller);

    info!("Detecting vol_up_hold; its session runs to the limit on its own");
    gateway.on_detected(&TriggerId::from("vol_up_hold")).await;
    let event = stopped.recv().await?;
    info!(data = %event.data, "Session stopped");

    info!("Detecting vol_down_hold; it repeats until the next press");
    gateway.on_detected(&TriggerId::from("vol_down_hold")).await;
    tokio::time::sleep(Duration::from_millis(1100)).await;
    gateway.on_detected(&TriggerId::from("vol_down_hold")).await;
    let event = stopped.recv().await?;
    info!(data = %event.data, "Session stopped");

    Ok(())
}
