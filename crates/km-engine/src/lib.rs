//! Trigger-to-action execution engine for keymapd
//!
//! Detection of input patterns happens elsewhere; this crate owns what
//! happens after. The [`DetectionGateway`] resolves a detected trigger id
//! to its mapping, the [`MappingController`] gates it on constraints and
//! executes its actions in order, and the [`RepeatScheduler`] runs
//! repeating actions on their cadence until their stop policy fires.
//!
//! ```no_run
//! use std::sync::Arc;
//! use km_constraints::FixedSnapshotSource;
//! use km_engine::{DetectionGateway, MappingController};
//! use km_event_bus::EventBus;
//! use km_mappings::MappingStore;
//! # use async_trait::async_trait;
//! # use km_actions::{ActionData, ActionPerformer, PerformResult};
//! # struct NoopPerformer;
//! # #[async_trait]
//! # impl ActionPerformer for NoopPerformer {
//! #     async fn perform(&self, _data: &ActionData) -> PerformResult<()> { Ok(()) }
//! # }
//!
//! let controller = Arc::new(MappingController::new(
//!     Arc::new(NoopPerformer),
//!     Arc::new(FixedSnapshotSource::default()),
//!     Arc::new(EventBus::new()),
//! ));
//! let gateway = DetectionGateway::new(Arc::new(MappingStore::new()), controller);
//! ```

mod controller;
mod gateway;
mod session;

pub use controller::MappingController;
pub use gateway::DetectionGateway;
pub use session::{RepeatScheduler, SessionHandle, SessionKey, SessionSpec};
