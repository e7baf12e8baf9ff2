//! Constraints for keymapd mappings
//!
//! A constraint is a condition on system state that gates whether a
//! mapping's actions may run. Constraints are evaluated against an
//! immutable [`ConstraintSnapshot`] captured exactly once per trigger
//! detection, never per repeat tick.

mod constraint;
mod eval;
mod snapshot;

pub use constraint::{Constraint, ConstraintError, ConstraintMode, ConstraintResult};
pub use eval::ConstraintEvaluator;
pub use snapshot::{CallState, ConstraintSnapshot, FixedSnapshotSource, SnapshotSource, WifiState};
