//! The performer seam
//!
//! The engine decides *when* an action runs; an [`ActionPerformer`] does
//! the real-world work (input injection, system toggles). Failures are
//! reported upward and logged, but they never abort sibling actions or
//! stop an unrelated repeat session.

use async_trait::async_trait;
use thiserror::Error;

use crate::ActionData;

/// Errors a performer can report
#[derive(Debug, Clone, Error)]
pub enum PerformError {
    #[error("action failed: {0}")]
    Failed(String),

    #[error("action not supported on this device: {0}")]
    Unsupported(String),

    #[error("missing permission: {0}")]
    PermissionDenied(String),
}

/// Result type for perform calls
pub type PerformResult<T> = Result<T, PerformError>;

/// Carries out action payloads
///
/// Implementations must tolerate concurrent calls: repeat sessions for
/// different actions tick independently and all dispatch here.
#[async_trait]
pub trait ActionPerformer: Send + Sync {
    /// Perform one execution of the payload
    async fn perform(&self, data: &ActionData) -> PerformResult<()>;
}
