//! Identifier types for triggers and mappings

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ulid::Ulid;

/// Error type for invalid identifiers
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("identifier cannot be empty")]
    Empty,
}

/// Stable identifier assigned to a trigger at configuration time
///
/// The detection layer reduces every completed recognized pattern to one of
/// these; the engine resolves it back to exactly one mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerId(String);

impl TriggerId {
    /// Create a trigger ID from an existing string
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(id))
    }

    /// Generate a fresh trigger ID
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TriggerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TriggerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier for a configured mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingId(String);

impl MappingId {
    /// Create a mapping ID from an existing string
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(id))
    }

    /// Generate a fresh mapping ID
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MappingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MappingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_id_roundtrip() {
        let id = TriggerId::new("volume_up_double").unwrap();
        assert_eq!(id.as_str(), "volume_up_double");
        assert_eq!(id.to_string(), "volume_up_double");
    }

    #[test]
    fn test_empty_id_rejected() {
        assert_eq!(TriggerId::new(""), Err(IdError::Empty));
        assert_eq!(MappingId::new(""), Err(IdError::Empty));
    }

    #[test]
    fn test_generated_ids_unique() {
        assert_ne!(TriggerId::generate(), TriggerId::generate());
    }

    #[test]
    fn test_serde_transparent() {
        let id: TriggerId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id, TriggerId::from("abc"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
