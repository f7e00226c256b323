#![forbid(unsafe_code)]

//! History configuration.
//!
//! ```toml
//! # backtrack.toml
//! capacity = 100
//! mode = "snapshot"
//! ```
//!
//! ```rust,ignore
//! let config = HistoryConfig::from_toml_file("backtrack.toml")?;
//! let caretaker = SnapshotCaretaker::with_config(doc, &config)?;
//! ```
//!
//! `mode` is optional. When present, building an adapter of the other model
//! from this config fails with [`HistoryError::InconsistentModel`].

use std::num::NonZeroUsize;

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, HistoryError};
use crate::store::DEFAULT_CAPACITY;
use crate::unit::UnitKind;

/// Configuration for a [`HistoryManager`](crate::HistoryManager).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct HistoryConfig {
    /// Maximum number of units on the undo stack.
    #[cfg_attr(feature = "config", serde(deserialize_with = "deserialize_capacity"))]
    pub capacity: NonZeroUsize,
    /// Model the history is pinned to, if any.
    #[cfg_attr(feature = "config", serde(skip_serializing_if = "Option::is_none"))]
    pub mode: Option<UnitKind>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            mode: None,
        }
    }
}

impl HistoryConfig {
    /// Config with the given capacity and no pinned model.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(ConfigError::InvalidCapacity(capacity))?;
        Ok(Self {
            capacity,
            mode: None,
        })
    }

    /// Pin the model.
    #[must_use]
    pub fn with_mode(mut self, mode: UnitKind) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Check that an adapter of model `kind` may be built from this config.
    /// A mismatch reports `kind` as expected and the pinned mode as found.
    pub fn check_mode(&self, kind: UnitKind) -> Result<(), HistoryError> {
        match self.mode {
            Some(pinned) if pinned != kind => Err(HistoryError::InconsistentModel {
                expected: kind,
                found: pinned,
            }),
            _ => Ok(()),
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize to TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

#[cfg(feature = "config")]
fn deserialize_capacity<'de, D>(deserializer: D) -> Result<NonZeroUsize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = usize::deserialize(deserializer)?;
    NonZeroUsize::new(raw).ok_or_else(|| serde::de::Error::custom(ConfigError::InvalidCapacity(raw)))
}
