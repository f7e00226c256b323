#![forbid(unsafe_code)]

//! Error types for the history engine.
//!
//! History-empty conditions ([`HistoryError::NothingToUndo`] and
//! [`HistoryError::NothingToRedo`]) are ordinary control flow: callers are
//! expected to disable a control or ignore the request, never to abort.

use thiserror::Error;

use crate::command::CommandError;
use crate::unit::UnitKind;

/// Errors produced by [`HistoryManager`](crate::HistoryManager) and the
/// adapters built on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The unit cannot be committed to this history. Rejected before any
    /// mutation takes place.
    #[error("invalid unit: {0}")]
    InvalidUnit(String),
    /// The undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,
    /// The redo stack is empty.
    #[error("nothing to redo")]
    NothingToRedo,
    /// Command and snapshot units were mixed while building a history.
    #[error("inconsistent history model: expected {expected} units, found {found}")]
    InconsistentModel {
        /// Model of the history or adapter being built.
        expected: UnitKind,
        /// Model of the units, config or history offered to it.
        found: UnitKind,
    },
    /// A command failed to apply or reverse for domain reasons.
    #[error("command failed: {0}")]
    Command(#[from] CommandError),
}

impl HistoryError {
    /// True for the recoverable "stack is empty" conditions.
    #[must_use]
    pub fn is_empty_history(&self) -> bool {
        matches!(self, Self::NothingToUndo | Self::NothingToRedo)
    }
}

/// Errors produced while loading or validating a
/// [`HistoryConfig`](crate::HistoryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Capacity must be a positive integer.
    #[error("history capacity must be positive, got {0}")]
    InvalidCapacity(usize),
    /// Reading the config file failed.
    #[error("failed to read history config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse failure.
    #[cfg(feature = "config")]
    #[error("invalid TOML history config: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse failure.
    #[cfg(feature = "config")]
    #[error("invalid JSON history config: {0}")]
    Json(#[from] serde_json::Error),
}
