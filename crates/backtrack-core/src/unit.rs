#![forbid(unsafe_code)]

//! The undoable unit: the opaque value a history moves between its stacks.
//!
//! A unit is either a [`Command`](Payload::Command) that knows how to apply
//! and reverse a mutation, or a [`Snapshot`](Payload::Snapshot) holding an
//! immutable full-state capture. Description, id and timestamps are fixed
//! at construction; the history never looks inside the payload.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::command::ReversibleCmd;

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Locally distinguishable identity of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    /// Raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which undo model a unit (or a history) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum UnitKind {
    /// Undo by executing the reverse operation.
    Command,
    /// Undo by restoring a stored state capture.
    Snapshot,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => f.write_str("command"),
            Self::Snapshot => f.write_str("snapshot"),
        }
    }
}

/// Who or what produced a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSource {
    /// Direct user action.
    #[default]
    User,
    /// Application code.
    Programmatic,
    /// Replayed from a recorded macro or script.
    Macro,
    /// An external system.
    External,
}

/// Immutable bookkeeping attached to every unit.
#[derive(Debug, Clone)]
pub struct UnitMetadata {
    /// Identity, unique within the process.
    pub id: UnitId,
    /// Human-readable label.
    pub description: String,
    /// Wall-clock creation time.
    pub created_at: Instant,
    /// Logical creation time; strictly increasing across units.
    pub sequence: u64,
    /// Origin of the unit.
    pub source: UnitSource,
}

impl UnitMetadata {
    /// Fresh metadata with the next sequence number.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self {
            id: UnitId(sequence),
            description: description.into(),
            created_at: Instant::now(),
            sequence,
            source: UnitSource::User,
        }
    }

    /// Set the source.
    #[must_use]
    pub fn with_source(mut self, source: UnitSource) -> Self {
        self.source = source;
        self
    }
}

/// What a unit carries.
pub enum Payload<T, S> {
    /// A reversible mutation of a receiver of type `T`.
    Command(Box<dyn ReversibleCmd<T>>),
    /// A shared, immutable capture of an originator's state.
    Snapshot(Arc<S>),
}

impl<T, S> Payload<T, S> {
    /// Model this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Command(_) => UnitKind::Command,
            Self::Snapshot(_) => UnitKind::Snapshot,
        }
    }
}

impl<T, S: fmt::Debug> fmt::Debug for Payload<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
            Self::Snapshot(state) => f.debug_tuple("Snapshot").field(state).finish(),
        }
    }
}

/// The atomic item of history.
///
/// `T` is the command receiver type and `S` the snapshot type; a history
/// only ever holds one of the two variants.
pub struct UndoableUnit<T, S = ()> {
    metadata: UnitMetadata,
    payload: Payload<T, S>,
}

impl<T, S> UndoableUnit<T, S> {
    /// Wrap a command.
    #[must_use]
    pub fn command(cmd: impl ReversibleCmd<T> + 'static) -> Self {
        Self::boxed_command(Box::new(cmd))
    }

    /// Wrap an already boxed command. The description is taken from it.
    #[must_use]
    pub fn boxed_command(cmd: Box<dyn ReversibleCmd<T>>) -> Self {
        Self {
            metadata: UnitMetadata::new(cmd.description()),
            payload: Payload::Command(cmd),
        }
    }

    /// Wrap a state capture.
    #[must_use]
    pub fn snapshot(description: impl Into<String>, state: S) -> Self {
        Self::shared_snapshot(description, Arc::new(state))
    }

    /// Wrap a state capture that is already shared.
    #[must_use]
    pub fn shared_snapshot(description: impl Into<String>, state: Arc<S>) -> Self {
        Self {
            metadata: UnitMetadata::new(description),
            payload: Payload::Snapshot(state),
        }
    }

    /// Set the source recorded in the metadata.
    #[must_use]
    pub fn with_source(mut self, source: UnitSource) -> Self {
        self.metadata.source = source;
        self
    }

    /// Identity.
    #[must_use]
    pub fn id(&self) -> UnitId {
        self.metadata.id
    }

    /// Display label.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    /// Full metadata.
    #[must_use]
    pub fn metadata(&self) -> &UnitMetadata {
        &self.metadata
    }

    /// Model this unit belongs to.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        self.payload.kind()
    }

    /// Payload, read-only.
    #[must_use]
    pub fn payload(&self) -> &Payload<T, S> {
        &self.payload
    }

    /// Snapshot state, if this is a snapshot unit.
    #[must_use]
    pub fn state(&self) -> Option<&Arc<S>> {
        match &self.payload {
            Payload::Snapshot(state) => Some(state),
            Payload::Command(_) => None,
        }
    }

    /// Command, if this is a command unit. Only adapters drive commands.
    pub(crate) fn command_mut(&mut self) -> Option<&mut Box<dyn ReversibleCmd<T>>> {
        match &mut self.payload {
            Payload::Command(cmd) => Some(cmd),
            Payload::Snapshot(_) => None,
        }
    }
}

impl<T, S: fmt::Debug> fmt::Debug for UndoableUnit<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoableUnit")
            .field("id", &self.metadata.id)
            .field("description", &self.metadata.description)
            .field("payload", &self.payload)
            .finish()
    }
}
