#![forbid(unsafe_code)]

//! History policy on top of [`HistoryStore`].
//!
//! [`HistoryManager`] decides *when* units move; the adapters decide what
//! moving them means for the domain object.
//!
//! # Invariants
//!
//! 1. `undo_depth() <= capacity()` after every commit.
//! 2. [`commit`](HistoryManager::commit) is the only operation that clears
//!    the redo stack; undo and redo never do.
//! 3. Every unit in the history has the manager's [`UnitKind`].
//! 4. Undo and redo move the same unit, unmodified, between the stacks.
//!
//! ```text
//! commit(c3)
//! ┌───────────────────────────────────────┐
//! │ Undo: [c1, c2, c3]   Redo: []         │
//! └───────────────────────────────────────┘
//! undo() x2
//! ┌───────────────────────────────────────┐
//! │ Undo: [c1]           Redo: [c3, c2]   │
//! └───────────────────────────────────────┘
//! commit(c4)   <-- redo invalidated
//! ┌───────────────────────────────────────┐
//! │ Undo: [c1, c4]       Redo: []         │
//! └───────────────────────────────────────┘
//! ```

use std::fmt;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::store::HistoryStore;
use crate::unit::{UndoableUnit, UnitKind};

const TARGET: &str = "backtrack.history";

/// Undo/redo history for one editing session.
///
/// `T` is the command receiver type and `S` the snapshot type. The model
/// ([`UnitKind`]) is fixed at construction.
pub struct HistoryManager<T, S = ()> {
    kind: UnitKind,
    store: HistoryStore<UndoableUnit<T, S>>,
    evicted: u64,
}

impl<T, S> fmt::Debug for HistoryManager<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("kind", &self.kind)
            .field("undo_depth", &self.store.undo_len())
            .field("redo_depth", &self.store.redo_len())
            .field("capacity", &self.store.capacity())
            .field("evicted", &self.evicted)
            .finish()
    }
}

impl<T, S> HistoryManager<T, S> {
    /// Create an empty history for the given model.
    #[must_use]
    pub fn new(kind: UnitKind, capacity: NonZeroUsize) -> Self {
        Self {
            kind,
            store: HistoryStore::new(capacity),
            evicted: 0,
        }
    }

    /// Create an empty history from a config.
    ///
    /// Fails with [`HistoryError::InconsistentModel`] if the config pins a
    /// different model than `kind`.
    pub fn with_config(kind: UnitKind, config: &HistoryConfig) -> Result<Self, HistoryError> {
        config.check_mode(kind)?;
        Ok(Self::new(kind, config.capacity))
    }

    /// Rebuild a history from units previously taken out with
    /// [`into_units`](Self::into_units), oldest first.
    ///
    /// All units must share `kind`; a mixed sequence is rejected with
    /// [`HistoryError::InconsistentModel`] before anything is stored. If there
    /// are more units than `capacity`, the oldest are evicted.
    pub fn from_units<I>(kind: UnitKind, capacity: NonZeroUsize, units: I) -> Result<Self, HistoryError>
    where
        I: IntoIterator<Item = UndoableUnit<T, S>>,
    {
        let units: Vec<_> = units.into_iter().collect();
        if let Some(stray) = units.iter().find(|u| u.kind() != kind) {
            return Err(HistoryError::InconsistentModel {
                expected: kind,
                found: stray.kind(),
            });
        }
        let mut manager = Self::new(kind, capacity);
        for unit in units {
            if manager.store.push(unit).is_some() {
                manager.evicted += 1;
            }
        }
        Ok(manager)
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Record a unit whose forward effect has already happened.
    ///
    /// Pushes onto the undo stack (evicting the oldest entry when over
    /// capacity) and then empties the redo stack.
    pub fn commit(&mut self, unit: UndoableUnit<T, S>) -> Result<(), HistoryError> {
        self.commit_evicting(unit).map(|_| ())
    }

    /// Like [`commit`](Self::commit), but hands back the unit evicted by the
    /// capacity bound, if any.
    pub fn commit_evicting(
        &mut self,
        unit: UndoableUnit<T, S>,
    ) -> Result<Option<UndoableUnit<T, S>>, HistoryError> {
        if unit.kind() != self.kind {
            tracing::warn!(
                target: TARGET,
                unit = %unit.id(),
                unit_kind = %unit.kind(),
                history_kind = %self.kind,
                "commit rejected"
            );
            return Err(HistoryError::InvalidUnit(format!(
                "{} unit offered to a {} history",
                unit.kind(),
                self.kind
            )));
        }

        let id = unit.id();
        let evicted = self.store.push(unit);
        self.store.clear_redo();

        if let Some(old) = &evicted {
            self.evicted += 1;
            tracing::debug!(
                target: TARGET,
                evicted = %old.id(),
                description = old.description(),
                capacity = self.store.capacity(),
                "capacity eviction"
            );
        }
        tracing::debug!(
            target: TARGET,
            unit = %id,
            undo_depth = self.store.undo_len(),
            redo_depth = self.store.redo_len(),
            "unit committed"
        );
        Ok(evicted)
    }

    /// Move the most recent unit from the undo stack to the redo stack and
    /// return it. The caller applies its reverse effect.
    pub fn undo(&mut self) -> Result<&UndoableUnit<T, S>, HistoryError> {
        self.undo_with(|_| Ok::<(), HistoryError>(()))
    }

    /// Move the most recently undone unit back to the undo stack and return
    /// it. The caller re-applies its forward effect.
    pub fn redo(&mut self) -> Result<&UndoableUnit<T, S>, HistoryError> {
        self.redo_with(|_| Ok::<(), HistoryError>(()))
    }

    /// Undo, running `effect` on the unit in between the two stacks.
    ///
    /// If `effect` fails the unit goes back on top of the undo stack and
    /// the history is left exactly as it was. If it panics, the unit is put
    /// back the same way before the panic continues.
    pub fn undo_with<E, F>(&mut self, effect: F) -> Result<&UndoableUnit<T, S>, E>
    where
        E: From<HistoryError>,
        F: FnOnce(&mut UndoableUnit<T, S>) -> Result<(), E>,
    {
        let mut unit = self
            .store
            .pop_undo()
            .map_err(|_| HistoryError::NothingToUndo)?;
        match panic::catch_unwind(AssertUnwindSafe(|| effect(&mut unit))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let displaced = self.store.push(unit);
                debug_assert!(displaced.is_none());
                return Err(err);
            }
            Err(payload) => {
                let displaced = self.store.push(unit);
                debug_assert!(displaced.is_none());
                tracing::warn!(target: TARGET, direction = "undo", "effect panicked, unit restored");
                panic::resume_unwind(payload);
            }
        }
        self.store.push_redo(unit);

        let moved = self.store.peek_redo().ok_or(HistoryError::NothingToRedo)?;
        tracing::debug!(
            target: TARGET,
            unit = %moved.id(),
            description = moved.description(),
            undo_depth = self.store.undo_len(),
            redo_depth = self.store.redo_len(),
            "unit undone"
        );
        Ok(moved)
    }

    /// Redo, running `effect` on the unit in between the two stacks.
    ///
    /// If `effect` fails or panics the unit goes back on top of the redo
    /// stack.
    pub fn redo_with<E, F>(&mut self, effect: F) -> Result<&UndoableUnit<T, S>, E>
    where
        E: From<HistoryError>,
        F: FnOnce(&mut UndoableUnit<T, S>) -> Result<(), E>,
    {
        let mut unit = self
            .store
            .pop_redo()
            .map_err(|_| HistoryError::NothingToRedo)?;
        match panic::catch_unwind(AssertUnwindSafe(|| effect(&mut unit))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                self.store.push_redo(unit);
                return Err(err);
            }
            Err(payload) => {
                self.store.push_redo(unit);
                tracing::warn!(target: TARGET, direction = "redo", "effect panicked, unit restored");
                panic::resume_unwind(payload);
            }
        }
        let displaced = self.store.push(unit);
        debug_assert!(displaced.is_none());

        let moved = self.store.peek_undo().ok_or(HistoryError::NothingToUndo)?;
        tracing::debug!(
            target: TARGET,
            unit = %moved.id(),
            description = moved.description(),
            undo_depth = self.store.undo_len(),
            redo_depth = self.store.redo_len(),
            "unit redone"
        );
        Ok(moved)
    }

    /// True if there is something to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.store.undo_len() > 0
    }

    /// True if there is something to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.store.redo_len() > 0
    }

    /// Empty both stacks. Domain state is not touched.
    pub fn clear(&mut self) {
        self.store.clear_all();
        tracing::debug!(target: TARGET, kind = %self.kind, "history cleared");
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// `(undo_count, redo_count)`.
    #[must_use]
    pub fn history_size(&self) -> (usize, usize) {
        (self.store.undo_len(), self.store.redo_len())
    }

    /// Undo stack depth.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.store.undo_len()
    }

    /// Redo stack depth.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.store.redo_len()
    }

    /// Maximum undo depth.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Model this history was built for.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Units dropped by the capacity bound since construction.
    #[must_use]
    pub fn evicted_count(&self) -> u64 {
        self.evicted
    }

    /// Next unit `undo()` would move.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&UndoableUnit<T, S>> {
        self.store.peek_undo()
    }

    /// Next unit `redo()` would move.
    #[must_use]
    pub fn peek_redo(&self) -> Option<&UndoableUnit<T, S>> {
        self.store.peek_redo()
    }

    /// Undo entry `depth` places below the top.
    #[must_use]
    pub fn undo_at(&self, depth: usize) -> Option<&UndoableUnit<T, S>> {
        self.store.undo_at(depth)
    }

    /// Descriptions of undo entries, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.store
            .undo_iter()
            .take(limit)
            .map(UndoableUnit::description)
            .collect()
    }

    /// Descriptions of redo entries, most recent first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.store
            .redo_iter()
            .take(limit)
            .map(UndoableUnit::description)
            .collect()
    }

    /// Description of the next undo entry.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.store.peek_undo().map(UndoableUnit::description)
    }

    /// Description of the next redo entry.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.store.peek_redo().map(UndoableUnit::description)
    }

    /// Take the undo entries out, oldest first. Redo entries are dropped.
    #[must_use]
    pub fn into_units(mut self) -> Vec<UndoableUnit<T, S>> {
        self.store.drain()
    }
}

// ============================================================================
// Tests
// ============================================================================
