#![forbid(unsafe_code)]

//! Snapshot-model adapter.
//!
//! [`SnapshotCaretaker`] owns an [`Originator`] and its history. Each
//! checkpoint saves the originator's full state into a new unit, so every
//! unit holds the state *produced* by its commit. Undoing a unit therefore
//! restores the state below it: the next undo entry, or the baseline when
//! the undo stack runs out.
//!
//! ```text
//! baseline ""   checkpoint "Hello"   checkpoint "Hello World"
//!
//! Undo: [u1("Hello"), u2("Hello World")]   Redo: []
//!
//! undo()  -> restore "Hello"  (state of u1), u2 moves to redo
//! undo()  -> restore ""       (baseline),    u1 moves to redo
//! redo()  -> restore "Hello"  (state of u1), u1 moves back
//! ```
//!
//! The baseline follows capacity eviction: when the oldest unit is evicted,
//! its state becomes the new floor, which is as far back as undo can go.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::manager::HistoryManager;
use crate::originator::Originator;
use crate::session::UndoRedo;
use crate::unit::{UndoableUnit, UnitId, UnitKind, UnitSource};

const TARGET: &str = "backtrack.adapter";

/// History unit type of a caretaker over `O`.
pub type SnapshotUnit<O> = UndoableUnit<O, <O as Originator>::Snapshot>;

/// Binds one originator to one snapshot history.
pub struct SnapshotCaretaker<O: Originator> {
    originator: O,
    history: HistoryManager<O, O::Snapshot>,
    /// State the oldest undo entry was committed on top of.
    baseline: Arc<O::Snapshot>,
}

impl<O: Originator> fmt::Debug for SnapshotCaretaker<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCaretaker")
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl<O: Originator> SnapshotCaretaker<O> {
    /// Caretaker with the default capacity. The originator's current state
    /// becomes the baseline.
    pub fn new(originator: O) -> Self {
        let history = HistoryManager::new(UnitKind::Snapshot, HistoryConfig::default().capacity);
        Self::assemble(originator, history)
    }

    /// Caretaker with an explicit capacity.
    pub fn with_capacity(originator: O, capacity: NonZeroUsize) -> Self {
        Self::assemble(originator, HistoryManager::new(UnitKind::Snapshot, capacity))
    }

    /// Caretaker built from a config. Fails if the config pins the command
    /// model.
    pub fn with_config(originator: O, config: &HistoryConfig) -> Result<Self, HistoryError> {
        let history = HistoryManager::with_config(UnitKind::Snapshot, config)?;
        Ok(Self::assemble(originator, history))
    }

    /// Adopt an existing history. It must be a snapshot history.
    ///
    /// `baseline` is the state the oldest undo entry was committed on top
    /// of, as returned by [`into_parts`](Self::into_parts). For an empty
    /// history it is usually the originator's current state.
    pub fn from_history(
        originator: O,
        history: HistoryManager<O, O::Snapshot>,
        baseline: Arc<O::Snapshot>,
    ) -> Result<Self, HistoryError> {
        if history.kind() != UnitKind::Snapshot {
            return Err(HistoryError::InconsistentModel {
                expected: UnitKind::Snapshot,
                found: history.kind(),
            });
        }
        Ok(Self {
            originator,
            history,
            baseline,
        })
    }

    fn assemble(originator: O, history: HistoryManager<O, O::Snapshot>) -> Self {
        let baseline = Arc::new(originator.save());
        Self {
            originator,
            history,
            baseline,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Save the originator's current state as a new history entry.
    pub fn checkpoint(&mut self, description: impl Into<String>) -> Result<UnitId, HistoryError> {
        self.commit_state(SnapshotUnit::<O>::shared_snapshot(
            description,
            Arc::new(self.originator.save()),
        ))
    }

    /// Like [`checkpoint`](Self::checkpoint), tagging the unit's source.
    pub fn checkpoint_from(
        &mut self,
        description: impl Into<String>,
        source: UnitSource,
    ) -> Result<UnitId, HistoryError> {
        let unit = SnapshotUnit::<O>::shared_snapshot(description, Arc::new(self.originator.save()))
            .with_source(source);
        self.commit_state(unit)
    }

    /// Mutate the originator, then checkpoint the result.
    pub fn edit<F, R>(&mut self, description: impl Into<String>, f: F) -> Result<R, HistoryError>
    where
        F: FnOnce(&mut O) -> R,
    {
        let out = f(&mut self.originator);
        self.checkpoint(description)?;
        Ok(out)
    }

    fn commit_state(&mut self, unit: SnapshotUnit<O>) -> Result<UnitId, HistoryError> {
        let id = unit.id();
        if let Some(evicted) = self.history.commit_evicting(unit)? {
            if let Some(state) = evicted.state() {
                self.baseline = Arc::clone(state);
            }
        }
        Ok(id)
    }

    /// Step back one checkpoint.
    ///
    /// Restores the state below the most recent entry and returns that
    /// entry, which now sits on the redo stack. Edits made since the last
    /// checkpoint are discarded along with it.
    pub fn undo(&mut self) -> Result<&SnapshotUnit<O>, HistoryError> {
        if !self.history.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        let target = self
            .history
            .undo_at(1)
            .and_then(UndoableUnit::state)
            .map_or_else(|| Arc::clone(&self.baseline), Arc::clone);
        self.originator.restore(&target);
        tracing::debug!(target: TARGET, direction = "undo", "snapshot restored");
        self.history.undo()
    }

    /// Step forward one checkpoint, restoring the state it captured.
    pub fn redo(&mut self) -> Result<&SnapshotUnit<O>, HistoryError> {
        let target = self
            .history
            .peek_redo()
            .ok_or(HistoryError::NothingToRedo)?
            .state()
            .cloned()
            .ok_or_else(|| HistoryError::InvalidUnit("command unit in a snapshot history".into()))?;
        self.originator.restore(&target);
        tracing::debug!(target: TARGET, direction = "redo", "snapshot restored");
        self.history.redo()
    }

    /// Forget all history. The originator keeps its state, which becomes
    /// the new baseline.
    pub fn clear(&mut self) {
        self.history.clear();
        self.baseline = Arc::new(self.originator.save());
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// True if there is something to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// True if there is something to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// `(undo_count, redo_count)`.
    #[must_use]
    pub fn history_size(&self) -> (usize, usize) {
        self.history.history_size()
    }

    /// Snapshot the originator was last checkpointed or restored to.
    #[must_use]
    pub fn current(&self) -> &Arc<O::Snapshot> {
        self.history
            .peek_undo()
            .and_then(UndoableUnit::state)
            .unwrap_or(&self.baseline)
    }

    /// Oldest state undo can reach.
    #[must_use]
    pub fn baseline(&self) -> &Arc<O::Snapshot> {
        &self.baseline
    }

    /// The tracked object.
    #[must_use]
    pub fn originator(&self) -> &O {
        &self.originator
    }

    /// The tracked object, for edits that will be checkpointed later.
    pub fn originator_mut(&mut self) -> &mut O {
        &mut self.originator
    }

    /// The underlying history.
    #[must_use]
    pub fn history(&self) -> &HistoryManager<O, O::Snapshot> {
        &self.history
    }

    /// End the session, returning the originator.
    pub fn into_inner(self) -> O {
        self.originator
    }

    /// Split into originator, history and baseline. Feeding all three back
    /// to [`from_history`](Self::from_history) resumes the same session.
    pub fn into_parts(self) -> (O, HistoryManager<O, O::Snapshot>, Arc<O::Snapshot>) {
        (self.originator, self.history, self.baseline)
    }
}

impl<O: Originator> UndoRedo for SnapshotCaretaker<O> {
    type Target = O;
    type Snapshot = O::Snapshot;

    fn history(&self) -> &HistoryManager<O, O::Snapshot> {
        &self.history
    }

    fn undo(&mut self) -> Result<&SnapshotUnit<O>, HistoryError> {
        SnapshotCaretaker::undo(self)
    }

    fn redo(&mut self) -> Result<&SnapshotUnit<O>, HistoryError> {
        SnapshotCaretaker::redo(self)
    }

    fn clear(&mut self) {
        SnapshotCaretaker::clear(self);
    }
}

// ============================================================================
// Tests
// ============================================================================
