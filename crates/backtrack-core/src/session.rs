#![forbid(unsafe_code)]

//! Model-agnostic access to an undo session, and a thread-safe wrapper.
//!
//! A history has a single logical owner. When several threads must drive
//! the same session, [`SharedSession`] serialises every operation behind
//! one mutex, and [`SharedSession::with`] lets a caller observe
//! `can_undo()` and act on it without another caller slipping in between.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::HistoryError;
use crate::manager::HistoryManager;
use crate::unit::{UndoableUnit, UnitMetadata};

/// Operations shared by [`CommandInvoker`](crate::CommandInvoker) and
/// [`SnapshotCaretaker`](crate::SnapshotCaretaker).
pub trait UndoRedo {
    /// Command receiver type.
    type Target;
    /// Snapshot type.
    type Snapshot;

    /// The underlying history.
    fn history(&self) -> &HistoryManager<Self::Target, Self::Snapshot>;

    /// Undo one step, applying its reverse effect to the domain object.
    fn undo(&mut self) -> Result<&UndoableUnit<Self::Target, Self::Snapshot>, HistoryError>;

    /// Redo one step, re-applying its forward effect.
    fn redo(&mut self) -> Result<&UndoableUnit<Self::Target, Self::Snapshot>, HistoryError>;

    /// Forget all history without touching the domain object.
    fn clear(&mut self);

    /// True if there is something to undo.
    fn can_undo(&self) -> bool {
        self.history().can_undo()
    }

    /// True if there is something to redo.
    fn can_redo(&self) -> bool {
        self.history().can_redo()
    }

    /// `(undo_count, redo_count)`.
    fn history_size(&self) -> (usize, usize) {
        self.history().history_size()
    }
}

/// A session shared between threads.
///
/// Cloning shares the same session. Undo and redo hand back a copy of the
/// moved unit's metadata since the unit itself stays behind the lock.
pub struct SharedSession<A> {
    inner: Arc<Mutex<A>>,
}

impl<A: fmt::Debug> fmt::Debug for SharedSession<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSession")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<A> Clone for SharedSession<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: UndoRedo> SharedSession<A> {
    /// Wrap an adapter.
    pub fn new(adapter: A) -> Self {
        Self {
            inner: Arc::new(Mutex::new(adapter)),
        }
    }

    /// Lock the session. A panic in another holder does not poison it.
    /// Undo and redo put the moved unit back on its stack before a panicking
    /// effect unwinds, so the history still matches what was committed.
    pub fn lock(&self) -> MutexGuard<'_, A> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access, for check-then-act sequences.
    pub fn with<T>(&self, f: impl FnOnce(&mut A) -> T) -> T {
        f(&mut self.lock())
    }

    /// Undo one step.
    pub fn undo(&self) -> Result<UnitMetadata, HistoryError> {
        self.lock().undo().map(|unit| unit.metadata().clone())
    }

    /// Redo one step.
    pub fn redo(&self) -> Result<UnitMetadata, HistoryError> {
        self.lock().redo().map(|unit| unit.metadata().clone())
    }

    /// Forget all history.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// True if there is something to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.lock().can_undo()
    }

    /// True if there is something to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.lock().can_redo()
    }

    /// `(undo_count, redo_count)`.
    #[must_use]
    pub fn history_size(&self) -> (usize, usize) {
        self.lock().history_size()
    }

    /// Unwrap the adapter if this is the last handle.
    pub fn try_into_inner(self) -> Result<A, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(PoisonError::into_inner)),
            Err(inner) => Err(Self { inner }),
        }
    }
}
