#![forbid(unsafe_code)]

//! Bounded two-stack history storage.
//!
//! [`HistoryStore`] knows nothing about what its units mean. It keeps an
//! undo stack and a redo stack, both ring buffers sized to the capacity,
//! and evicts the oldest undo entry when a push overflows.
//!
//! # Invariants
//!
//! 1. `undo_len() <= capacity()` after every operation.
//! 2. `undo_len() + redo_len() <= capacity()`: units only ever move between
//!    the stacks, and [`clear_redo`](HistoryStore::clear_redo) runs on every
//!    commit, so the redo ring can never overflow.

use std::fmt;
use std::num::NonZeroUsize;

use thiserror::Error;

use crate::ring::RingStack;

/// Default number of units kept on the undo stack.
pub const DEFAULT_CAPACITY: usize = 50;

/// A pop was attempted on an empty stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("history stack is empty")]
pub struct EmptyHistory;

/// Undo and redo stacks with capacity eviction.
pub struct HistoryStore<U> {
    undo: RingStack<U>,
    redo: RingStack<U>,
}

impl<U> HistoryStore<U> {
    /// Create an empty store.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            undo: RingStack::new(capacity),
            redo: RingStack::new(capacity),
        }
    }

    /// Create an empty store with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }

    /// Maximum undo depth.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.undo.capacity()
    }

    // ====================================================================
    // Undo stack
    // ====================================================================

    /// Push onto the undo stack. Returns the evicted oldest unit, if any.
    pub fn push(&mut self, unit: U) -> Option<U> {
        self.undo.push(unit)
    }

    /// Remove and return the top of the undo stack.
    pub fn pop_undo(&mut self) -> Result<U, EmptyHistory> {
        self.undo.pop().ok_or(EmptyHistory)
    }

    /// Top of the undo stack.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&U> {
        self.undo.peek()
    }

    /// Undo entry `depth` places below the top.
    #[must_use]
    pub fn undo_at(&self, depth: usize) -> Option<&U> {
        self.undo.get(depth)
    }

    /// Undo entries, most recent first.
    pub fn undo_iter(&self) -> impl Iterator<Item = &U> + '_ {
        self.undo.iter()
    }

    /// Undo depth.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    // ====================================================================
    // Redo stack
    // ====================================================================

    /// Push onto the redo stack.
    pub fn push_redo(&mut self, unit: U) {
        let evicted = self.redo.push(unit);
        debug_assert!(evicted.is_none(), "redo stack overflowed its capacity");
    }

    /// Remove and return the top of the redo stack.
    pub fn pop_redo(&mut self) -> Result<U, EmptyHistory> {
        self.redo.pop().ok_or(EmptyHistory)
    }

    /// Top of the redo stack.
    #[must_use]
    pub fn peek_redo(&self) -> Option<&U> {
        self.redo.peek()
    }

    /// Redo entries, most recent first.
    pub fn redo_iter(&self) -> impl Iterator<Item = &U> + '_ {
        self.redo.iter()
    }

    /// Redo depth.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Empty the redo stack.
    pub fn clear_redo(&mut self) {
        self.redo.clear();
    }

    /// Empty both stacks.
    pub fn clear_all(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Take every undo unit out, oldest first. The redo stack is dropped.
    pub fn drain(&mut self) -> Vec<U> {
        self.redo.clear();
        self.undo.drain()
    }
}

impl<U> Default for HistoryStore<U> {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl<U> fmt::Debug for HistoryStore<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStore")
            .field("undo_depth", &self.undo.len())
            .field("redo_depth", &self.redo.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
