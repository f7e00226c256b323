#![forbid(unsafe_code)]

//! Command-model adapter.
//!
//! [`CommandInvoker`] owns a receiver and its history. Executing a command
//! applies it and commits it; undo calls `reverse()` on the popped command
//! and redo calls `apply()` on the same command again.
//!
//! If a command fails to apply, nothing is committed. If it fails to
//! reverse or re-apply, it stays on the stack it came from and the error is
//! returned; retrying is the caller's decision.

use std::fmt;
use std::num::NonZeroUsize;

use crate::command::ReversibleCmd;
use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::manager::HistoryManager;
use crate::session::UndoRedo;
use crate::unit::{UndoableUnit, UnitId, UnitKind};

const TARGET: &str = "backtrack.adapter";

fn not_a_command() -> HistoryError {
    HistoryError::InvalidUnit("snapshot unit in a command history".into())
}

/// Binds one receiver to one command history.
pub struct CommandInvoker<R> {
    receiver: R,
    history: HistoryManager<R>,
}

impl<R: fmt::Debug> fmt::Debug for CommandInvoker<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInvoker")
            .field("receiver", &self.receiver)
            .field("history", &self.history)
            .finish()
    }
}

impl<R> CommandInvoker<R> {
    /// Invoker with the default capacity.
    pub fn new(receiver: R) -> Self {
        Self {
            receiver,
            history: HistoryManager::new(UnitKind::Command, HistoryConfig::default().capacity),
        }
    }

    /// Invoker with an explicit capacity.
    pub fn with_capacity(receiver: R, capacity: NonZeroUsize) -> Self {
        Self {
            receiver,
            history: HistoryManager::new(UnitKind::Command, capacity),
        }
    }

    /// Invoker built from a config. Fails if the config pins the snapshot
    /// model.
    pub fn with_config(receiver: R, config: &HistoryConfig) -> Result<Self, HistoryError> {
        Ok(Self {
            receiver,
            history: HistoryManager::with_config(UnitKind::Command, config)?,
        })
    }

    /// Adopt an existing history. It must be a command history.
    pub fn from_history(receiver: R, history: HistoryManager<R>) -> Result<Self, HistoryError> {
        if history.kind() != UnitKind::Command {
            return Err(HistoryError::InconsistentModel {
                expected: UnitKind::Command,
                found: history.kind(),
            });
        }
        Ok(Self { receiver, history })
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Apply `cmd` to the receiver and commit it.
    pub fn execute(&mut self, cmd: impl ReversibleCmd<R> + 'static) -> Result<UnitId, HistoryError> {
        self.execute_unit(UndoableUnit::command(cmd))
    }

    /// Apply a prepared unit and commit it.
    pub fn execute_unit(&mut self, mut unit: UndoableUnit<R>) -> Result<UnitId, HistoryError> {
        let cmd = unit.command_mut().ok_or_else(not_a_command)?;
        cmd.apply(&mut self.receiver)?;
        tracing::debug!(target: TARGET, unit = %unit.id(), "command applied");
        let id = unit.id();
        self.history.commit(unit)?;
        Ok(id)
    }

    /// Reverse the most recent command.
    pub fn undo(&mut self) -> Result<&UndoableUnit<R>, HistoryError> {
        let receiver = &mut self.receiver;
        self.history.undo_with(|unit| {
            let cmd = unit.command_mut().ok_or_else(not_a_command)?;
            cmd.reverse(receiver)?;
            tracing::debug!(target: TARGET, unit = %unit.id(), "command reversed");
            Ok(())
        })
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self) -> Result<&UndoableUnit<R>, HistoryError> {
        let receiver = &mut self.receiver;
        self.history.redo_with(|unit| {
            let cmd = unit.command_mut().ok_or_else(not_a_command)?;
            cmd.apply(receiver)?;
            tracing::debug!(target: TARGET, unit = %unit.id(), "command re-applied");
            Ok(())
        })
    }

    /// Forget all history. The receiver is left as it is.
    pub fn clear(&mut self) {
        self.history.clear();
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

    /// The receiver commands act on.
    #[must_use]
    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    /// The underlying history.
    #[must_use]
    pub fn history(&self) -> &HistoryManager<R> {
        &self.history
    }

    /// End the session, returning the receiver.
    pub fn into_inner(self) -> R {
        self.receiver
    }
}

impl<R> UndoRedo for CommandInvoker<R> {
    type Target = R;
    type Snapshot = ();

    fn history(&self) -> &HistoryManager<R> {
        &self.history
    }

    fn undo(&mut self) -> Result<&UndoableUnit<R>, HistoryError> {
        CommandInvoker::undo(self)
    }

    fn redo(&mut self) -> Result<&UndoableUnit<R>, HistoryError> {
        CommandInvoker::redo(self)
    }

    fn clear(&mut self) {
        CommandInvoker::clear(self);
    }
}

// ============================================================================
// Tests
// ============================================================================
