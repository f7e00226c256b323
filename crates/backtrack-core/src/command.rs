#![forbid(unsafe_code)]

//! Reversible commands for the command model.
//!
//! A command owns everything it needs to mutate its receiver forward
//! ([`ReversibleCmd::apply`]) and back ([`ReversibleCmd::reverse`]). The
//! receiver is passed in on every call, so commands never hold borrows into
//! the domain object and can live in the history indefinitely.
//!
//! # Invariants
//!
//! - `apply()` is called exactly once per commit and once per later redo.
//! - `reverse()` restores the receiver to its state immediately before the
//!   most recent `apply()`. Restoration is best-effort: a command that only
//!   approximates its inverse documents that on its own type.

use std::fmt;

use thiserror::Error;

/// Result of applying or reversing a command.
pub type CommandResult = Result<(), CommandError>;

/// Domain failure raised from inside a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The object the command targets no longer exists.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// The receiver is in a state the command cannot act on.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// A reversible mutation of a receiver of type `T`.
///
/// Dyn-compatible so that heterogeneous commands share one history as
/// `Box<dyn ReversibleCmd<T>>`.
pub trait ReversibleCmd<T>: Send {
    /// Perform the forward mutation.
    fn apply(&mut self, target: &mut T) -> CommandResult;

    /// Perform the inverse of the most recent [`apply`](Self::apply).
    fn reverse(&mut self, target: &mut T) -> CommandResult;

    /// Stable label for display. Pure.
    fn description(&self) -> &str;

    /// Name used by the `Debug` impl of boxed commands.
    fn debug_name(&self) -> &'static str {
        "ReversibleCmd"
    }
}

impl<T> fmt::Debug for dyn ReversibleCmd<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .finish()
    }
}

/// Effect closure used by [`FnCommand`].
pub type EffectFn<T> = Box<dyn FnMut(&mut T) -> CommandResult + Send>;

/// A command assembled from a pair of effect closures.
///
/// Whatever the closures capture are the command's arguments.
///
/// ```ignore
/// let amount = 5;
/// let cmd = FnCommand::new(
///     "Add 5",
///     move |n: &mut i32| { *n += amount; Ok(()) },
///     move |n: &mut i32| { *n -= amount; Ok(()) },
/// );
/// ```
pub struct FnCommand<T> {
    description: String,
    apply: EffectFn<T>,
    reverse: EffectFn<T>,
}

impl<T> FnCommand<T> {
    /// Create a command from its forward and reverse effects.
    pub fn new<A, R>(description: impl Into<String>, apply: A, reverse: R) -> Self
    where
        A: FnMut(&mut T) -> CommandResult + Send + 'static,
        R: FnMut(&mut T) -> CommandResult + Send + 'static,
    {
        Self {
            description: description.into(),
            apply: Box::new(apply),
            reverse: Box::new(reverse),
        }
    }
}

impl<T> fmt::Debug for FnCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T> ReversibleCmd<T> for FnCommand<T> {
    fn apply(&mut self, target: &mut T) -> CommandResult {
        (self.apply)(target)
    }

    fn reverse(&mut self, target: &mut T) -> CommandResult {
        (self.reverse)(target)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn debug_name(&self) -> &'static str {
        "FnCommand"
    }
}

/// Several commands that apply and reverse as one history step.
pub struct CommandBatch<T> {
    description: String,
    commands: Vec<Box<dyn ReversibleCmd<T>>>,
    /// Number of leading commands currently applied.
    applied: usize,
}

impl<T> fmt::Debug for CommandBatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBatch")
            .field("description", &self.description)
            .field("commands_count", &self.commands.len())
            .field("applied", &self.applied)
            .finish()
    }
}

impl<T> CommandBatch<T> {
    /// Create an empty batch.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            commands: Vec::new(),
            applied: 0,
        }
    }

    /// Append a command. It runs after every command already in the batch.
    pub fn push(&mut self, cmd: impl ReversibleCmd<T> + 'static) {
        self.commands.push(Box::new(cmd));
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, cmd: impl ReversibleCmd<T> + 'static) -> Self {
        self.push(cmd);
        self
    }

    /// Number of commands in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if the batch holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<T> ReversibleCmd<T> for CommandBatch<T> {
    fn apply(&mut self, target: &mut T) -> CommandResult {
        for i in 0..self.commands.len() {
            if let Err(err) = self.commands[i].apply(target) {
                // Roll back what already ran so the batch is all-or-nothing.
                for j in (0..i).rev() {
                    if let Err(rollback) = self.commands[j].reverse(target) {
                        tracing::warn!(
                            target: "backtrack.adapter",
                            batch = %self.description,
                            error = %rollback,
                            "batch rollback failed"
                        );
                    }
                }
                self.applied = 0;
                return Err(err);
            }
            self.applied = i + 1;
        }
        Ok(())
    }

    fn reverse(&mut self, target: &mut T) -> CommandResult {
        while self.applied > 0 {
            self.commands[self.applied - 1].reverse(target)?;
            self.applied -= 1;
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn debug_name(&self) -> &'static str {
        "CommandBatch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(amount: i32) -> FnCommand<i32> {
        FnCommand::new(
            format!("Add {amount}"),
            move |n: &mut i32| {
                *n += amount;
                Ok(())
            },
            move |n: &mut i32| {
                *n -= amount;
                Ok(())
            },
        )
    }

    fn failing() -> FnCommand<i32> {
        FnCommand::new(
            "Fail",
            |_: &mut i32| Err(CommandError::Other("boom".into())),
            |_: &mut i32| Ok(()),
        )
    }

    #[test]
    fn fn_command_applies_and_reverses() {
        let mut value = 10;
        let mut cmd = add(5);
        cmd.apply(&mut value).unwrap();
        assert_eq!(value, 15);
        cmd.reverse(&mut value).unwrap();
        assert_eq!(value, 10);
        assert_eq!(cmd.description(), "Add 5");
    }

    #[test]
    fn fn_command_reapply_after_reverse() {
        let mut value = 0;
        let mut cmd = add(3);
        cmd.apply(&mut value).unwrap();
        cmd.reverse(&mut value).unwrap();
        cmd.apply(&mut value).unwrap();
        assert_eq!(value, 3);
    }

    #[test]
    fn boxed_command_is_dyn_compatible() {
        let mut value = 1;
        let mut boxed: Box<dyn ReversibleCmd<i32>> = Box::new(add(2));
        boxed.apply(&mut value).unwrap();
        assert_eq!(value, 3);
        let debug = format!("{boxed:?}");
        assert!(debug.contains("FnCommand"));
        assert!(debug.contains("Add 2"));
    }

    #[test]
    fn batch_applies_in_order_and_reverses_backwards() {
        let log = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut batch = CommandBatch::new("Two steps");
        for name in ["first", "second"] {
            let fwd = log.clone();
            let back = log.clone();
            batch.push(FnCommand::new(
                name,
                move |_: &mut ()| {
                    fwd.lock().unwrap().push(format!("apply {name}"));
                    Ok(())
                },
                move |_: &mut ()| {
                    back.lock().unwrap().push(format!("reverse {name}"));
                    Ok(())
                },
            ));
        }

        batch.apply(&mut ()).unwrap();
        batch.reverse(&mut ()).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "apply first",
                "apply second",
                "reverse second",
                "reverse first"
            ]
        );
    }

    #[test]
    fn batch_rolls_back_on_failure() {
        let mut value = 0;
        let mut batch = CommandBatch::new("Mixed").with(add(1)).with(add(2)).with(failing());
        assert_eq!(batch.len(), 3);

        let err = batch.apply(&mut value).unwrap_err();
        assert_eq!(err, CommandError::Other("boom".into()));
        assert_eq!(value, 0);

        // Nothing is applied, so reversing is a no-op.
        batch.reverse(&mut value).unwrap();
        assert_eq!(value, 0);
    }

    #[test]
    fn empty_batch() {
        let mut batch = CommandBatch::<i32>::new("Empty");
        assert!(batch.is_empty());
        let mut value = 7;
        batch.apply(&mut value).unwrap();
        batch.reverse(&mut value).unwrap();
        assert_eq!(value, 7);
        assert!(format!("{batch:?}").contains("CommandBatch"));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            CommandError::TargetNotFound("doc 3".into()).to_string(),
            "target not found: doc 3"
        );
        assert_eq!(
            CommandError::InvalidState("read-only".into()).to_string(),
            "invalid state: read-only"
        );
        assert_eq!(CommandError::Other("x".into()).to_string(), "x");
    }
}
