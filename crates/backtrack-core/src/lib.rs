#![forbid(unsafe_code)]

//! Backtrack Core
//!
//! A bounded undo/redo history engine. One history records reversible units
//! of a single model and moves them between an undo stack and a redo stack.
//!
//! # Key Components
//!
//! - [`HistoryManager`] - The two-stack history, bounded by capacity
//! - [`UndoableUnit`] - A recorded step: a command or a snapshot
//! - [`ReversibleCmd`] - Trait for commands that can apply and reverse
//! - [`Originator`] - Trait for objects whose state can be saved and restored
//! - [`CommandInvoker`] - Drives a receiver through a command history
//! - [`SnapshotCaretaker`] - Drives an originator through a snapshot history
//! - [`SharedSession`] - Serialised access to a session from many threads
//!
//! # Models
//!
//! In the **command** model each unit knows how to redo and undo its own
//! effect. In the **snapshot** model each unit holds a full copy of the
//! state after its commit. A history uses exactly one model for its whole
//! life.
//!
//! # Example
//!
//! ```
//! use backtrack_core::{CommandInvoker, FnCommand};
//!
//! let mut inv = CommandInvoker::new(0i32);
//! inv.execute(FnCommand::new(
//!     "Add 5",
//!     |n: &mut i32| {
//!         *n += 5;
//!         Ok(())
//!     },
//!     |n: &mut i32| {
//!         *n -= 5;
//!         Ok(())
//!     },
//! ))
//! .unwrap();
//! assert_eq!(*inv.receiver(), 5);
//!
//! inv.undo().unwrap();
//! assert_eq!(*inv.receiver(), 0);
//! ```

pub mod caretaker;
pub mod command;
pub mod config;
pub mod error;
pub mod invoker;
pub mod manager;
pub mod originator;
pub mod ring;
pub mod session;
pub mod store;
pub mod unit;

pub use caretaker::{SnapshotCaretaker, SnapshotUnit};
pub use command::{CommandBatch, CommandError, CommandResult, EffectFn, FnCommand, ReversibleCmd};
pub use config::HistoryConfig;
pub use error::{ConfigError, HistoryError};
pub use invoker::CommandInvoker;
pub use manager::HistoryManager;
pub use originator::Originator;
pub use ring::RingStack;
pub use session::{SharedSession, UndoRedo};
pub use store::{DEFAULT_CAPACITY, EmptyHistory, HistoryStore};
pub use unit::{Payload, UndoableUnit, UnitId, UnitKind, UnitMetadata, UnitSource};
