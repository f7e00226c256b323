#![forbid(unsafe_code)]

//! Property tests for history invariants.
//!
//! Validates:
//! - The undo stack never exceeds capacity, and undo + redo never does either.
//! - Any commit empties the redo stack.
//! - Undo followed by redo leaves the domain object and both depths unchanged.
//! - Random operation sequences always agree with a simple reference model.
//! - Calls on an empty stack fail and change nothing.

use std::num::NonZeroUsize;

use proptest::prelude::*;

use backtrack_core::{
    CommandInvoker, FnCommand, HistoryError, HistoryManager, Originator, SnapshotCaretaker,
    UndoableUnit, UnitKind,
};

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Commit(i64),
    Undo,
    Redo,
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-1000i64..1000).prop_map(Op::Commit),
        3 => Just(Op::Undo),
        2 => Just(Op::Redo),
        1 => Just(Op::Clear),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

fn add(delta: i64) -> FnCommand<i64> {
    FnCommand::new(
        format!("add {delta}"),
        move |n: &mut i64| {
            *n += delta;
            Ok(())
        },
        move |n: &mut i64| {
            *n -= delta;
            Ok(())
        },
    )
}

#[derive(Debug, Default)]
struct Counter(i64);

impl Originator for Counter {
    type Snapshot = i64;

    fn save(&self) -> i64 {
        self.0
    }

    fn restore(&mut self, snapshot: &i64) {
        self.0 = *snapshot;
    }
}

/// Reference model: the full list of states, a cursor, and a floor that
/// moves up as old entries fall off.
#[derive(Debug)]
struct Model {
    states: Vec<i64>,
    pos: usize,
    floor: usize,
    capacity: usize,
}

impl Model {
    fn new(capacity: usize) -> Self {
        Self {
            states: vec![0],
            pos: 0,
            floor: 0,
            capacity,
        }
    }

    fn commit(&mut self, value: i64) {
        self.states.truncate(self.pos + 1);
        self.states.push(value);
        self.pos += 1;
        if self.pos - self.floor > self.capacity {
            self.floor += 1;
        }
    }

    fn undo(&mut self) -> bool {
        if self.pos > self.floor {
            self.pos -= 1;
            true
        } else {
            false
        }
    }

    fn redo(&mut self) -> bool {
        if self.pos + 1 < self.states.len() {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn clear(&mut self) {
        self.states.truncate(self.pos + 1);
        self.floor = self.pos;
    }

    fn current(&self) -> i64 {
        self.states[self.pos]
    }

    fn size(&self) -> (usize, usize) {
        (self.pos - self.floor, self.states.len() - 1 - self.pos)
    }
}

// ============================================================================
// Invariant 1: Capacity is never exceeded
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn capacity_never_exceeded(
        capacity in 1usize..8,
        ops in ops_strategy(120),
    ) {
        let cap = NonZeroUsize::new(capacity).unwrap();
        let mut history: HistoryManager<i64> = HistoryManager::new(UnitKind::Command, cap);

        for op in &ops {
            match op {
                Op::Commit(v) => history.commit(UndoableUnit::command(add(*v))).unwrap(),
                Op::Undo => { let _ = history.undo(); }
                Op::Redo => { let _ = history.redo(); }
                Op::Clear => history.clear(),
            }
            let (undo, redo) = history.history_size();
            prop_assert!(undo <= capacity);
            prop_assert!(undo + redo <= capacity);
        }
    }
}

// ============================================================================
// Invariant 2: Commit invalidates redo
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn commit_invalidates_redo(
        commits in 1usize..20,
        undos in 0usize..20,
        value in any::<i64>(),
    ) {
        let mut history: HistoryManager<i64> =
            HistoryManager::new(UnitKind::Command, NonZeroUsize::new(32).unwrap());
        for i in 0..commits {
            history.commit(UndoableUnit::command(add(i as i64))).unwrap();
        }
        for _ in 0..undos {
            let _ = history.undo();
        }
        let before = history.undo_depth();

        history.commit(UndoableUnit::command(add(value))).unwrap();
        prop_assert_eq!(history.redo_depth(), 0);
        prop_assert_eq!(history.undo_depth(), before + 1);
    }
}

// ============================================================================
// Invariant 3: Undo then redo is the identity
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn undo_redo_round_trip_command(
        deltas in prop::collection::vec(-500i64..500, 1..30),
    ) {
        let mut inv = CommandInvoker::new(0i64);
        for d in &deltas {
            inv.execute(add(*d)).unwrap();
        }
        let value = *inv.receiver();
        let size = inv.history_size();

        inv.undo().unwrap();
        inv.redo().unwrap();

        prop_assert_eq!(*inv.receiver(), value);
        prop_assert_eq!(inv.history_size(), size);
    }

    #[test]
    fn undo_redo_round_trip_snapshot(
        values in prop::collection::vec(any::<i64>(), 1..30),
    ) {
        let mut session = SnapshotCaretaker::new(Counter::default());
        for v in &values {
            session.edit("set", |c| c.0 = *v).unwrap();
        }
        let size = session.history_size();

        session.undo().unwrap();
        session.redo().unwrap();

        prop_assert_eq!(session.originator().0, *values.last().unwrap());
        prop_assert_eq!(session.history_size(), size);
    }
}

// ============================================================================
// Invariant 4: Both models agree with the reference model
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn snapshot_model_matches_reference(
        capacity in 1usize..6,
        ops in ops_strategy(80),
    ) {
        let cap = NonZeroUsize::new(capacity).unwrap();
        let mut session = SnapshotCaretaker::with_capacity(Counter::default(), cap);
        let mut model = Model::new(capacity);

        for op in &ops {
            match op {
                Op::Commit(v) => {
                    session.edit("set", |c| c.0 = *v).unwrap();
                    model.commit(*v);
                }
                Op::Undo => prop_assert_eq!(session.undo().is_ok(), model.undo()),
                Op::Redo => prop_assert_eq!(session.redo().is_ok(), model.redo()),
                Op::Clear => {
                    session.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(session.originator().0, model.current());
            prop_assert_eq!(session.history_size(), model.size());
        }
    }

    #[test]
    fn command_model_matches_reference(
        capacity in 1usize..6,
        ops in ops_strategy(80),
    ) {
        let cap = NonZeroUsize::new(capacity).unwrap();
        let mut inv = CommandInvoker::with_capacity(0i64, cap);
        let mut model = Model::new(capacity);

        for op in &ops {
            match op {
                Op::Commit(v) => {
                    let delta = *v - *inv.receiver();
                    inv.execute(add(delta)).unwrap();
                    model.commit(*v);
                }
                Op::Undo => prop_assert_eq!(inv.undo().is_ok(), model.undo()),
                Op::Redo => prop_assert_eq!(inv.redo().is_ok(), model.redo()),
                Op::Clear => {
                    inv.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(*inv.receiver(), model.current());
            prop_assert_eq!(inv.history_size(), model.size());
        }
    }
}

// ============================================================================
// Invariant 5: Empty-stack calls are inert
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn empty_calls_change_nothing(
        start in any::<i64>(),
        attempts in 1usize..10,
    ) {
        let mut inv = CommandInvoker::new(start);
        for _ in 0..attempts {
            prop_assert_eq!(inv.undo().unwrap_err(), HistoryError::NothingToUndo);
            prop_assert_eq!(inv.redo().unwrap_err(), HistoryError::NothingToRedo);
        }
        prop_assert_eq!(*inv.receiver(), start);
        prop_assert_eq!(inv.history_size(), (0, 0));
    }
}
