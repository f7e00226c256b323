#![no_main]

use std::num::NonZeroUsize;

use arbitrary::Arbitrary;
use backtrack_core::{FnCommand, HistoryManager, UndoableUnit, UnitKind};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Commit,
    CommitSnapshot,
    Undo,
    Redo,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    ops: Vec<Op>,
}

fn noop() -> FnCommand<()> {
    FnCommand::new("noop", |_: &mut ()| Ok(()), |_: &mut ()| Ok(()))
}

fuzz_target!(|input: Input| {
    let capacity = usize::from(input.capacity % 16) + 1;
    let Some(cap) = NonZeroUsize::new(capacity) else {
        return;
    };
    let mut history: HistoryManager<()> = HistoryManager::new(UnitKind::Command, cap);

    for op in input.ops {
        let before = history.history_size();
        match op {
            Op::Commit => {
                history.commit(UndoableUnit::command(noop())).expect("command commit");
                assert_eq!(history.redo_depth(), 0, "commit left redo entries");
                assert_eq!(history.undo_depth(), (before.0 + 1).min(capacity));
            }
            Op::CommitSnapshot => {
                assert!(history.commit(UndoableUnit::snapshot("wrong", ())).is_err());
                assert_eq!(history.history_size(), before, "rejected commit changed state");
            }
            Op::Undo => match history.undo() {
                Ok(_) => assert_eq!(history.history_size(), (before.0 - 1, before.1 + 1)),
                Err(_) => assert_eq!(before.0, 0),
            },
            Op::Redo => match history.redo() {
                Ok(_) => assert_eq!(history.history_size(), (before.0 + 1, before.1 - 1)),
                Err(_) => assert_eq!(before.1, 0),
            },
            Op::Clear => {
                history.clear();
                assert_eq!(history.history_size(), (0, 0));
            }
        }

        let (undo, redo) = history.history_size();
        assert!(undo <= capacity, "undo depth {undo} over capacity {capacity}");
        assert!(undo + redo <= capacity, "stacks hold more than capacity");
        assert_eq!(history.can_undo(), undo > 0);
        assert_eq!(history.can_redo(), redo > 0);
    }
});
