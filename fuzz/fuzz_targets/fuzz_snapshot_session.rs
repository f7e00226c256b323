#![no_main]

use std::num::NonZeroUsize;

use arbitrary::Arbitrary;
use backtrack_core::{Originator, SnapshotCaretaker};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Push(u8),
    Undo,
    Redo,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    ops: Vec<Op>,
}

#[derive(Default)]
struct Bytes(Vec<u8>);

impl Originator for Bytes {
    type Snapshot = Vec<u8>;

    fn save(&self) -> Vec<u8> {
        self.0.clone()
    }

    fn restore(&mut self, snapshot: &Vec<u8>) {
        self.0.clone_from(snapshot);
    }
}

fuzz_target!(|input: Input| {
    let capacity = usize::from(input.capacity % 8) + 1;
    let Some(cap) = NonZeroUsize::new(capacity) else {
        return;
    };
    let mut session = SnapshotCaretaker::with_capacity(Bytes::default(), cap);

    // Every state the document has been in, and where we are.
    let mut states: Vec<Vec<u8>> = vec![Vec::new()];
    let mut pos = 0usize;
    let mut floor = 0usize;

    for op in input.ops {
        match op {
            Op::Push(b) => {
                session.edit("push", |doc| doc.0.push(b)).expect("snapshot commit");
                let mut next = states[pos].clone();
                next.push(b);
                states.truncate(pos + 1);
                states.push(next);
                pos += 1;
                if pos - floor > capacity {
                    floor += 1;
                }
            }
            Op::Undo => {
                let ok = session.undo().is_ok();
                assert_eq!(ok, pos > floor);
                if ok {
                    pos -= 1;
                }
            }
            Op::Redo => {
                let ok = session.redo().is_ok();
                assert_eq!(ok, pos + 1 < states.len());
                if ok {
                    pos += 1;
                }
            }
            Op::Clear => {
                session.clear();
                states.truncate(pos + 1);
                floor = pos;
            }
        }
        assert_eq!(session.originator().0, states[pos], "restored wrong state");
        assert_eq!(**session.current(), states[pos]);
    }
});
