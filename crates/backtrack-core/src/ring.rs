#![forbid(unsafe_code)]

//! Fixed-capacity ring buffer used as a bounded stack.
//!
//! Slots are allocated once, at construction. Pushing onto a full stack
//! overwrites the bottom (oldest) slot and hands the overwritten item back,
//! so eviction is O(1) and never reallocates.
//!
//! ```text
//! capacity 4, after push(a..e)
//!
//!   slots: [ e | b | c | d ]
//!            ^   ^
//!          top  head (bottom)
//! ```

use std::fmt;
use std::num::NonZeroUsize;

/// Bounded LIFO stack over a ring of `capacity` slots.
pub struct RingStack<T> {
    slots: Box<[Option<T>]>,
    /// Slot index of the bottom (oldest) item.
    head: usize,
    len: usize,
}

impl<T> RingStack<T> {
    /// Create an empty stack holding at most `capacity` items.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: (0..capacity.get()).map(|_| None).collect(),
            head: 0,
            len: 0,
        }
    }

    /// Maximum number of items.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if the next push will evict.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Slot index of the item `depth` places below the top.
    fn slot(&self, depth: usize) -> usize {
        (self.head + self.len - 1 - depth) % self.slots.len()
    }

    /// Push onto the top. Returns the evicted bottom item when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let cap = self.slots.len();
        if self.len == cap {
            // The top slot after wrapping is the current bottom.
            let evicted = self.slots[self.head].replace(item);
            self.head = (self.head + 1) % cap;
            evicted
        } else {
            let idx = (self.head + self.len) % cap;
            self.slots[idx] = Some(item);
            self.len += 1;
            None
        }
    }

    /// Remove and return the top item.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let idx = self.slot(0);
        self.len -= 1;
        if self.len == 0 {
            self.head = 0;
        }
        self.slots[idx].take()
    }

    /// Top item.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.get(0)
    }

    /// Top item, mutably.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            return None;
        }
        let idx = self.slot(0);
        self.slots[idx].as_mut()
    }

    /// Item `depth` places below the top (0 is the top).
    #[must_use]
    pub fn get(&self, depth: usize) -> Option<&T> {
        if depth >= self.len {
            return None;
        }
        self.slots[self.slot(depth)].as_ref()
    }

    /// Items from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |depth| self.get(depth))
    }

    /// Drop every item.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Remove every item, returned bottom first.
    pub fn drain(&mut self) -> Vec<T> {
        let cap = self.slots.len();
        let items = (0..self.len)
            .filter_map(|i| self.slots[(self.head + i) % cap].take())
            .collect();
        self.head = 0;
        self.len = 0;
        items
    }
}

impl<T: fmt::Debug> fmt::Debug for RingStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingStack")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("top_first", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
