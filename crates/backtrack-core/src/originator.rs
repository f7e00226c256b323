#![forbid(unsafe_code)]

//! The contract a domain object fulfils to be tracked by snapshots.

/// A domain object whose full state can be captured and restored.
///
/// # Contract
///
/// - [`save`](Self::save) returns an independent copy: later mutation of the
///   live object never shows up in a previously saved snapshot, and the
///   other way round.
/// - [`restore`](Self::restore) overwrites all observable state from the
///   snapshot. It is a whole-state replace, not a patch.
pub trait Originator {
    /// Immutable capture of the full state.
    type Snapshot;

    /// Capture the current state.
    fn save(&self) -> Self::Snapshot;

    /// Replace the current state with `snapshot`.
    fn restore(&mut self, snapshot: &Self::Snapshot);
}

impl<O: Originator + ?Sized> Originator for Box<O> {
    type Snapshot = O::Snapshot;

    fn save(&self) -> Self::Snapshot {
        (**self).save()
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) {
        (**self).restore(snapshot);
    }
}
