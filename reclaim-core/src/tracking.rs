//! # Leak Diagnostics
//!
//! A disposable that is neither disposed nor handed to an owner is a leak.
//! Trackable types accept an optional [`DisposableTracker`]; when one is
//! attached they report their creation, and they report again once they are
//! owned or disposed. Whatever the tracker still holds after a while is a
//! potential leak.
//!
//! Nothing is tracked unless a tracker is attached, so the default costs a
//! single `Option` check per dispose.

use std::{fmt, rc::Rc};

/// Identifier a tracker hands out for each tracked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(u64);

impl TrackId {
    /// Create an id from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value of this id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A collaborator that watches disposables for leaks.
pub trait DisposableTracker {
    /// Start tracking a newly created value of the given kind.
    fn track(&self, kind: &'static str) -> TrackId;

    /// The value has been disposed or handed to an owner.
    fn mark_tracked(&self, id: TrackId);

    /// A tracked store was asked to own an item after it was disposed.
    ///
    /// The item was returned to the caller unowned.
    fn leaked_add(&self, store: TrackId) {
        let _ = store;
    }
}

/// A tracker registration held by a trackable value.
#[derive(Clone)]
pub struct Tracking {
    tracker: Rc<dyn DisposableTracker>,
    id: TrackId,
}

impl Tracking {
    /// Register a value of the given kind with `tracker`.
    pub fn new(tracker: Rc<dyn DisposableTracker>, kind: &'static str) -> Self {
        let id = tracker.track(kind);
        Self { tracker, id }
    }

    /// The id the tracker assigned.
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// The tracker this registration reports to.
    pub fn tracker(&self) -> &Rc<dyn DisposableTracker> {
        &self.tracker
    }

    /// Report the value as owned or disposed.
    pub fn mark(&self) {
        self.tracker.mark_tracked(self.id);
    }
}

impl fmt::Debug for Tracking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracking").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Ledger {
        next: Cell<u64>,
        tracked: RefCell<Vec<&'static str>>,
        marked: RefCell<Vec<TrackId>>,
    }

    impl DisposableTracker for Ledger {
        fn track(&self, kind: &'static str) -> TrackId {
            self.next.set(self.next.get() + 1);
            self.tracked.borrow_mut().push(kind);
            TrackId::new(self.next.get())
        }

        fn mark_tracked(&self, id: TrackId) {
            self.marked.borrow_mut().push(id);
        }
    }

    #[test]
    fn test_tracking_registers_and_marks() {
        let ledger = Rc::new(Ledger::default());
        let tracking = Tracking::new(ledger.clone(), "Thing");
        assert_eq!(tracking.id(), TrackId::new(1));
        assert_eq!(*ledger.tracked.borrow(), vec!["Thing"]);

        tracking.mark();
        assert_eq!(*ledger.marked.borrow(), vec![TrackId::new(1)]);
        assert_eq!(tracking.id().to_string(), "#1");
    }
}
