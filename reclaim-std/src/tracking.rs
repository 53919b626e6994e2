//! Leak tracker implementation.
//!
//! [`LeakTracker`] remembers every value that reports itself and forgets it
//! again once the value is owned or disposed. Anything still remembered after
//! the configured window is reported as a potential leak.
//!
//! The tracker never schedules anything; callers decide when to look, for
//! example at the end of a frame or a test.
//!
//! # Example
//!
//! ```rust,ignore
//! let leaks = Rc::new(LeakTracker::new());
//! let tracker: Rc<dyn DisposableTracker> = leaks.clone();
//! let store = DisposableStore::new().tracked_by(&tracker);
//! // ... later
//! leaks.report();
//! ```

use reclaim_core::{DisposableTracker, TrackId};
use std::{
    backtrace::Backtrace,
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::Rc,
    time::{Duration, Instant},
};

/// How long a value may stay unowned before it counts as leaked.
pub const DEFAULT_LEAK_WINDOW: Duration = Duration::from_secs(3);

struct Record {
    kind: &'static str,
    created: Instant,
    backtrace: Rc<Backtrace>,
}

/// A value that has been neither owned nor disposed within the window.
#[derive(Debug, Clone)]
pub struct PotentialLeak {
    /// The id the tracker assigned.
    pub id: TrackId,
    /// The kind the value reported.
    pub kind: &'static str,
    /// Time since the value was created.
    pub age: Duration,
    /// Where the value was created. Only captured when backtraces are enabled.
    pub backtrace: Rc<Backtrace>,
}

/// A [`DisposableTracker`] that reports values left unowned for too long.
pub struct LeakTracker {
    next_id: Cell<u64>,
    live: RefCell<HashMap<TrackId, Record>>,
    window: Duration,
}

impl LeakTracker {
    /// Create a tracker using [`DEFAULT_LEAK_WINDOW`].
    pub fn new() -> Self {
        Self::with_window(DEFAULT_LEAK_WINDOW)
    }

    /// Create a tracker using a custom window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            next_id: Cell::new(0),
            live: RefCell::new(HashMap::new()),
            window,
        }
    }

    /// The configured window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of values currently neither owned nor disposed.
    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }

    /// Values unowned for longer than the configured window, oldest first.
    pub fn potential_leaks(&self) -> Vec<PotentialLeak> {
        self.potential_leaks_older_than(self.window)
    }

    /// Values unowned for longer than `age`, oldest first.
    pub fn potential_leaks_older_than(&self, age: Duration) -> Vec<PotentialLeak> {
        let now = Instant::now();
        let mut leaks: Vec<PotentialLeak> = self
            .live
            .borrow()
            .iter()
            .filter_map(|(id, record)| {
                let elapsed = now.saturating_duration_since(record.created);
                (elapsed >= age).then(|| PotentialLeak {
                    id: *id,
                    kind: record.kind,
                    age: elapsed,
                    backtrace: Rc::clone(&record.backtrace),
                })
            })
            .collect();
        leaks.sort_by_key(|leak| leak.id);
        leaks
    }

    /// Log every potential leak and return how many there were.
    pub fn report(&self) -> usize {
        let leaks = self.potential_leaks();
        #[cfg(feature = "tracing")]
        for leak in &leaks {
            tracing::warn!(
                id = %leak.id,
                kind = leak.kind,
                age = ?leak.age,
                backtrace = %leak.backtrace,
                "potentially leaked disposable"
            );
        }
        leaks.len()
    }
}

impl Default for LeakTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DisposableTracker for LeakTracker {
    fn track(&self, kind: &'static str) -> TrackId {
        let id = TrackId::new(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.live.borrow_mut().insert(
            id,
            Record {
                kind,
                created: Instant::now(),
                backtrace: Rc::new(Backtrace::capture()),
            },
        );
        id
    }

    fn mark_tracked(&self, id: TrackId) {
        self.live.borrow_mut().remove(&id);
    }

    fn leaked_add(&self, store: TrackId) {
        #[cfg(feature = "tracing")]
        tracing::warn!(store = %store, "disposable added to a disposed store was leaked");
        #[cfg(not(feature = "tracing"))]
        let _ = store;
    }
}

impl fmt::Debug for LeakTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeakTracker")
            .field("live", &self.live_count())
            .field("window", &self.window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{DisposableFn, DisposableStore, MutableDisposable, to_disposable};
    use reclaim_core::Disposable;

    #[test]
    fn test_owned_and_disposed_values_are_forgotten() {
        let leaks = Rc::new(LeakTracker::with_window(Duration::ZERO));
        let tracker: Rc<dyn DisposableTracker> = leaks.clone();

        let store = DisposableStore::new().tracked_by(&tracker);
        let owned = Rc::new(DisposableFn::new(|| {}).tracked_by(&tracker));
        let orphan = Rc::new(DisposableFn::new(|| {}).tracked_by(&tracker));
        assert_eq!(leaks.live_count(), 3);

        store.add(owned);
        store.dispose();
        let remaining = leaks.potential_leaks();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].kind, DisposableFn::KIND);
        assert_eq!(leaks.report(), 1);

        orphan.dispose();
        assert_eq!(leaks.report(), 0);
    }

    #[test]
    fn test_window_hides_young_values() {
        let leaks = Rc::new(LeakTracker::new());
        let tracker: Rc<dyn DisposableTracker> = leaks.clone();
        let _holder = MutableDisposable::<DisposableFn>::new().tracked_by(&tracker);

        assert_eq!(leaks.window(), DEFAULT_LEAK_WINDOW);
        assert!(leaks.potential_leaks().is_empty());
        assert_eq!(leaks.potential_leaks_older_than(Duration::ZERO).len(), 1);
    }

    #[test]
    fn test_untracked_values_cost_nothing() {
        let leaks = Rc::new(LeakTracker::new());
        let store = DisposableStore::new();
        store.add(to_disposable(|| {}));
        store.dispose();
        assert_eq!(leaks.live_count(), 0);
    }
}
