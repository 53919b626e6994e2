//! Testing utilities for Reclaim.
//!
//! This module provides small fixtures for asserting disposal counts and
//! callback order.
//!
//! # Features
//!
//! - [`DisposeProbe`]: A disposable that counts how often it was disposed
//! - [`CallLog`]: A shared, ordered log of callback invocations
//! - [`RecordingTracker`]: A leak tracker that records everything it hears

use reclaim_core::{Disposable, DisposableTracker, TrackId};
use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

// ============================================================================
// Call Log
// ============================================================================

/// A shared, ordered log of strings.
///
/// Clones append to the same log.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let store = DisposableStore::new();
/// let l = log.clone();
/// store.add(to_disposable(move || l.push("a")));
/// store.dispose();
/// assert_eq!(log.entries(), vec!["a"]);
/// ```
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    /// A copy of all entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl fmt::Debug for CallLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.borrow().iter()).finish()
    }
}

// ============================================================================
// Dispose Probe
// ============================================================================

/// A disposable that counts every `dispose` call it receives.
///
/// The probe itself is *not* idempotent, which is the point: a container
/// that disposes a member twice shows up as a count of two.
#[derive(Default)]
pub struct DisposeProbe {
    count: Cell<usize>,
    marked: Cell<usize>,
    hook: Option<Box<dyn Fn()>>,
}

impl DisposeProbe {
    /// Create a probe.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Create a probe that appends `label` to `log` on every dispose.
    pub fn logged(log: &CallLog, label: impl Into<String>) -> Rc<Self> {
        let log = log.clone();
        let label = label.into();
        Self::with_hook(move || log.push(label.clone()))
    }

    /// Create a probe that runs `hook` on every dispose.
    pub fn with_hook(hook: impl Fn() + 'static) -> Rc<Self> {
        Rc::new(Self {
            hook: Some(Box::new(hook)),
            ..Self::default()
        })
    }

    /// How many times `dispose` was called.
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Whether `dispose` was called at least once.
    pub fn is_disposed(&self) -> bool {
        self.count.get() > 0
    }

    /// How many times `mark_tracked` was called.
    pub fn marked(&self) -> usize {
        self.marked.get()
    }
}

impl Disposable for DisposeProbe {
    fn dispose(&self) {
        self.count.set(self.count.get() + 1);
        if let Some(hook) = &self.hook {
            hook();
        }
    }

    fn mark_tracked(&self) {
        self.marked.set(self.marked.get() + 1);
    }
}

impl fmt::Debug for DisposeProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeProbe")
            .field("count", &self.count())
            .finish()
    }
}

// ============================================================================
// Recording Tracker
// ============================================================================

/// A [`DisposableTracker`] that records every notification.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    tracked: RefCell<Vec<(TrackId, &'static str)>>,
    marked: RefCell<Vec<TrackId>>,
    leaked: RefCell<Vec<TrackId>>,
}

impl RecordingTracker {
    /// Create a tracker.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Kinds of all tracked values, in creation order.
    pub fn tracked_kinds(&self) -> Vec<&'static str> {
        self.tracked.borrow().iter().map(|(_, kind)| *kind).collect()
    }

    /// Every `mark_tracked` notification, in order.
    pub fn marked(&self) -> Vec<TrackId> {
        self.marked.borrow().clone()
    }

    /// Tracked values that were never marked.
    pub fn unmarked(&self) -> Vec<TrackId> {
        let marked = self.marked.borrow();
        self.tracked
            .borrow()
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !marked.contains(id))
            .collect()
    }

    /// Stores that reported a leaked add.
    pub fn leaked(&self) -> Vec<TrackId> {
        self.leaked.borrow().clone()
    }
}

impl DisposableTracker for RecordingTracker {
    fn track(&self, kind: &'static str) -> TrackId {
        let mut tracked = self.tracked.borrow_mut();
        let id = TrackId::new(tracked.len() as u64);
        tracked.push((id, kind));
        id
    }

    fn mark_tracked(&self, id: TrackId) {
        self.marked.borrow_mut().push(id);
    }

    fn leaked_add(&self, store: TrackId) {
        self.leaked.borrow_mut().push(store);
    }
}
