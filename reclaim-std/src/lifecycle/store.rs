//! # Disposable Store
//!
//! An owning set of disposables. Disposing the store disposes every member
//! exactly once, in registration order.
//!
//! Members are identified by their `Rc` allocation, so adding the same
//! disposable twice keeps a single entry. Membership is indexed by identity;
//! adding and removing do not scan the store.

use reclaim_core::{Disposable, DisposableTracker, Tracking};
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap},
    fmt,
    rc::Rc,
};

/// Address of the allocation behind an `Rc`, used as its identity.
pub(crate) fn identity<T: ?Sized>(item: &Rc<T>) -> *const () {
    Rc::as_ptr(item).cast::<()>()
}

/// Members in registration order, plus an identity index into that order.
#[derive(Default)]
struct Members {
    next: u64,
    order: BTreeMap<u64, Box<dyn Disposable>>,
    index: HashMap<*const (), u64>,
}

impl Members {
    fn insert(&mut self, identity: *const (), item: Box<dyn Disposable>) {
        if self.index.contains_key(&identity) {
            return;
        }
        let seq = self.next;
        self.next += 1;
        self.index.insert(identity, seq);
        self.order.insert(seq, item);
    }

    fn remove(&mut self, identity: *const ()) -> Option<Box<dyn Disposable>> {
        let seq = self.index.remove(&identity)?;
        self.order.remove(&seq)
    }
}

/// An owning collection of disposables.
///
/// # Example
///
/// ```rust,ignore
/// let store = DisposableStore::new();
/// let timer = store.add(to_disposable(|| stop_timer()));
/// store.dispose(); // stops the timer
/// ```
pub struct DisposableStore {
    members: RefCell<Members>,
    disposed: Cell<bool>,
    tracking: Option<Tracking>,
}

impl DisposableStore {
    /// Kind reported to leak trackers.
    pub const KIND: &'static str = "DisposableStore";

    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            members: RefCell::new(Members::default()),
            disposed: Cell::new(false),
            tracking: None,
        }
    }

    /// Report this store, and items added to it after disposal, to `tracker`.
    pub fn tracked_by(mut self, tracker: &Rc<dyn DisposableTracker>) -> Self {
        self.tracking = Some(Tracking::new(Rc::clone(tracker), Self::KIND));
        self
    }

    /// Take ownership of `item`, returning it unchanged.
    ///
    /// If the store has already been disposed the item is *not* retained:
    /// a warning is logged and the caller is left holding an unowned
    /// resource.
    ///
    /// # Panics
    ///
    /// Panics if `item` is this store.
    pub fn add<D: Disposable + ?Sized + 'static>(&self, item: Rc<D>) -> Rc<D> {
        let id = identity(&item);
        if std::ptr::eq(id, (self as *const Self).cast::<()>()) {
            panic!("cannot register a disposable on itself");
        }

        item.mark_tracked();
        if self.disposed.get() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "trying to add a disposable to a DisposableStore that has already been disposed of; the added object will be leaked"
            );
            if let Some(tracking) = &self.tracking {
                tracking.tracker().leaked_add(tracking.id());
            }
            return item;
        }

        self.members
            .borrow_mut()
            .insert(id, Box::new(Rc::clone(&item)));
        item
    }

    /// Remove `item` from the store and dispose it.
    ///
    /// Does nothing if the item is not owned by this store.
    pub fn delete<D: Disposable + ?Sized + 'static>(&self, item: &Rc<D>) {
        let owned = self.members.borrow_mut().remove(identity(item));
        if let Some(owned) = owned {
            owned.dispose();
        }
    }

    /// Remove `item` from the store without disposing it.
    ///
    /// Ownership returns to the caller. Does nothing if the item is not owned
    /// by this store.
    pub fn delete_and_leak<D: Disposable + ?Sized + 'static>(&self, item: &Rc<D>) {
        self.members.borrow_mut().remove(identity(item));
    }

    /// Dispose every member and empty the store, leaving it usable.
    ///
    /// Items added by a member while it is being disposed stay in the store.
    pub fn clear(&self) {
        let members = std::mem::take(&mut *self.members.borrow_mut());
        for item in members.order.values() {
            item.dispose();
        }
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Number of owned items.
    pub fn len(&self) -> usize {
        self.members.borrow().order.len()
    }

    /// Whether the store owns nothing.
    pub fn is_empty(&self) -> bool {
        self.members.borrow().order.is_empty()
    }
}

impl Default for DisposableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Disposable for DisposableStore {
    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.mark_tracked();
        self.clear();
    }

    fn mark_tracked(&self) {
        if let Some(tracking) = &self.tracking {
            tracking.mark();
        }
    }
}

impl fmt::Debug for DisposableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposableStore")
            .field("len", &self.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lifecycle::to_disposable,
        testing::{CallLog, DisposeProbe, RecordingTracker},
    };

    #[test]
    fn test_dispose_in_registration_order() {
        let log = CallLog::new();
        let store = DisposableStore::new();
        for name in ["a", "b", "c"] {
            let log = log.clone();
            store.add(to_disposable(move || log.push(name)));
        }

        store.dispose();
        store.dispose();
        assert_eq!(log.entries(), vec!["a", "b", "c"]);
        assert!(store.is_disposed());
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_same_item_twice_keeps_one() {
        let store = DisposableStore::new();
        let probe = DisposeProbe::new();
        store.add(probe.clone());
        store.add(probe.clone());
        assert_eq!(store.len(), 1);

        store.dispose();
        assert_eq!(probe.count(), 1);
    }

    #[test]
    fn test_clear_keeps_store_usable() {
        let store = DisposableStore::new();
        let first = store.add(DisposeProbe::new());
        store.clear();
        assert_eq!(first.count(), 1);
        assert!(!store.is_disposed());

        let second = store.add(DisposeProbe::new());
        assert_eq!(store.len(), 1);
        store.dispose();
        assert_eq!(second.count(), 1);
        assert_eq!(first.count(), 1);
    }

    #[test]
    fn test_add_after_dispose_is_not_tracked() {
        let recorder = RecordingTracker::new();
        let tracker: Rc<dyn DisposableTracker> = recorder.clone();
        let store = DisposableStore::new().tracked_by(&tracker);
        store.dispose();

        let probe = DisposeProbe::new();
        let returned = store.add(probe.clone());
        assert!(Rc::ptr_eq(&returned, &probe));
        assert!(store.is_empty());
        assert_eq!(probe.count(), 0);
        assert_eq!(recorder.leaked().len(), 1);
    }

    #[test]
    fn test_delete_disposes_and_leak_does_not() {
        let store = DisposableStore::new();
        let deleted = store.add(DisposeProbe::new());
        let leaked = store.add(DisposeProbe::new());

        store.delete(&deleted);
        store.delete_and_leak(&leaked);
        store.delete(&DisposeProbe::new());
        assert!(store.is_empty());
        assert_eq!(deleted.count(), 1);

        store.dispose();
        assert_eq!(deleted.count(), 1);
        assert_eq!(leaked.count(), 0);
    }

    #[test]
    fn test_nested_stores() {
        let outer = DisposableStore::new();
        let inner = outer.add(Rc::new(DisposableStore::new()));
        let probe = inner.add(DisposeProbe::new());

        outer.dispose();
        assert!(inner.is_disposed());
        assert_eq!(probe.count(), 1);
    }

    #[test]
    fn test_large_store_keeps_order_after_deletes() {
        let log = CallLog::new();
        let store = DisposableStore::new();
        let probes: Vec<_> = (0..10_000)
            .map(|i| store.add(DisposeProbe::logged(&log, i.to_string())))
            .collect();
        for probe in probes.iter().step_by(2) {
            store.delete_and_leak(probe);
        }
        for probe in &probes {
            store.add(probe.clone());
        }
        assert_eq!(store.len(), 10_000);

        store.dispose();
        let entries = log.entries();
        let expected: Vec<String> = (1..10_000)
            .step_by(2)
            .chain((0..10_000).step_by(2))
            .map(|i| i.to_string())
            .collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn test_item_added_during_clear_stays_owned() {
        let store = Rc::new(DisposableStore::new());
        let late = DisposeProbe::new();
        let adder = {
            let store = Rc::downgrade(&store);
            let late = late.clone();
            DisposeProbe::with_hook(move || {
                if let Some(store) = store.upgrade() {
                    store.add(late.clone());
                }
            })
        };
        store.add(adder.clone());

        store.clear();
        assert_eq!(adder.count(), 1);
        assert_eq!(late.count(), 0);
        assert_eq!(store.len(), 1);

        store.dispose();
        assert_eq!(adder.count(), 1);
        assert_eq!(late.count(), 1);
    }

    #[test]
    fn test_member_disposing_its_store_during_clear() {
        let store = Rc::new(DisposableStore::new());
        let trigger = {
            let store = Rc::downgrade(&store);
            DisposeProbe::with_hook(move || {
                if let Some(store) = store.upgrade() {
                    store.dispose();
                }
            })
        };
        let after = DisposeProbe::new();
        store.add(trigger.clone());
        store.add(after.clone());

        store.clear();
        assert!(store.is_disposed());
        assert_eq!(trigger.count(), 1);
        assert_eq!(after.count(), 1);

        store.dispose();
        assert_eq!(after.count(), 1);
    }

    #[test]
    fn test_item_added_during_dispose_is_not_retained() {
        let recorder = RecordingTracker::new();
        let tracker: Rc<dyn DisposableTracker> = recorder.clone();
        let store = Rc::new(DisposableStore::new().tracked_by(&tracker));
        let late = DisposeProbe::new();
        let adder = {
            let store = Rc::downgrade(&store);
            let late = late.clone();
            DisposeProbe::with_hook(move || {
                if let Some(store) = store.upgrade() {
                    store.add(late.clone());
                }
            })
        };
        store.add(adder);

        store.dispose();
        assert!(store.is_empty());
        assert_eq!(late.count(), 0);
        assert_eq!(recorder.leaked().len(), 1);
    }

    #[test]
    #[should_panic(expected = "cannot register a disposable on itself")]
    fn test_add_self_panics() {
        let store = Rc::new(DisposableStore::new());
        store.add(store.clone());
    }
}
