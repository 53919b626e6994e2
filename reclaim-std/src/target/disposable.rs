//! An [`EventTarget`] whose registrations are disposables.

use super::{Event, EventListener, EventTarget, ListenerOptions};
use crate::lifecycle::{DisposableFn, DisposableStore, functional::tracked_disposable};
use reclaim_core::{Disposable, DisposableTracker, Tracking};
use std::{fmt, ops::Deref, rc::Rc};

/// An [`EventTarget`] that hands out disposable registrations and owns a
/// store for the ones it tracks itself.
///
/// Dereferences to the underlying target for `add_listener`,
/// `remove_listener`, and `dispatch`.
pub struct DisposableEventTarget<D = ()> {
    target: EventTarget<D>,
    store: DisposableStore,
    tracking: Option<Tracking>,
}

impl<D: 'static> DisposableEventTarget<D> {
    /// Kind reported to leak trackers.
    pub const KIND: &'static str = "DisposableEventTarget";

    /// Create a target with no listeners.
    pub fn new() -> Self {
        Self {
            target: EventTarget::new(),
            store: DisposableStore::new(),
            tracking: None,
        }
    }

    /// Report this target to `tracker`.
    pub fn tracked_by(mut self, tracker: &Rc<dyn DisposableTracker>) -> Self {
        self.tracking = Some(Tracking::new(Rc::clone(tracker), Self::KIND));
        self
    }

    /// Register `listener`; dispose the result to remove it again.
    ///
    /// The result is reported to this target's tracker.
    pub fn listen(
        &self,
        kind: &str,
        listener: EventListener<D>,
        options: impl Into<ListenerOptions>,
    ) -> Rc<DisposableFn> {
        let options = options.into();
        self.target.add_listener(kind, listener.clone(), options);

        let weak = self.target.downgrade();
        let kind = kind.to_owned();
        let tracker = self.tracking.as_ref().map(Tracking::tracker);
        tracked_disposable(tracker, move || {
            if let Some(target) = weak.upgrade() {
                target.remove_listener(&kind, &listener, options);
            }
        })
    }

    /// Register a callback; dispose the result to remove it again.
    pub fn listen_fn(
        &self,
        kind: &str,
        f: impl Fn(&Event<D>) + 'static,
        options: impl Into<ListenerOptions>,
    ) -> Rc<DisposableFn> {
        self.listen(kind, EventListener::callback(f), options)
    }

    /// Register `listener` for as long as this target lives.
    pub fn register_listener(
        &self,
        kind: &str,
        listener: EventListener<D>,
        options: impl Into<ListenerOptions>,
    ) -> Rc<DisposableFn> {
        self.store.add(self.listen(kind, listener, options))
    }

    /// Release `item` together with this target.
    ///
    /// # Panics
    ///
    /// Panics if `item` is this target.
    pub fn register<T: Disposable + ?Sized + 'static>(&self, item: Rc<T>) -> Rc<T> {
        if std::ptr::eq(
            Rc::as_ptr(&item).cast::<()>(),
            (self as *const Self).cast::<()>(),
        ) {
            panic!("cannot register a disposable on itself");
        }
        self.store.add(item)
    }

    /// The underlying target.
    pub fn target(&self) -> &EventTarget<D> {
        &self.target
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.store.is_disposed()
    }
}

impl<D: 'static> Default for DisposableEventTarget<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Deref for DisposableEventTarget<D> {
    type Target = EventTarget<D>;

    fn deref(&self) -> &Self::Target {
        &self.target
    }
}

impl<D> Disposable for DisposableEventTarget<D> {
    fn dispose(&self) {
        self.mark_tracked();
        self.store.dispose();
    }

    fn mark_tracked(&self) {
        if let Some(tracking) = &self.tracking {
            tracking.mark();
        }
    }
}

impl<D> fmt::Debug for DisposableEventTarget<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposableEventTarget")
            .field("target", &self.target)
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        target::ListenerFlags,
        testing::{CallLog, RecordingTracker},
        tracking::LeakTracker,
    };
    use std::time::Duration;

    #[test]
    fn test_listen_returns_removal() {
        let log = CallLog::new();
        let target: DisposableEventTarget = DisposableEventTarget::new();
        let subscription = {
            let log = log.clone();
            target.listen_fn("click", move |event| log.push(event.kind().to_owned()), true)
        };

        target.dispatch(&mut Event::of("click"));
        subscription.dispose();
        assert!(!target.dispatch(&mut Event::of("click")));
        assert_eq!(log.entries(), vec!["click"]);
    }

    #[test]
    fn test_dispose_removes_registered_listeners() {
        let log = CallLog::new();
        let target: DisposableEventTarget = DisposableEventTarget::new();
        let listener = {
            let log = log.clone();
            EventListener::callback(move |_: &Event| log.push("hit"))
        };
        target.register_listener("a", listener.clone(), ListenerFlags::PASSIVE);
        target.register_listener("b", listener, false);
        assert!(target.has_listeners("a"));

        target.dispose();
        assert!(target.is_disposed());
        assert!(!target.has_listeners("a"));
        assert!(!target.has_listeners("b"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_forgotten_listener_is_a_potential_leak() {
        let leaks = Rc::new(LeakTracker::with_window(Duration::ZERO));
        let tracker: Rc<dyn DisposableTracker> = leaks.clone();
        let target: DisposableEventTarget = DisposableEventTarget::new().tracked_by(&tracker);

        target.register_listener("a", EventListener::callback(|_: &Event| {}), false);
        let _forgotten = target.listen_fn("b", |_| {}, false);

        let kinds: Vec<_> = leaks
            .potential_leaks()
            .into_iter()
            .map(|leak| leak.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![DisposableEventTarget::<()>::KIND, DisposableFn::KIND]
        );
    }

    #[test]
    fn test_removed_listener_is_marked() {
        let recorder = RecordingTracker::new();
        let tracker: Rc<dyn DisposableTracker> = recorder.clone();
        let target: DisposableEventTarget = DisposableEventTarget::new().tracked_by(&tracker);

        target.listen_fn("a", |_| {}, true).dispose();
        assert_eq!(
            recorder.tracked_kinds(),
            vec![DisposableEventTarget::<()>::KIND, DisposableFn::KIND]
        );
        target.dispose();
        assert!(recorder.unmarked().is_empty());
    }

    #[test]
    #[should_panic(expected = "cannot register a disposable on itself")]
    fn test_register_self_panics() {
        let target: Rc<DisposableEventTarget> = Rc::new(DisposableEventTarget::new());
        target.register(target.clone());
    }
}
