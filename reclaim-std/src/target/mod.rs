//! # Listener Dispatch Engine
//!
//! [`EventTarget`] emulates platform event-target semantics for code that
//! has no host-provided implementation.
//!
//! # Registration
//!
//! A registration is identified by the listener's `Rc` allocation together
//! with the effective capture flag of its options. Adding a listener whose
//! identity is already registered for the event type does nothing.
//!
//! # Dispatch
//!
//! Dispatch walks a snapshot of the listeners registered for the event type,
//! in registration order:
//! - a listener removed earlier in the same dispatch is skipped;
//! - a one-shot listener is removed *before* it runs, so re-dispatching the
//!   same type from inside it does not invoke it again;
//! - listeners added during dispatch first run on the next dispatch.

pub mod disposable;
pub mod event;
pub mod options;

pub use disposable::DisposableEventTarget;
pub use event::{Event, EventListener, HandleEvent};
pub use options::{ListenerFlags, ListenerOptions};

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

/// One registration on an [`EventTarget`].
pub struct ListenerEntry<D> {
    target: WeakEventTarget<D>,
    listener: EventListener<D>,
    options: ListenerOptions,
    removed: Cell<bool>,
}

impl<D> ListenerEntry<D> {
    /// The target this entry is registered on, if it is still alive.
    pub fn target(&self) -> Option<EventTarget<D>> {
        self.target.upgrade()
    }

    /// The registered listener.
    pub fn listener(&self) -> &EventListener<D> {
        &self.listener
    }

    /// The options the listener was registered with.
    pub fn options(&self) -> ListenerOptions {
        self.options
    }

    fn matches(&self, listener: &EventListener<D>, options: &ListenerOptions) -> bool {
        self.listener.same(listener) && self.options.is_equivalent(options)
    }
}

impl<D> fmt::Debug for ListenerEntry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("listener", &self.listener)
            .field("options", &self.options)
            .finish()
    }
}

type Listeners<D> = HashMap<String, Vec<Rc<ListenerEntry<D>>>>;

/// A registry of listeners keyed by event type.
///
/// The target is a cheap handle: clones share the same registry.
pub struct EventTarget<D = ()> {
    listeners: Rc<RefCell<Listeners<D>>>,
}

impl<D> EventTarget<D> {
    /// Create a target with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Register `listener` for events of type `kind`.
    ///
    /// Does nothing if the same listener is already registered for `kind`
    /// with equivalent options.
    pub fn add_listener(
        &self,
        kind: &str,
        listener: EventListener<D>,
        options: impl Into<ListenerOptions>,
    ) {
        let options = options.into();
        let mut listeners = self.listeners.borrow_mut();
        let entries = listeners.entry(kind.to_owned()).or_default();
        if entries.iter().any(|entry| entry.matches(&listener, &options)) {
            return;
        }
        entries.push(Rc::new(ListenerEntry {
            target: self.downgrade(),
            listener,
            options,
            removed: Cell::new(false),
        }));
    }

    /// Remove the registration of `listener` for `kind` with equivalent
    /// options. Does nothing if there is none.
    pub fn remove_listener(
        &self,
        kind: &str,
        listener: &EventListener<D>,
        options: impl Into<ListenerOptions>,
    ) {
        let options = options.into();
        self.detach(kind, |entry| entry.matches(listener, &options));
    }

    fn detach(&self, kind: &str, predicate: impl Fn(&ListenerEntry<D>) -> bool) {
        let mut listeners = self.listeners.borrow_mut();
        let Some(entries) = listeners.get_mut(kind) else {
            return;
        };
        if let Some(index) = entries.iter().position(|entry| predicate(entry.as_ref())) {
            entries.remove(index).removed.set(true);
        }
        if entries.is_empty() {
            listeners.remove(kind);
        }
    }

    /// Dispatch `event` to the listeners registered for its type.
    ///
    /// Returns `false` when no listener was registered for the type.
    pub fn dispatch(&self, event: &mut Event<D>) -> bool {
        let snapshot = match self.listeners.borrow().get(event.kind()) {
            Some(entries) if !entries.is_empty() => entries.clone(),
            _ => return false,
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(kind = %event.kind(), listeners = snapshot.len(), "dispatching event");

        event.set_target(Some(self.clone()));
        for entry in &snapshot {
            if entry.removed.get() {
                continue;
            }
            if entry.options.once() {
                self.detach(event.kind(), |candidate| std::ptr::eq(candidate, &**entry));
            }
            entry.listener.invoke(event);
        }
        event.set_target(None);
        true
    }

    /// Whether any listener is registered for `kind`.
    pub fn has_listeners(&self, kind: &str) -> bool {
        self.listener_count(kind) > 0
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: &str) -> usize {
        self.listeners.borrow().get(kind).map_or(0, Vec::len)
    }

    /// A weak handle that does not keep the registry alive.
    pub fn downgrade(&self) -> WeakEventTarget<D> {
        WeakEventTarget {
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Whether both handles share the same registry.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.listeners, &other.listeners)
    }
}

impl<D> Clone for EventTarget<D> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<D> Default for EventTarget<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for EventTarget<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("types", &self.listeners.borrow().len())
            .finish()
    }
}

/// A non-owning handle to an [`EventTarget`].
pub struct WeakEventTarget<D> {
    listeners: Weak<RefCell<Listeners<D>>>,
}

impl<D> WeakEventTarget<D> {
    /// The target, if it is still alive.
    pub fn upgrade(&self) -> Option<EventTarget<D>> {
        self.listeners
            .upgrade()
            .map(|listeners| EventTarget { listeners })
    }
}

impl<D> Clone for WeakEventTarget<D> {
    fn clone(&self) -> Self {
        Self {
            listeners: Weak::clone(&self.listeners),
        }
    }
}

impl<D> fmt::Debug for WeakEventTarget<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventTarget")
            .field("alive", &(self.listeners.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CallLog;

    fn logging(log: &CallLog, name: &'static str) -> EventListener<()> {
        let log = log.clone();
        EventListener::callback(move |event: &Event<()>| log.push(format!("{name}:{}", event.kind())))
    }

    #[test]
    fn test_duplicate_registration_is_noop() {
        let log = CallLog::new();
        let target = EventTarget::new();
        let f = logging(&log, "f");
        target.add_listener("click", f.clone(), false);
        target.add_listener("click", f.clone(), ListenerFlags::PASSIVE);
        assert_eq!(target.listener_count("click"), 1);

        assert!(target.dispatch(&mut Event::of("click")));
        assert_eq!(log.entries(), vec!["f:click"]);
    }

    #[test]
    fn test_capture_is_part_of_identity() {
        let target: EventTarget = EventTarget::new();
        let f = logging(&CallLog::new(), "f");
        target.add_listener("click", f.clone(), false);
        target.add_listener("click", f.clone(), true);
        assert_eq!(target.listener_count("click"), 2);

        target.remove_listener("click", &f, ListenerFlags::CAPTURE);
        assert_eq!(target.listener_count("click"), 1);
        target.remove_listener("click", &f, ListenerOptions::default());
        target.remove_listener("click", &f, false);
        assert!(!target.has_listeners("click"));
    }

    #[test]
    fn test_no_listeners_is_not_handled() {
        let target: EventTarget = EventTarget::new();
        assert!(!target.dispatch(&mut Event::of("missing")));
    }

    #[test]
    fn test_target_set_only_during_dispatch() {
        let target: EventTarget = EventTarget::new();
        let seen = Rc::new(Cell::new(false));
        let listener = {
            let target = target.downgrade();
            let seen = seen.clone();
            EventListener::callback(move |event: &Event| {
                let target = target.upgrade().unwrap();
                seen.set(
                    event.target().is_some_and(|t| t.ptr_eq(&target))
                        && event.current_target().is_some_and(|t| t.ptr_eq(&target)),
                );
            })
        };
        target.add_listener("ping", listener, false);

        let mut event = Event::of("ping");
        assert!(event.target().is_none());
        target.dispatch(&mut event);
        assert!(seen.get());
        assert!(event.target().is_none());
        assert!(event.current_target().is_none());
    }

    #[test]
    fn test_once_removed_before_invocation() {
        let log = CallLog::new();
        let target: EventTarget = EventTarget::new();
        let listener = {
            let log = log.clone();
            let weak = target.downgrade();
            EventListener::callback(move |_: &Event| {
                log.push("once");
                // Re-dispatching from inside must not reach this listener again.
                if let Some(target) = weak.upgrade() {
                    log.push(format!("nested handled: {}", target.dispatch(&mut Event::of("x"))));
                }
            })
        };
        target.add_listener("x", listener, ListenerFlags::ONCE);

        assert!(target.dispatch(&mut Event::of("x")));
        assert!(!target.dispatch(&mut Event::of("x")));
        assert_eq!(log.entries(), vec!["once", "nested handled: false"]);
    }

    #[test]
    fn test_once_with_capture_is_removed() {
        let log = CallLog::new();
        let target: EventTarget = EventTarget::new();
        target.add_listener(
            "x",
            logging(&log, "capture once"),
            ListenerFlags::ONCE | ListenerFlags::CAPTURE,
        );
        target.dispatch(&mut Event::of("x"));
        target.dispatch(&mut Event::of("x"));
        assert_eq!(log.entries(), vec!["capture once:x"]);
    }

    #[test]
    fn test_once_does_not_skip_next_listener() {
        let log = CallLog::new();
        let target: EventTarget = EventTarget::new();
        target.add_listener("x", logging(&log, "a"), ListenerFlags::ONCE);
        target.add_listener("x", logging(&log, "b"), false);

        target.dispatch(&mut Event::of("x"));
        target.dispatch(&mut Event::of("x"));
        assert_eq!(log.entries(), vec!["a:x", "b:x", "b:x"]);
    }

    #[test]
    fn test_listener_removed_mid_dispatch_is_skipped() {
        let log = CallLog::new();
        let target: EventTarget = EventTarget::new();
        let victim = logging(&log, "victim");
        let remover = {
            let weak = target.downgrade();
            let victim = victim.clone();
            let log = log.clone();
            EventListener::callback(move |event: &Event| {
                log.push("remover");
                if let Some(target) = weak.upgrade() {
                    target.remove_listener(event.kind(), &victim, false);
                }
            })
        };
        target.add_listener("x", remover, false);
        target.add_listener("x", victim, false);

        target.dispatch(&mut Event::of("x"));
        assert_eq!(log.entries(), vec!["remover"]);
        assert_eq!(target.listener_count("x"), 1);
    }

    struct Counter {
        hits: Cell<usize>,
    }

    impl HandleEvent<u32> for Counter {
        fn handle_event(&self, event: &Event<u32>) {
            self.hits.set(self.hits.get() + *event.detail() as usize);
        }
    }

    #[test]
    fn test_handler_object() {
        let target = EventTarget::new();
        let counter = Rc::new(Counter { hits: Cell::new(0) });
        let listener = EventListener::object(counter.clone());
        target.add_listener("add", listener.clone(), false);
        target.add_listener("add", EventListener::object(counter.clone()), false);
        assert_eq!(target.listener_count("add"), 1);

        target.dispatch(&mut Event::new("add", 5));
        target.dispatch(&mut Event::new("add", 2));
        assert_eq!(counter.hits.get(), 7);

        let entry_target = target.listeners.borrow()["add"][0].target().unwrap();
        assert!(entry_target.ptr_eq(&target));
    }
}
