//! # Disposable Event Emitter
//!
//! An [`EventEmitter`] whose subscriptions are disposables.
//!
//! [`DisposableEventEmitter::events`] hands out one [`EventAccessor`] per
//! event type, built on first use and memoized. Subscribing through an
//! accessor returns a disposable that unsubscribes exactly that registration.
//!
//! The emitter also owns a store. Subscriptions made with
//! [`register_event`](DisposableEventEmitter::register_event) are tracked in
//! it and released when the emitter is disposed; subscriptions made directly
//! through an accessor belong to the caller.

use super::{EventEmitter, Handler, WeakEventEmitter, WildcardHandler};
use crate::lifecycle::{
    DisposableFn, DisposableStore, functional::tracked_disposable, to_disposable,
};
use reclaim_core::{Disposable, DisposableTracker, Tracking};
use std::{
    cell::{OnceCell, RefCell},
    collections::HashMap,
    fmt,
    hash::Hash,
    ops::Deref,
    rc::Rc,
};

/// Subscribes handlers to one event type.
pub struct EventAccessor<K, P> {
    ty: K,
    emitter: WeakEventEmitter<K, P>,
    tracker: Option<Rc<dyn DisposableTracker>>,
}

impl<K, P> EventAccessor<K, P>
where
    K: Eq + Hash + Clone + 'static,
    P: 'static,
{
    /// The event type this accessor subscribes to.
    pub fn event_type(&self) -> &K {
        &self.ty
    }

    /// Subscribe `f`; dispose the result to unsubscribe.
    ///
    /// Nothing is bound: a closure captures whatever context it needs. Use
    /// [`subscribe_with`](Self::subscribe_with) to bind an explicit value or
    /// [`subscribe_with_emitter`](Self::subscribe_with_emitter) to receive
    /// the emitter itself.
    pub fn subscribe<F>(&self, f: F) -> Rc<DisposableFn>
    where
        F: Fn(Option<&P>) + 'static,
    {
        self.subscribe_handler(Rc::new(f))
    }

    /// Subscribe `f`, passing it the emitter on every call.
    ///
    /// The handler holds the emitter weakly, so the subscription does not
    /// keep the registry alive.
    pub fn subscribe_with_emitter<F>(&self, f: F) -> Rc<DisposableFn>
    where
        F: Fn(&EventEmitter<K, P>, Option<&P>) + 'static,
    {
        let emitter = self.emitter.clone();
        self.subscribe(move |payload| {
            if let Some(emitter) = emitter.upgrade() {
                f(&emitter, payload);
            }
        })
    }

    /// Subscribe `f` bound to `this`, which is passed to every call.
    pub fn subscribe_with<T, F>(&self, this: T, f: F) -> Rc<DisposableFn>
    where
        T: 'static,
        F: Fn(&T, Option<&P>) + 'static,
    {
        self.subscribe(move |payload| f(&this, payload))
    }

    /// Subscribe an existing handler.
    pub fn subscribe_handler(&self, handler: Handler<P>) -> Rc<DisposableFn> {
        let Some(emitter) = self.emitter.upgrade() else {
            return to_disposable(|| {});
        };
        emitter.on(self.ty.clone(), Rc::clone(&handler));

        let weak = emitter.downgrade();
        let ty = self.ty.clone();
        tracked_disposable(self.tracker.as_ref(), move || {
            if let Some(emitter) = weak.upgrade() {
                emitter.off(&ty, &handler);
            }
        })
    }
}

impl<K: fmt::Debug, P> fmt::Debug for EventAccessor<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventAccessor")
            .field("ty", &self.ty)
            .finish()
    }
}

/// Subscribes handlers to every event.
pub struct WildcardAccessor<K, P> {
    emitter: WeakEventEmitter<K, P>,
    tracker: Option<Rc<dyn DisposableTracker>>,
}

impl<K, P> WildcardAccessor<K, P>
where
    K: Eq + Hash + 'static,
    P: 'static,
{
    /// Subscribe `f` to every event; dispose the result to unsubscribe.
    pub fn subscribe<F>(&self, f: F) -> Rc<DisposableFn>
    where
        F: Fn(&K, Option<&P>) + 'static,
    {
        self.subscribe_handler(Rc::new(f))
    }

    /// Subscribe `f` bound to `this`, which is passed to every call.
    pub fn subscribe_with<T, F>(&self, this: T, f: F) -> Rc<DisposableFn>
    where
        T: 'static,
        F: Fn(&T, &K, Option<&P>) + 'static,
    {
        self.subscribe(move |ty, payload| f(&this, ty, payload))
    }

    /// Subscribe an existing wildcard handler.
    pub fn subscribe_handler(&self, handler: WildcardHandler<K, P>) -> Rc<DisposableFn> {
        let Some(emitter) = self.emitter.upgrade() else {
            return to_disposable(|| {});
        };
        emitter.on_any(Rc::clone(&handler));

        let weak = emitter.downgrade();
        tracked_disposable(self.tracker.as_ref(), move || {
            if let Some(emitter) = weak.upgrade() {
                emitter.off_any(&handler);
            }
        })
    }
}

impl<K, P> fmt::Debug for WildcardAccessor<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WildcardAccessor").finish_non_exhaustive()
    }
}

/// An [`EventEmitter`] with disposable subscriptions.
///
/// Dereferences to the underlying emitter for `on`, `off`, and `emit`.
pub struct DisposableEventEmitter<K, P> {
    emitter: EventEmitter<K, P>,
    accessors: RefCell<HashMap<K, Rc<EventAccessor<K, P>>>>,
    wildcard: OnceCell<Rc<WildcardAccessor<K, P>>>,
    store: DisposableStore,
    tracking: Option<Tracking>,
}

impl<K, P> DisposableEventEmitter<K, P>
where
    K: Eq + Hash + Clone + 'static,
    P: 'static,
{
    /// Kind reported to leak trackers.
    pub const KIND: &'static str = "DisposableEventEmitter";

    /// Create an emitter with no handlers.
    pub fn new() -> Self {
        Self {
            emitter: EventEmitter::new(),
            accessors: RefCell::new(HashMap::new()),
            wildcard: OnceCell::new(),
            store: DisposableStore::new(),
            tracking: None,
        }
    }

    /// Report this emitter to `tracker`.
    pub fn tracked_by(mut self, tracker: &Rc<dyn DisposableTracker>) -> Self {
        self.tracking = Some(Tracking::new(Rc::clone(tracker), Self::KIND));
        self
    }

    fn tracker(&self) -> Option<Rc<dyn DisposableTracker>> {
        self.tracking
            .as_ref()
            .map(|tracking| Rc::clone(tracking.tracker()))
    }

    /// The accessor for `ty`, built on first use.
    ///
    /// Subscriptions made through it are reported to this emitter's tracker.
    ///
    /// Every call with an equal key returns the same accessor.
    pub fn events(&self, ty: K) -> Rc<EventAccessor<K, P>> {
        let mut accessors = self.accessors.borrow_mut();
        let accessor = accessors.entry(ty.clone()).or_insert_with(|| {
            Rc::new(EventAccessor {
                ty,
                emitter: self.emitter.downgrade(),
                tracker: self.tracker(),
            })
        });
        Rc::clone(accessor)
    }

    /// The wildcard accessor, built on first use.
    pub fn wildcard_events(&self) -> Rc<WildcardAccessor<K, P>> {
        let accessor = self.wildcard.get_or_init(|| {
            Rc::new(WildcardAccessor {
                emitter: self.emitter.downgrade(),
                tracker: self.tracker(),
            })
        });
        Rc::clone(accessor)
    }

    /// Subscribe `f` to `ty` for as long as this emitter lives.
    pub fn register_event<F>(&self, ty: K, f: F) -> Rc<DisposableFn>
    where
        F: Fn(Option<&P>) + 'static,
    {
        self.store.add(self.events(ty).subscribe(f))
    }

    /// Subscribe `f` to every event for as long as this emitter lives.
    pub fn register_any<F>(&self, f: F) -> Rc<DisposableFn>
    where
        F: Fn(&K, Option<&P>) + 'static,
    {
        self.store.add(self.wildcard_events().subscribe(f))
    }

    /// Release `item` together with this emitter.
    ///
    /// # Panics
    ///
    /// Panics if `item` is this emitter.
    pub fn register<D: Disposable + ?Sized + 'static>(&self, item: Rc<D>) -> Rc<D> {
        if std::ptr::eq(
            Rc::as_ptr(&item).cast::<()>(),
            (self as *const Self).cast::<()>(),
        ) {
            panic!("cannot register a disposable on itself");
        }
        self.store.add(item)
    }

    /// The underlying emitter.
    pub fn emitter(&self) -> &EventEmitter<K, P> {
        &self.emitter
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.store.is_disposed()
    }
}

impl<K, P> Default for DisposableEventEmitter<K, P>
where
    K: Eq + Hash + Clone + 'static,
    P: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> Deref for DisposableEventEmitter<K, P> {
    type Target = EventEmitter<K, P>;

    fn deref(&self) -> &Self::Target {
        &self.emitter
    }
}

impl<K, P> Disposable for DisposableEventEmitter<K, P> {
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

impl<K, P> fmt::Debug for DisposableEventEmitter<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposableEventEmitter")
            .field("emitter", &self.emitter)
            .field("store", &self.store)
            .finish()
    }
}
