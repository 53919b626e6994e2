//! # Event Emitter
//!
//! A type-keyed publish/subscribe registry. Handlers subscribe to one event
//! type, or to every event through the wildcard list, and [`EventEmitter::emit`]
//! calls them synchronously.
//!
//! # Emission Order
//!
//! Handlers registered for the emitted type run first, in registration order,
//! followed by the wildcard handlers in registration order.
//!
//! # Re-entrancy
//!
//! Both lists are snapshotted when emission starts:
//! - a handler added *during* emission first fires on the next emission;
//! - a handler removed *during* emission still fires in the current one.
//!
//! Handlers may freely call `on`, `off`, and `emit` on the same emitter.

pub mod disposable;

pub use disposable::{DisposableEventEmitter, EventAccessor, WildcardAccessor};

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    hash::Hash,
    rc::{Rc, Weak},
};

/// A handler for one event type. Receives the payload, if any.
pub type Handler<P> = Rc<dyn Fn(Option<&P>)>;

/// A handler for every event type. Receives the type and the payload.
pub type WildcardHandler<K, P> = Rc<dyn Fn(&K, Option<&P>)>;

/// Build a [`Handler`] from a closure.
///
/// Keep a clone of the result to pass to [`EventEmitter::off`] later.
pub fn handler<P, F>(f: F) -> Handler<P>
where
    F: Fn(Option<&P>) + 'static,
{
    Rc::new(f)
}

/// Build a [`WildcardHandler`] from a closure.
pub fn wildcard<K, P, F>(f: F) -> WildcardHandler<K, P>
where
    F: Fn(&K, Option<&P>) + 'static,
{
    Rc::new(f)
}

fn same_handler<T: ?Sized>(a: &Rc<T>, b: &Rc<T>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

struct Registry<K, P> {
    handlers: HashMap<K, Vec<Handler<P>>>,
    wildcard: Vec<WildcardHandler<K, P>>,
}

/// A typed, synchronous event emitter.
///
/// `K` identifies event types and `P` is the payload type. The emitter is a
/// cheap handle: clones share the same registry.
///
/// Registering the same handler twice is allowed; both registrations fire.
pub struct EventEmitter<K, P> {
    registry: Rc<RefCell<Registry<K, P>>>,
}

impl<K, P> EventEmitter<K, P>
where
    K: Eq + Hash,
{
    /// Create an emitter with no handlers.
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                handlers: HashMap::new(),
                wildcard: Vec::new(),
            })),
        }
    }

    /// Subscribe `handler` to events of type `ty`.
    pub fn on(&self, ty: K, handler: Handler<P>) {
        self.registry
            .borrow_mut()
            .handlers
            .entry(ty)
            .or_default()
            .push(handler);
    }

    /// Subscribe `handler` to every event.
    pub fn on_any(&self, handler: WildcardHandler<K, P>) {
        self.registry.borrow_mut().wildcard.push(handler);
    }

    /// Remove the first registration of `handler` for `ty`.
    ///
    /// Does nothing if it is not registered.
    pub fn off(&self, ty: &K, handler: &Handler<P>) {
        let mut registry = self.registry.borrow_mut();
        let Some(handlers) = registry.handlers.get_mut(ty) else {
            return;
        };
        if let Some(index) = handlers.iter().position(|h| same_handler(h, handler)) {
            handlers.remove(index);
        }
        if handlers.is_empty() {
            registry.handlers.remove(ty);
        }
    }

    /// Remove the first registration of a wildcard `handler`.
    pub fn off_any(&self, handler: &WildcardHandler<K, P>) {
        let mut registry = self.registry.borrow_mut();
        if let Some(index) = registry
            .wildcard
            .iter()
            .position(|h| same_handler(h, handler))
        {
            registry.wildcard.remove(index);
        }
    }

    /// Emit an event of type `ty`, with an optional payload.
    pub fn emit(&self, ty: &K, payload: Option<&P>) {
        let (handlers, wildcard) = {
            let registry = self.registry.borrow();
            (
                registry.handlers.get(ty).cloned().unwrap_or_default(),
                registry.wildcard.clone(),
            )
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            handlers = handlers.len(),
            wildcard = wildcard.len(),
            "emitting event"
        );

        for handler in &handlers {
            handler(payload);
        }
        for handler in &wildcard {
            handler(ty, payload);
        }
    }

    /// Number of handlers registered for `ty`.
    pub fn listener_count(&self, ty: &K) -> usize {
        self.registry
            .borrow()
            .handlers
            .get(ty)
            .map_or(0, Vec::len)
    }

    /// Number of wildcard handlers.
    pub fn wildcard_count(&self) -> usize {
        self.registry.borrow().wildcard.len()
    }

    /// Remove every handler.
    pub fn clear(&self) {
        let mut registry = self.registry.borrow_mut();
        registry.handlers.clear();
        registry.wildcard.clear();
    }

    /// A weak handle that does not keep the registry alive.
    pub fn downgrade(&self) -> WeakEventEmitter<K, P> {
        WeakEventEmitter {
            registry: Rc::downgrade(&self.registry),
        }
    }
}

impl<K, P> Clone for EventEmitter<K, P> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<K: Eq + Hash, P> Default for EventEmitter<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> fmt::Debug for EventEmitter<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventEmitter")
            .field("types", &registry.handlers.len())
            .field("wildcard", &registry.wildcard.len())
            .finish()
    }
}

/// A non-owning handle to an [`EventEmitter`].
pub struct WeakEventEmitter<K, P> {
    registry: Weak<RefCell<Registry<K, P>>>,
}

impl<K, P> WeakEventEmitter<K, P> {
    /// The emitter, if it is still alive.
    pub fn upgrade(&self) -> Option<EventEmitter<K, P>> {
        self.registry
            .upgrade()
            .map(|registry| EventEmitter { registry })
    }
}

impl<K, P> Clone for WeakEventEmitter<K, P> {
    fn clone(&self) -> Self {
        Self {
            registry: Weak::clone(&self.registry),
        }
    }
}

impl<K, P> fmt::Debug for WeakEventEmitter<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventEmitter")
            .field("alive", &(self.registry.strong_count() > 0))
            .finish()
    }
}
