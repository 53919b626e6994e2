//! Events and listeners of the dispatch engine.

use super::EventTarget;
use std::{fmt, rc::Rc};

/// An event dispatched through an [`EventTarget`].
///
/// While a dispatch is running, [`target`](Self::target) and
/// [`current_target`](Self::current_target) point at the dispatching target;
/// outside of dispatch both are `None`.
pub struct Event<D = ()> {
    kind: String,
    detail: D,
    target: Option<EventTarget<D>>,
}

impl<D> Event<D> {
    /// Create an event of type `kind` carrying `detail`.
    pub fn new(kind: impl Into<String>, detail: D) -> Self {
        Self {
            kind: kind.into(),
            detail,
            target: None,
        }
    }

    /// The event type.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The event payload.
    pub fn detail(&self) -> &D {
        &self.detail
    }

    /// The target the event was dispatched to.
    pub fn target(&self) -> Option<&EventTarget<D>> {
        self.target.as_ref()
    }

    /// The target whose listeners are running. Always the dispatch target.
    pub fn current_target(&self) -> Option<&EventTarget<D>> {
        self.target.as_ref()
    }

    /// Consume the event, returning its payload.
    pub fn into_detail(self) -> D {
        self.detail
    }

    pub(super) fn set_target(&mut self, target: Option<EventTarget<D>>) {
        self.target = target;
    }
}

impl<D: Default> Event<D> {
    /// Create an event of type `kind` with a default payload.
    pub fn of(kind: impl Into<String>) -> Self {
        Self::new(kind, D::default())
    }
}

impl<D: fmt::Debug> fmt::Debug for Event<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("detail", &self.detail)
            .field("dispatching", &self.target.is_some())
            .finish()
    }
}

/// An object that handles events.
pub trait HandleEvent<D> {
    /// Called for each dispatched event the object is registered for.
    fn handle_event(&self, event: &Event<D>);
}

/// A registered listener: either a callback or a handler object.
///
/// Identity is the `Rc` allocation, so keep a clone of the listener to remove
/// it later.
pub enum EventListener<D> {
    /// A plain callback.
    Callback(Rc<dyn Fn(&Event<D>)>),
    /// An object implementing [`HandleEvent`].
    Object(Rc<dyn HandleEvent<D>>),
}

impl<D> EventListener<D> {
    /// Wrap a closure.
    pub fn callback(f: impl Fn(&Event<D>) + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }

    /// Wrap a handler object.
    pub fn object<H: HandleEvent<D> + 'static>(handler: Rc<H>) -> Self {
        Self::Object(handler)
    }

    /// Whether both listeners are the same allocation.
    pub fn same(&self, other: &Self) -> bool {
        std::ptr::eq(self.identity(), other.identity())
    }

    fn identity(&self) -> *const () {
        match self {
            Self::Callback(f) => Rc::as_ptr(f).cast::<()>(),
            Self::Object(h) => Rc::as_ptr(h).cast::<()>(),
        }
    }

    pub(super) fn invoke(&self, event: &Event<D>) {
        match self {
            Self::Callback(f) => f(event),
            Self::Object(h) => h.handle_event(event),
        }
    }
}

impl<D> Clone for EventListener<D> {
    fn clone(&self) -> Self {
        match self {
            Self::Callback(f) => Self::Callback(Rc::clone(f)),
            Self::Object(h) => Self::Object(Rc::clone(h)),
        }
    }
}

impl<D> fmt::Debug for EventListener<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("EventListener::Callback"),
            Self::Object(_) => f.write_str("EventListener::Object"),
        }
    }
}
