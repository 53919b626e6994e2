//! A single replaceable owned slot.

use reclaim_core::{Disposable, DisposableTracker, Tracking};
use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

/// Owns a disposable value that may be swapped out.
///
/// Whenever the value is replaced or cleared, the previous occupant is
/// disposed. Once the holder itself is disposed it reads as empty and rejects
/// new values.
pub struct MutableDisposable<T: Disposable + ?Sized> {
    value: RefCell<Option<Rc<T>>>,
    disposed: Cell<bool>,
    tracking: Option<Tracking>,
}

impl<T: Disposable + ?Sized> MutableDisposable<T> {
    /// Kind reported to leak trackers.
    pub const KIND: &'static str = "MutableDisposable";

    /// Create an empty holder.
    pub fn new() -> Self {
        Self {
            value: RefCell::new(None),
            disposed: Cell::new(false),
            tracking: None,
        }
    }

    /// Report this holder to `tracker`.
    pub fn tracked_by(mut self, tracker: &Rc<dyn DisposableTracker>) -> Self {
        self.tracking = Some(Tracking::new(Rc::clone(tracker), Self::KIND));
        self
    }

    /// The current value, or `None` once the holder is disposed.
    pub fn value(&self) -> Option<Rc<T>> {
        if self.disposed.get() {
            return None;
        }
        self.value.borrow().clone()
    }

    /// Replace the current value, disposing the previous one.
    ///
    /// Does nothing if the holder is disposed or `value` is the very same
    /// allocation as the current value.
    pub fn set_value(&self, value: Option<Rc<T>>) {
        if self.disposed.get() || self.holds(value.as_ref()) {
            return;
        }

        if let Some(value) = &value {
            value.mark_tracked();
        }
        let previous = self.value.borrow_mut().take();
        if let Some(previous) = previous {
            previous.dispose();
        }
        // The previous value's dispose may have disposed this holder.
        if self.disposed.get() {
            return;
        }
        let displaced = self.value.replace(value);
        if let Some(displaced) = displaced {
            displaced.dispose();
        }
    }

    /// Dispose and drop the current value.
    pub fn clear(&self) {
        self.set_value(None);
    }

    /// Detach the current value without disposing it.
    pub fn take(&self) -> Option<Rc<T>> {
        if self.disposed.get() {
            return None;
        }
        self.value.borrow_mut().take()
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    fn holds(&self, candidate: Option<&Rc<T>>) -> bool {
        match (self.value.borrow().as_ref(), candidate) {
            (Some(current), Some(candidate)) => {
                std::ptr::addr_eq(Rc::as_ptr(current), Rc::as_ptr(candidate))
            }
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Disposable + ?Sized> Default for MutableDisposable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Disposable + ?Sized> Disposable for MutableDisposable<T> {
    fn dispose(&self) {
        self.disposed.set(true);
        self.mark_tracked();
        let value = self.value.borrow_mut().take();
        if let Some(value) = value {
            value.dispose();
        }
    }

    fn mark_tracked(&self) {
        if let Some(tracking) = &self.tracking {
            tracking.mark();
        }
    }
}

impl<T: Disposable + ?Sized> fmt::Debug for MutableDisposable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableDisposable")
            .field("occupied", &self.value.borrow().is_some())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
