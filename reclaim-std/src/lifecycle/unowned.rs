//! One-time ownership transfer.

use reclaim_core::{Disposable, DisposableTracker, OwnershipError, Tracking};
use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

/// A disposable that nobody owns yet.
///
/// Expresses that a function takes ownership of a parameter, or that a
/// caller must explicitly take ownership of a return value. Either somebody
/// claims the value with [`acquire`](Self::acquire), or disposing the wrapper
/// disposes the value.
pub struct UnownedDisposable<T: Disposable> {
    value: RefCell<Option<T>>,
    acquired: Cell<bool>,
    tracking: Option<Tracking>,
}

impl<T: Disposable> UnownedDisposable<T> {
    /// Kind reported to leak trackers.
    pub const KIND: &'static str = "UnownedDisposable";

    /// Wrap `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(Some(value)),
            acquired: Cell::new(false),
            tracking: None,
        }
    }

    /// Report this wrapper to `tracker`.
    pub fn tracked_by(mut self, tracker: &Rc<dyn DisposableTracker>) -> Self {
        self.tracking = Some(Tracking::new(Rc::clone(tracker), Self::KIND));
        self
    }

    /// Claim the value. The caller becomes its sole owner.
    ///
    /// Fails if the value was already claimed or the wrapper was disposed.
    pub fn acquire(&self) -> Result<T, OwnershipError> {
        if self.acquired.replace(true) {
            return Err(OwnershipError::AlreadyAcquired);
        }
        self.value
            .borrow_mut()
            .take()
            .ok_or(OwnershipError::AlreadyAcquired)
    }

    /// Whether the value has been claimed or released.
    pub fn is_acquired(&self) -> bool {
        self.acquired.get()
    }
}

impl<T: Disposable> Disposable for UnownedDisposable<T> {
    fn dispose(&self) {
        self.mark_tracked();
        if self.acquired.replace(true) {
            return;
        }
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

impl<T: Disposable> fmt::Debug for UnownedDisposable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnownedDisposable")
            .field("acquired", &self.is_acquired())
            .finish()
    }
}
