//! # The Disposal Protocol
//!
//! [`Disposable`] is the one contract the rest of the kernel is built on.
//! Stores, holders, reference handles, and event subscriptions all implement
//! it, which is what lets them nest: a store may own a holder that owns a
//! subscription.
//!
//! Implementations take `&self` and rely on interior mutability, so a
//! disposable can be shared (usually behind an `Rc`) between the owner that
//! will eventually release it and the code that merely uses it.

use std::rc::Rc;

/// A resource requiring explicit release.
///
/// `dispose` must be idempotent: the first call releases the resource and
/// every later call is a no-op.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not `Disposable`",
    label = "missing `Disposable` implementation",
    note = "Implement `dispose(&self)` or wrap a closure with `to_disposable`."
)]
pub trait Disposable {
    /// Release the resource.
    fn dispose(&self);

    /// Notify an attached leak tracker that this value now has an owner.
    ///
    /// Owners call this when they take responsibility for a disposable; the
    /// default does nothing.
    fn mark_tracked(&self) {}
}

impl<T: Disposable + ?Sized> Disposable for &T {
    fn dispose(&self) {
        (**self).dispose();
    }

    fn mark_tracked(&self) {
        (**self).mark_tracked();
    }
}

impl<T: Disposable + ?Sized> Disposable for Rc<T> {
    fn dispose(&self) {
        (**self).dispose();
    }

    fn mark_tracked(&self) {
        (**self).mark_tracked();
    }
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
    fn dispose(&self) {
        (**self).dispose();
    }

    fn mark_tracked(&self) {
        (**self).mark_tracked();
    }
}

impl<T: Disposable> Disposable for Option<T> {
    fn dispose(&self) {
        if let Some(inner) = self {
            inner.dispose();
        }
    }

    fn mark_tracked(&self) {
        if let Some(inner) = self {
            inner.mark_tracked();
        }
    }
}

impl<T: Disposable> Disposable for [T] {
    fn dispose(&self) {
        for item in self {
            item.dispose();
        }
    }

    fn mark_tracked(&self) {
        for item in self {
            item.mark_tracked();
        }
    }
}

impl<T: Disposable> Disposable for Vec<T> {
    fn dispose(&self) {
        self.as_slice().dispose();
    }

    fn mark_tracked(&self) {
        self.as_slice().mark_tracked();
    }
}

/// Dispose a single item, marking it tracked first.
///
/// Returns the item so the call can sit in an expression.
pub fn dispose_one<D: Disposable + ?Sized>(item: &D) -> &D {
    item.mark_tracked();
    item.dispose();
    item
}

/// Dispose every item of a collection in iteration order.
///
/// `None` entries are skipped when the items are `Option`s.
pub fn dispose_all<I>(items: I)
where
    I: IntoIterator,
    I::Item: Disposable,
{
    for item in items {
        dispose_one(&item);
    }
}

/// A disposable whose release does nothing.
///
/// Useful as a placeholder where an API demands a disposable but there is
/// nothing to release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisposableNone;

impl Disposable for DisposableNone {
    fn dispose(&self) {}
}

/// The shared no-op disposable.
pub const NONE: DisposableNone = DisposableNone;
