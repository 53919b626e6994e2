//! Reference handles onto shared objects.

use crate::disposable::Disposable;

/// A disposable claim on a shared object.
///
/// Disposing the reference gives up this holder's claim; whether that
/// releases the object depends on who else still holds one.
pub trait Reference<T: ?Sized>: Disposable {
    /// The referenced object.
    fn object(&self) -> &T;
}
