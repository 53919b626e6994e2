//! Error types for Reclaim.
//!
//! Only ownership transfer can fail recoverably. The other failure modes of
//! the kernel are either programming errors (registering a container on
//! itself panics) or degraded paths that log instead of failing (adding to a
//! disposed store).
//!
//! - [`OwnershipError`] - Errors from claiming an unowned disposable

use thiserror::Error;

/// Errors that can occur when claiming ownership of a disposable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipError {
    /// The value was already claimed, or released before anyone claimed it.
    #[error("this disposable has already been acquired")]
    AlreadyAcquired,
}
