//! # reclaim-core
//!
//! Core traits for the Reclaim resource-lifecycle and eventing kernel.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! components that only need to *speak* the disposal protocol, without
//! pulling in the stock stores, emitters, and event targets of `reclaim-std`.
//!
//! # Contracts
//!
//! ## [`Disposable`]
//!
//! The base interface every owned resource implements. Releasing a resource
//! is explicit and idempotent: the first `dispose()` releases, every later
//! call is a no-op.
//!
//! ## [`Reference`]
//!
//! A disposable handle onto a shared object. Disposing the handle gives up
//! this holder's claim; the object itself is released by whoever counts the
//! claims.
//!
//! ## [`DisposableTracker`]
//!
//! An optional diagnostics collaborator. Trackable types report their
//! creation and the moment they become owned (or disposed), so a tracker can
//! point at resources that nobody ever took responsibility for.
//!
//! # Error Types
//!
//! - [`OwnershipError`] - Ownership transfer errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod disposable;
mod error;
mod reference;
mod tracking;

// Re-exports
pub use disposable::{Disposable, DisposableNone, NONE, dispose_all, dispose_one};
pub use error::OwnershipError;
pub use reference::Reference;
pub use tracking::{DisposableTracker, TrackId, Tracking};
