//! # reclaim-std
//!
//! Standard implementations for the Reclaim lifecycle and eventing kernel.
//!
//! This crate provides:
//! - **Ownership**: [`DisposableStore`], [`MutableDisposable`], [`UnownedDisposable`]
//! - **Sharing**: [`ReferenceCollection`], [`ImmortalReference`]
//! - **Pub/sub**: [`EventEmitter`], [`DisposableEventEmitter`]
//! - **Dispatch**: [`EventTarget`], [`DisposableEventTarget`]
//! - **Diagnostics**: [`LeakTracker`]
//!
//! Everything here is single-threaded; handles are `Rc`-based and not `Send`.
//!
//! [`DisposableStore`]: lifecycle::DisposableStore
//! [`MutableDisposable`]: lifecycle::MutableDisposable
//! [`UnownedDisposable`]: lifecycle::UnownedDisposable
//! [`ReferenceCollection`]: lifecycle::ReferenceCollection
//! [`ImmortalReference`]: lifecycle::ImmortalReference
//! [`EventEmitter`]: emitter::EventEmitter
//! [`DisposableEventEmitter`]: emitter::DisposableEventEmitter
//! [`EventTarget`]: target::EventTarget
//! [`DisposableEventTarget`]: target::DisposableEventTarget
//! [`LeakTracker`]: tracking::LeakTracker

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use reclaim_core;

// Modules
pub mod emitter;
pub mod lifecycle;
pub mod target;
pub mod testing;
pub mod tracking;
