//! # reclaim - Resource Lifecycle and Eventing Kernel
//!
//! `reclaim` makes releasing resources explicit. Anything that holds on to
//! something (a subscription, a listener registration, a cached object)
//! implements [`Disposable`], and containers like [`DisposableStore`] take
//! ownership of those handles so a whole subtree can be released with a
//! single `dispose()`.
//!
//! On top of the protocol sit two notification mechanisms whose
//! registrations are themselves disposables:
//! - [`EventEmitter`] / [`DisposableEventEmitter`]: type-keyed pub/sub with
//!   wildcard handlers
//! - [`EventTarget`] / [`DisposableEventTarget`]: listener dispatch with
//!   deduplication, capture-aware identity, and one-shot listeners
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reclaim::prelude::*;
//!
//! let emitter: DisposableEventEmitter<&str, String> = DisposableEventEmitter::new();
//! let store = DisposableStore::new();
//! store.add(emitter.events("message").subscribe(|payload| println!("{payload:?}")));
//!
//! emitter.emit(&"message", Some(&"hello".to_owned()));
//! store.dispose(); // unsubscribes
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use reclaim_core::{
    // Protocol
    Disposable,
    DisposableNone,
    // Diagnostics
    DisposableTracker,
    NONE,
    // Errors
    OwnershipError,
    Reference,
    TrackId,
    Tracking,
    dispose_all,
    dispose_one,
};

// Ownership
pub use reclaim_std::lifecycle::{
    CollectionReference, CombinedDisposable, DisposableFn, DisposableStore, FnFactory,
    ImmortalReference, MutableDisposable, ReferenceCollection, ReferenceFactory,
    UnownedDisposable, combined_disposable, to_disposable,
};

// Eventing
pub use reclaim_std::{
    emitter::{DisposableEventEmitter, EventEmitter},
    target::{
        DisposableEventTarget, Event, EventListener, EventTarget, HandleEvent, ListenerFlags,
        ListenerOptions,
    },
    tracking::LeakTracker,
};

#[cfg(feature = "macros")]
pub use reclaim_macros::Disposable;

/// Ownership primitives.
pub mod lifecycle {
    #![allow(clippy::wildcard_imports)]
    pub use reclaim_std::lifecycle::*;
}

/// Type-keyed event emitters.
pub mod emitter {
    #![allow(clippy::wildcard_imports)]
    pub use reclaim_std::emitter::*;
}

/// Listener dispatch engine.
pub mod target {
    #![allow(clippy::wildcard_imports)]
    pub use reclaim_std::target::*;
}

/// Leak diagnostics.
pub mod tracking {
    #![allow(clippy::wildcard_imports)]
    pub use reclaim_std::tracking::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use reclaim_std::testing::*;
}

/// Prelude module - common imports for Reclaim.
///
/// # Usage
///
/// ```rust,ignore
/// use reclaim::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Eventing
        DisposableEventEmitter,
        DisposableEventTarget,
        // Ownership
        DisposableStore,
        Event,
        EventEmitter,
        EventListener,
        EventTarget,
        ListenerFlags,
        MutableDisposable,
        ReferenceCollection,
        UnownedDisposable,
        to_disposable,
    };

    // Protocol
    pub use crate::{Disposable, Reference};
}
