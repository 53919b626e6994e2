//! Ownership primitives built on the disposal protocol.
//!
//! - [`DisposableStore`]: owns any number of disposables
//! - [`MutableDisposable`]: owns one replaceable disposable
//! - [`UnownedDisposable`]: hands ownership to exactly one claimant
//! - [`ReferenceCollection`]: shares keyed objects among counted holders
//! - [`to_disposable`] / [`combined_disposable`]: ad hoc disposables

pub mod functional;
pub mod mutable;
pub mod reference;
pub mod store;
pub mod unowned;

pub use functional::{CombinedDisposable, DisposableFn, combined_disposable, to_disposable};
pub use mutable::MutableDisposable;
pub use reference::{
    CollectionReference, FnFactory, ImmortalReference, ReferenceCollection, ReferenceFactory,
};
pub use store::DisposableStore;
pub use unowned::UnownedDisposable;
