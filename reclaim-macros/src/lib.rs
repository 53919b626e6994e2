//! Procedural macros for Reclaim.
//!
//! Use these through the `reclaim` facade; the generated code refers to
//! `::reclaim` paths.

use proc_macro::TokenStream;

mod disposable;

/// Derive macro for implementing `Disposable` on a composite struct.
///
/// Every field marked `#[dispose]` is disposed in declaration order.
///
/// ```rust,ignore
/// #[derive(Disposable)]
/// struct View {
///     #[dispose]
///     store: DisposableStore,
///     #[dispose]
///     selection: MutableDisposable<DisposableFn>,
///     title: String,
/// }
/// ```
#[proc_macro_derive(Disposable, attributes(dispose))]
pub fn derive_disposable(input: TokenStream) -> TokenStream {
    disposable::derive_disposable_impl(input)
}
