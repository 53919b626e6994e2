//! `#[derive(Disposable)]`.
//!
//! Implements `Disposable` for a struct by disposing every field marked
//! `#[dispose]`, in declaration order. Unmarked fields are left alone.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Index, parse_macro_input};

/// Implementation of the `Disposable` derive macro.
pub fn derive_disposable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                "Disposable can only be derived for structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "Disposable can only be derived for structs",
            ));
        }
    };

    let accessors: Vec<TokenStream2> = match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter(|field| is_marked(&field.attrs))
            .filter_map(|field| field.ident.as_ref())
            .map(|ident| quote! { #ident })
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .filter(|(_, field)| is_marked(&field.attrs))
            .map(|(i, _)| {
                let index = Index::from(i);
                quote! { #index }
            })
            .collect(),
        Fields::Unit => {
            return Err(syn::Error::new_spanned(
                name,
                "Disposable cannot be derived for unit structs; there is nothing to dispose",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::reclaim::Disposable for #name #ty_generics #where_clause {
            fn dispose(&self) {
                #( ::reclaim::Disposable::dispose(&self.#accessors); )*
            }
        }
    })
}

fn is_marked(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("dispose"))
}
