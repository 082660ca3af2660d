//! Derive macro for `disclosure`.
//!
//! This crate generates the table-building code behind
//! `#[derive(SettingsLayout)]`. It:
//! - reads `#[setting(...)]` field attributes
//! - emits a `SettingsLayout` implementation that records one classification
//!   per annotated field and descends into nested settings structs
//!
//! It does **not** define classifications or the disclosure rules. Those live
//! in the main `disclosure` crate and are applied at runtime.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod container;
mod derive_struct;
mod generics;
mod strategy;
mod types;
use container::parse_container_options;
use derive_struct::derive_struct;
use generics::add_layout_bounds;

/// Derives `disclosure::SettingsLayout` for structs with named fields.
///
/// Each field maps to the key of the same name in the configuration tree.
///
/// # Container Attributes
///
/// - `#[setting(camel_case)]` - Use camelCase keys (`api_keys` becomes
///   `apiKeys`), matching trees produced by camelCase serializers.
///
/// # Field Attributes
///
/// - **No annotation**: The field is not classified and falls back to the
///   table's default rule.
///
/// - `#[setting]`: The field is a nested settings struct. Its own layout is
///   recorded under the field's key. The type must implement `SettingsLayout`;
///   scalars are rejected.
///
/// - `#[setting(Classification)]`: The field, and everything under it, is
///   classified with the marker's rule (e.g. `#[setting(Secret)]`).
///
/// - `rename = "key"` may be added to either form to override the key, e.g.
///   `#[setting(Token, rename = "apiKey")]` or `#[setting(walk, rename = "smtp")]`.
///
/// Enums, tuple structs, and unions are rejected at compile time.
#[proc_macro_derive(SettingsLayout, attributes(setting))]
pub fn derive_settings_layout(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the disclosure crate root.
///
/// Handles crate renaming (e.g., `settings = { package = "disclosure", ... }`)
/// and internal usage (when derive is used inside the disclosure crate itself).
fn crate_root() -> TokenStream {
    match crate_name("disclosure") {
        Ok(FoundCrate::Itself) => quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Err(_) => quote! { ::disclosure },
    }
}

fn crate_path(item: &str) -> TokenStream {
    let root = crate_root();
    let item_ident = format_ident!("{}", item);
    quote! { #root::#item_ident }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let options = parse_container_options(&attrs)?;

    let output = match data {
        Data::Struct(data) => derive_struct(data, &generics, &options)?,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "`SettingsLayout` cannot be derived for enums; a settings section is a struct",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "`SettingsLayout` cannot be derived for unions",
            ));
        }
    };

    let layout_path = crate_path("SettingsLayout");
    let field_path = crate_path("FieldPath");
    let table_path = crate_path("ClassificationTable");
    let layout_generics = add_layout_bounds(generics, &output.walked_generics);
    let (impl_generics, ty_generics, where_clause) = layout_generics.split_for_impl();
    let statements = &output.statements;

    Ok(quote! {
        impl #impl_generics #layout_path for #ident #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn classify_into(prefix: &#field_path, table: &mut #table_path) {
                #(#statements)*
            }
        }
    })
}
