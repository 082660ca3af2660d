//! Generic type parameter handling and trait bound management.
//!
//! This module adds `SettingsLayout` bounds only for generics that appear in
//! walked fields. Classified and unannotated fields place no requirement on
//! their type.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` is skipped when collecting generics, so a marker parameter
//! never picks up a `SettingsLayout` bound.

use syn::{parse_quote, Ident};

use crate::crate_path;

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    if let syn::Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            if segment.ident == "PhantomData" {
                return;
            }

            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                for arg in &args.args {
                    if let syn::GenericArgument::Type(inner_ty) = arg {
                        collect_generics_from_type(inner_ty, generics, result);
                    }
                }
            }

            for param in generics.type_params() {
                if segment.ident == param.ident && !result.iter().any(|g| g == &param.ident) {
                    result.push(param.ident.clone());
                }
            }
        }
    }
}

/// Adds `SettingsLayout` bounds to generic parameters used in walked fields.
pub(crate) fn add_layout_bounds(mut generics: syn::Generics, walked: &[Ident]) -> syn::Generics {
    for param in generics.type_params_mut() {
        if walked.iter().any(|g| g == &param.ident) {
            let layout_path = crate_path("SettingsLayout");
            param.bounds.push(parse_quote!(#layout_path));
        }
    }
    generics
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::collect_generics_from_type;

    fn generics(tokens: proc_macro2::TokenStream) -> syn::Generics {
        syn::parse2(tokens).unwrap()
    }

    #[test]
    fn collects_nested_parameters_once() {
        let generics = generics(quote! { <T, U> });
        let ty: syn::Type = syn::parse2(quote! { Option<Box<T>> }).unwrap();
        let mut found = Vec::new();
        collect_generics_from_type(&ty, &generics, &mut found);
        collect_generics_from_type(&ty, &generics, &mut found);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], "T");
    }

    #[test]
    fn phantom_data_is_skipped() {
        let generics = generics(quote! { <T> });
        let ty: syn::Type = syn::parse2(quote! { PhantomData<T> }).unwrap();
        let mut found = Vec::new();
        collect_generics_from_type(&ty, &generics, &mut found);
        assert!(found.is_empty());
    }
}
