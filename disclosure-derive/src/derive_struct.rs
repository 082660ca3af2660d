//! Struct-specific `SettingsLayout` derivation.
//!
//! This module generates one table statement per annotated field and collects
//! generic parameters that require trait bounds.

use proc_macro2::{Ident, TokenStream};
use quote::{quote, quote_spanned};
use syn::{ext::IdentExt, spanned::Spanned, DataStruct, Fields, Result};

use crate::{
    container::ContainerOptions,
    crate_path,
    generics::collect_generics_from_type,
    strategy::{parse_field_options, Strategy},
    types::{is_boxed_dyn_type, is_leaf_type},
};

pub(crate) struct StructDeriveOutput {
    pub(crate) statements: Vec<TokenStream>,
    pub(crate) walked_generics: Vec<Ident>,
}

pub(crate) fn derive_struct(
    data: DataStruct,
    generics: &syn::Generics,
    options: &ContainerOptions,
) -> Result<StructDeriveOutput> {
    match data.fields {
        Fields::Named(fields) => derive_named_struct(fields, generics, options),
        Fields::Unnamed(fields) => Err(syn::Error::new(
            fields.span(),
            "`SettingsLayout` needs named fields to map onto configuration keys",
        )),
        Fields::Unit => Ok(StructDeriveOutput {
            statements: Vec::new(),
            walked_generics: Vec::new(),
        }),
    }
}

fn derive_named_struct(
    fields: syn::FieldsNamed,
    generics: &syn::Generics,
    options: &ContainerOptions,
) -> Result<StructDeriveOutput> {
    let layout_path = crate_path("SettingsLayout");
    let classification_path = crate_path("Classification");
    let mut statements = Vec::new();
    let mut walked_generics = Vec::new();
    let mut keys: Vec<String> = Vec::new();

    for field in fields.named {
        let span = field.span();
        let field_options = parse_field_options(&field.attrs)?;
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new(span, "named field without an identifier"));
        };
        let key = field_options
            .rename
            .clone()
            .unwrap_or_else(|| options.key_for(&ident.unraw().to_string()));
        if keys.contains(&key) {
            return Err(syn::Error::new(
                span,
                format!("two fields map to the configuration key `{key}`"),
            ));
        }
        keys.push(key.clone());
        let ty = &field.ty;

        let statement = match field_options.strategy {
            Strategy::PassThrough => continue,
            Strategy::Classify(class) => quote_spanned! { span =>
                table.insert(
                    prefix.child(#key),
                    <#class as #classification_path>::rule(),
                );
            },
            Strategy::Walk => {
                if is_leaf_type(ty) {
                    return Err(syn::Error::new(
                        ty.span(),
                        "#[setting] walks into nested settings; classify leaf fields with \
#[setting(Classification)] instead",
                    ));
                }
                if is_boxed_dyn_type(ty) {
                    return Err(syn::Error::new(
                        ty.span(),
                        "#[setting] cannot walk a trait object; its layout is not known statically",
                    ));
                }
                collect_generics_from_type(ty, generics, &mut walked_generics);
                quote_spanned! { span =>
                    <#ty as #layout_path>::classify_into(&prefix.child(#key), table);
                }
            }
        };
        statements.push(statement);
    }

    Ok(StructDeriveOutput {
        statements,
        walked_generics,
    })
}
