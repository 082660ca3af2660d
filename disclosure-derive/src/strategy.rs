//! Parsing of `#[setting(...)]` field attributes.
//!
//! This module maps attribute syntax to table-building decisions and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, LitStr, Meta, Result};

/// Field handling based on `#[setting(...)]` attributes.
///
/// ## Strategy Mapping
///
/// | Attribute | Strategy | Behavior |
/// |-----------|----------|----------|
/// | None | `PassThrough` | No table entry; default rule applies |
/// | `#[setting]` / `#[setting(walk)]` | `Walk` | Record the nested layout under the key |
/// | `#[setting(Class)]` | `Classify(Class)` | Record `Class::rule()` at the key |
#[derive(Clone, Debug)]
pub(crate) enum Strategy {
    /// No annotation: nothing is recorded.
    PassThrough,
    /// Descend into a nested `SettingsLayout` type.
    Walk,
    /// Classify the field (and its subtree) with a marker type.
    Classify(syn::Path),
}

/// Everything parsed from one field's attributes.
#[derive(Clone, Debug)]
pub(crate) struct FieldOptions {
    pub(crate) strategy: Strategy,
    /// Explicit tree key, overriding the field name.
    pub(crate) rename: Option<String>,
}

fn set_strategy(target: &mut Option<Strategy>, next: Strategy, span: Span) -> Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(
            span,
            "multiple #[setting] strategies specified on the same field",
        ));
    }
    *target = Some(next);
    Ok(())
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut strategy: Option<Strategy> = None;
    let mut rename: Option<String> = None;
    for attr in attrs {
        if !attr.path().is_ident("setting") {
            continue;
        }

        match &attr.meta {
            Meta::Path(_) => {
                set_strategy(&mut strategy, Strategy::Walk, attr.span())?;
            }
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        if rename.is_some() {
                            return Err(meta.error("duplicate `rename` option"));
                        }
                        let value: LitStr = meta.value()?.parse()?;
                        if value.value().is_empty() {
                            return Err(syn::Error::new(value.span(), "`rename` must not be empty"));
                        }
                        rename = Some(value.value());
                        Ok(())
                    } else if meta.path.is_ident("walk") {
                        set_strategy(&mut strategy, Strategy::Walk, meta.path.span())
                    } else if meta.input.is_empty() || meta.input.peek(syn::Token![,]) {
                        set_strategy(
                            &mut strategy,
                            Strategy::Classify(meta.path.clone()),
                            meta.path.span(),
                        )
                    } else {
                        Err(meta.error(
                            "expected a classification type (e.g., #[setting(Secret)])",
                        ))
                    }
                })?;
            }
            Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "name-value syntax is not supported for #[setting]",
                ));
            }
        }
    }

    Ok(FieldOptions {
        strategy: strategy.unwrap_or(Strategy::PassThrough),
        rename,
    })
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .unwrap();
        input.attrs
    }

    #[test]
    fn no_attribute_returns_passthrough() {
        let attrs = parse_attrs(quote! {});
        let options = parse_field_options(&attrs).unwrap();
        assert!(matches!(options.strategy, Strategy::PassThrough));
        assert!(options.rename.is_none());
    }

    #[test]
    fn bare_setting_returns_walk() {
        let attrs = parse_attrs(quote! { #[setting] });
        let options = parse_field_options(&attrs).unwrap();
        assert!(matches!(options.strategy, Strategy::Walk));
    }

    #[test]
    fn setting_with_classification_returns_classify() {
        let attrs = parse_attrs(quote! { #[setting(Secret)] });
        match parse_field_options(&attrs).unwrap().strategy {
            Strategy::Classify(path) => assert!(path.is_ident("Secret")),
            other => panic!("expected Classify, got {other:?}"),
        }
    }

    #[test]
    fn setting_with_path_classification() {
        let attrs = parse_attrs(quote! { #[setting(markers::WebhookSecret)] });
        match parse_field_options(&attrs).unwrap().strategy {
            Strategy::Classify(path) => assert_eq!(path.segments.len(), 2),
            other => panic!("expected Classify, got {other:?}"),
        }
    }

    #[test]
    fn rename_combines_with_strategy() {
        let attrs = parse_attrs(quote! { #[setting(Token, rename = "apiKey")] });
        let options = parse_field_options(&attrs).unwrap();
        assert!(matches!(options.strategy, Strategy::Classify(_)));
        assert_eq!(options.rename.as_deref(), Some("apiKey"));

        let attrs = parse_attrs(quote! { #[setting(walk, rename = "smtp")] });
        let options = parse_field_options(&attrs).unwrap();
        assert!(matches!(options.strategy, Strategy::Walk));
        assert_eq!(options.rename.as_deref(), Some("smtp"));
    }

    #[test]
    fn rename_alone_passes_through() {
        let attrs = parse_attrs(quote! { #[setting(rename = "host")] });
        let options = parse_field_options(&attrs).unwrap();
        assert!(matches!(options.strategy, Strategy::PassThrough));
    }

    #[test]
    fn multiple_strategies_error() {
        let attrs = parse_attrs(quote! {
            #[setting]
            #[setting(Secret)]
        });
        let result = parse_field_options(&attrs);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("multiple #[setting] strategies"));
    }

    #[test]
    fn name_value_syntax_error() {
        let attrs = parse_attrs(quote! { #[setting = "value"] });
        let result = parse_field_options(&attrs);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("name-value syntax is not supported"));
    }

    #[test]
    fn empty_rename_errors() {
        let attrs = parse_attrs(quote! { #[setting(rename = "")] });
        assert!(parse_field_options(&attrs).is_err());
    }

    #[test]
    fn other_attributes_ignored() {
        let attrs = parse_attrs(quote! {
            #[derive(Clone)]
            #[serde(skip)]
        });
        let options = parse_field_options(&attrs).unwrap();
        assert!(matches!(options.strategy, Strategy::PassThrough));
    }
}
