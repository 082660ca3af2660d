//! Type utilities for the derive macro.

/// Checks if a type is a recognized leaf value: a primitive or `String`.
///
/// Returns `true` for bare type names like `i32`, `bool`, `String`.
/// Returns `false` for qualified paths, generic types, or type aliases.
///
/// Detection is conservative. A leaf hidden behind an alias still fails later,
/// with the compiler's missing `SettingsLayout` impl error.
pub(crate) fn is_leaf_type(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    if path.qself.is_some() || path.path.leading_colon.is_some() {
        return false;
    }
    if path.path.segments.len() != 1 {
        return false;
    }
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    if !segment.arguments.is_empty() {
        return false;
    }
    matches!(
        segment.ident.to_string().as_str(),
        "i8" | "i16"
            | "i32"
            | "i64"
            | "i128"
            | "isize"
            | "u8"
            | "u16"
            | "u32"
            | "u64"
            | "u128"
            | "usize"
            | "f32"
            | "f64"
            | "bool"
            | "char"
            | "String"
    )
}

/// Checks if a type is `Box<dyn Trait>` (including extra bounds on the trait).
pub(crate) fn is_boxed_dyn_type(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };

    if path.path.segments.len() != 1 {
        return false;
    }

    let Some(segment) = path.path.segments.first() else {
        return false;
    };

    if segment.ident != "Box" {
        return false;
    }

    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };

    let Some(first) = args.args.first() else {
        return false;
    };

    matches!(first, syn::GenericArgument::Type(syn::Type::TraitObject(_)))
}
