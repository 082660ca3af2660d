//! Marker types for "how sensitive is this field?"
//!
//! Markers are zero-sized. They bind a [`Sensitivity`] and a placeholder
//! [`HintPolicy`] at the type level so settings structs can declare their
//! classification next to the field (see `#[derive(SettingsLayout)]`).

use std::fmt;

use crate::policy::{FieldRule, HintPolicy, PublicView};

/// Static sensitivity of a configuration field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sensitivity {
    /// Shown at every disclosure level.
    Public,
    /// Shown from `Masked` upwards; hidden or masked at `Public`.
    Sensitive,
    /// Shown only at `Full`; a placeholder at `Masked`.
    Secret,
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sensitivity::Public => "public",
            Sensitivity::Sensitive => "sensitive",
            Sensitivity::Secret => "secret",
        })
    }
}

/// Classification marker trait.
///
/// Implement this for a unit struct to define a custom classification:
///
/// ```rust
/// use disclosure::{Classification, HintPolicy, Sensitivity};
///
/// #[derive(Clone, Copy)]
/// struct WebhookSecret;
///
/// impl Classification for WebhookSecret {
///     const SENSITIVITY: Sensitivity = Sensitivity::Secret;
///
///     fn hint() -> HintPolicy {
///         HintPolicy::keep_first(4)
///     }
/// }
/// ```
pub trait Classification {
    const SENSITIVITY: Sensitivity;

    /// How the placeholder for this field is rendered.
    fn hint() -> HintPolicy {
        HintPolicy::opaque()
    }

    /// Treatment at `Public` level. Only consulted for `Sensitive` fields.
    fn public_view() -> PublicView {
        PublicView::Omit
    }

    /// The table rule for fields carrying this classification.
    fn rule() -> FieldRule {
        FieldRule::new(Self::SENSITIVITY)
            .with_hint(Self::hint())
            .with_public_view(Self::public_view())
    }
}

/// Fields safe to show to anyone with console access.
#[derive(Clone, Copy)]
pub struct Public;
impl Classification for Public {
    const SENSITIVITY: Sensitivity = Sensitivity::Public;
}

/// Operational details hidden from the public view, e.g. internal hostnames.
#[derive(Clone, Copy)]
pub struct Sensitive;
impl Classification for Sensitive {
    const SENSITIVITY: Sensitivity = Sensitivity::Sensitive;
}

/// Secrets with no recognizable structure, e.g. signing keys.
#[derive(Clone, Copy)]
pub struct Secret;
impl Classification for Secret {
    const SENSITIVITY: Sensitivity = Sensitivity::Secret;
}

/// Passwords. Never hinted.
#[derive(Clone, Copy)]
pub struct Password;
impl Classification for Password {
    const SENSITIVITY: Sensitivity = Sensitivity::Secret;
}

/// API keys and access tokens. The last four characters identify the key.
#[derive(Clone, Copy)]
pub struct Token;
impl Classification for Token {
    const SENSITIVITY: Sensitivity = Sensitivity::Secret;

    fn hint() -> HintPolicy {
        HintPolicy::keep_last(4)
    }
}

/// Contact addresses. Masked rather than omitted in the public view.
#[derive(Clone, Copy)]
pub struct Email;
impl Classification for Email {
    const SENSITIVITY: Sensitivity = Sensitivity::Sensitive;

    fn hint() -> HintPolicy {
        HintPolicy::keep_first(2)
    }

    fn public_view() -> PublicView {
        PublicView::Mask
    }
}
