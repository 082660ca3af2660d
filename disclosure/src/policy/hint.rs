//! Placeholder hint rendering.
//!
//! A hint is the text an operator sees in place of a hidden value, such as
//! `••••1234`. Hint policies are pure string transformations: they do not pick
//! which fields are hidden, they only decide what the stand-in looks like.
//!
//! A hint never reproduces the whole value. When a keep or mask span would
//! leave the value fully visible (short values, zero-width spans) the policy
//! falls back to the opaque placeholder.

use std::borrow::Cow;

use crate::tree::{Node, Placeholder, Scalar};

/// Default opaque placeholder text.
pub const REDACTED_PLACEHOLDER: &str = "••••••••";

/// Default character used to mask hidden characters.
pub const MASK_CHAR: char = '•';

/// Keeps selected segments visible and masks the remainder.
///
/// Operates on Unicode scalar values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepConfig {
    visible_prefix: usize,
    visible_suffix: usize,
    mask_char: char,
}

impl KeepConfig {
    /// Keeps only the first `visible_prefix` characters.
    #[must_use]
    pub fn first(visible_prefix: usize) -> Self {
        Self::both(visible_prefix, 0)
    }

    /// Keeps only the last `visible_suffix` characters.
    #[must_use]
    pub fn last(visible_suffix: usize) -> Self {
        Self::both(0, visible_suffix)
    }

    /// Keeps leading and trailing characters.
    #[must_use]
    pub fn both(visible_prefix: usize, visible_suffix: usize) -> Self {
        Self {
            visible_prefix,
            visible_suffix,
            mask_char: MASK_CHAR,
        }
    }

    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    /// Returns `None` when the kept spans would cover the whole value.
    fn apply_to(&self, value: &str) -> Option<String> {
        let mut chars: Vec<char> = value.chars().collect();
        let total = chars.len();
        if self.visible_prefix.saturating_add(self.visible_suffix) >= total {
            return None;
        }
        for ch in &mut chars[self.visible_prefix..(total - self.visible_suffix)] {
            *ch = self.mask_char;
        }
        Some(chars.into_iter().collect())
    }
}

/// Masks selected segments and leaves the remainder visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_field_names)]
pub struct MaskConfig {
    mask_prefix: usize,
    mask_suffix: usize,
    mask_char: char,
}

impl MaskConfig {
    /// Masks the first `mask_prefix` characters.
    #[must_use]
    pub fn first(mask_prefix: usize) -> Self {
        Self::both(mask_prefix, 0)
    }

    /// Masks the last `mask_suffix` characters.
    #[must_use]
    pub fn last(mask_suffix: usize) -> Self {
        Self::both(0, mask_suffix)
    }

    /// Masks leading and trailing characters.
    ///
    /// If the spans cover the whole value, every character is masked.
    #[must_use]
    pub fn both(mask_prefix: usize, mask_suffix: usize) -> Self {
        Self {
            mask_prefix,
            mask_suffix,
            mask_char: MASK_CHAR,
        }
    }

    #[must_use]
    pub fn with_mask_char(mut self, mask_char: char) -> Self {
        self.mask_char = mask_char;
        self
    }

    fn apply_to(&self, value: &str) -> String {
        let mut chars: Vec<char> = value.chars().collect();
        let total = chars.len();
        if self.mask_prefix.saturating_add(self.mask_suffix) >= total {
            chars.fill(self.mask_char);
            return chars.into_iter().collect();
        }
        for ch in &mut chars[..self.mask_prefix] {
            *ch = self.mask_char;
        }
        for ch in &mut chars[(total - self.mask_suffix)..] {
            *ch = self.mask_char;
        }
        chars.into_iter().collect()
    }
}

/// How a hidden value is rendered as a placeholder hint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HintPolicy {
    /// Show a fixed placeholder regardless of the value.
    Opaque {
        placeholder: Cow<'static, str>,
    },
    /// Keep configured segments visible.
    Keep(KeepConfig),
    /// Mask configured segments.
    Mask(MaskConfig),
}

impl HintPolicy {
    /// [`HintPolicy::Opaque`] using [`REDACTED_PLACEHOLDER`].
    #[must_use]
    pub fn opaque() -> Self {
        Self::Opaque {
            placeholder: Cow::Borrowed(REDACTED_PLACEHOLDER),
        }
    }

    #[must_use]
    pub fn opaque_with<P>(placeholder: P) -> Self
    where
        P: Into<Cow<'static, str>>,
    {
        Self::Opaque {
            placeholder: placeholder.into(),
        }
    }

    #[must_use]
    pub fn keep_first(visible_prefix: usize) -> Self {
        Self::Keep(KeepConfig::first(visible_prefix))
    }

    #[must_use]
    pub fn keep_last(visible_suffix: usize) -> Self {
        Self::Keep(KeepConfig::last(visible_suffix))
    }

    #[must_use]
    pub fn mask_first(mask_prefix: usize) -> Self {
        Self::Mask(MaskConfig::first(mask_prefix))
    }

    #[must_use]
    pub fn mask_last(mask_suffix: usize) -> Self {
        Self::Mask(MaskConfig::last(mask_suffix))
    }

    /// Overrides the masking character. No effect on [`HintPolicy::Opaque`].
    #[must_use]
    pub fn with_mask_char(self, mask_char: char) -> Self {
        match self {
            HintPolicy::Opaque { .. } => self,
            HintPolicy::Keep(config) => HintPolicy::Keep(config.with_mask_char(mask_char)),
            HintPolicy::Mask(config) => HintPolicy::Mask(config.with_mask_char(mask_char)),
        }
    }

    fn fallback(&self) -> String {
        match self {
            HintPolicy::Opaque { placeholder } => placeholder.clone().into_owned(),
            HintPolicy::Keep(_) | HintPolicy::Mask(_) => REDACTED_PLACEHOLDER.to_owned(),
        }
    }

    /// Renders the hint for a string value.
    #[must_use]
    pub fn hint_for(&self, value: &str) -> String {
        let hint = match self {
            HintPolicy::Opaque { .. } => None,
            HintPolicy::Keep(config) => config.apply_to(value),
            HintPolicy::Mask(config) => Some(config.apply_to(value)),
        };
        match hint {
            Some(hint) if !value.is_empty() && hint != value => hint,
            _ => self.fallback(),
        }
    }

    /// Builds the placeholder that stands in for `node`.
    ///
    /// Scalars are hinted from their text form. Lists and mappings get the
    /// opaque placeholder. An existing placeholder is passed through.
    pub fn placeholder_for(&self, node: &Node) -> Placeholder {
        match node {
            Node::Scalar(Scalar::Masked(existing)) => existing.clone(),
            Node::Scalar(scalar) => Placeholder::new(self.hint_for(&scalar.display_text())),
            Node::List(_) | Node::Map(_) => Placeholder::new(self.fallback()),
        }
    }
}

impl Default for HintPolicy {
    fn default() -> Self {
        Self::opaque()
    }
}

#[cfg(test)]
mod tests {
    use super::{HintPolicy, KeepConfig, MaskConfig, REDACTED_PLACEHOLDER};
    use crate::tree::{Node, Placeholder};

    #[test]
    fn keep_last_shows_trailing_characters() {
        let policy = HintPolicy::keep_last(4);
        assert_eq!(policy.hint_for("sk_live_1234"), "••••••••1234");
    }

    #[test]
    fn keep_respects_mask_char() {
        let policy = HintPolicy::keep_first(2).with_mask_char('#');
        assert_eq!(policy.hint_for("abcdef"), "ab####");
    }

    #[test]
    fn keep_never_reveals_short_values() {
        let policy = HintPolicy::keep_last(4);
        assert_eq!(policy.hint_for("1234"), REDACTED_PLACEHOLDER);

        let policy = HintPolicy::Keep(KeepConfig::both(2, 2));
        assert_eq!(policy.hint_for("abc"), REDACTED_PLACEHOLDER);
        assert_eq!(policy.hint_for("abcdef"), "ab••ef");
    }

    #[test]
    fn mask_covers_selected_segments() {
        assert_eq!(HintPolicy::mask_first(2).hint_for("abcdef"), "••cdef");
        assert_eq!(HintPolicy::mask_last(3).hint_for("abcdef"), "abc•••");
        assert_eq!(
            HintPolicy::Mask(MaskConfig::both(2, 2)).hint_for("abcdef"),
            "••cd••"
        );
    }

    #[test]
    fn mask_overlap_masks_everything() {
        let policy = HintPolicy::Mask(MaskConfig::both(3, 3));
        assert_eq!(policy.hint_for("abcd"), "••••");
    }

    #[test]
    fn zero_width_mask_falls_back_to_opaque() {
        assert_eq!(HintPolicy::mask_first(0).hint_for("secret"), REDACTED_PLACEHOLDER);
    }

    #[test]
    fn opaque_uses_custom_text() {
        let policy = HintPolicy::opaque_with("<hidden>");
        assert_eq!(policy.hint_for("secret"), "<hidden>");
        assert_eq!(policy.hint_for(""), "<hidden>");
    }

    #[test]
    fn empty_values_get_the_opaque_placeholder() {
        assert_eq!(HintPolicy::keep_last(4).hint_for(""), REDACTED_PLACEHOLDER);
        assert_eq!(HintPolicy::mask_first(2).hint_for(""), REDACTED_PLACEHOLDER);
    }

    #[test]
    fn multibyte_values_are_masked_per_character() {
        let policy = HintPolicy::keep_first(2);
        assert_eq!(policy.hint_for("秘密数据"), "秘密••");
    }

    #[test]
    fn extreme_spans_do_not_overflow() {
        let policy = HintPolicy::Keep(KeepConfig::both(usize::MAX, 1));
        assert_eq!(policy.hint_for("secret"), REDACTED_PLACEHOLDER);

        let policy = HintPolicy::Mask(MaskConfig::both(1, usize::MAX));
        assert_eq!(policy.hint_for("abc"), "•••");
    }

    #[test]
    fn placeholder_for_numbers_uses_text_form() {
        let policy = HintPolicy::keep_last(2);
        assert_eq!(
            policy.placeholder_for(&Node::from(123_456)),
            Placeholder::new("••••56")
        );
    }

    #[test]
    fn placeholder_for_lists_is_opaque() {
        let policy = HintPolicy::keep_last(2);
        assert_eq!(
            policy.placeholder_for(&Node::from(vec!["a", "b"])),
            Placeholder::new(REDACTED_PLACEHOLDER)
        );
    }
}
