//! The static classification table: field path to disclosure rule.

use std::collections::BTreeMap;

use super::HintPolicy;
use crate::{
    classification::Sensitivity,
    layout::SettingsLayout,
    tree::{FieldPath, Node, Placeholder},
};

/// How a `Sensitive` field appears at `Public` level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PublicView {
    /// Left out of the tree entirely.
    #[default]
    Omit,
    /// Shown as a placeholder when the field has a value.
    Mask,
}

/// Classification of one field (or every field under a path prefix).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRule {
    sensitivity: Sensitivity,
    hint: HintPolicy,
    public_view: PublicView,
}

impl FieldRule {
    pub fn new(sensitivity: Sensitivity) -> Self {
        Self {
            sensitivity,
            hint: HintPolicy::default(),
            public_view: PublicView::default(),
        }
    }

    pub fn public() -> Self {
        Self::new(Sensitivity::Public)
    }

    pub fn sensitive() -> Self {
        Self::new(Sensitivity::Sensitive)
    }

    pub fn secret() -> Self {
        Self::new(Sensitivity::Secret)
    }

    #[must_use]
    pub fn with_hint(mut self, hint: HintPolicy) -> Self {
        self.hint = hint;
        self
    }

    #[must_use]
    pub fn with_public_view(mut self, public_view: PublicView) -> Self {
        self.public_view = public_view;
        self
    }

    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    pub fn hint(&self) -> &HintPolicy {
        &self.hint
    }

    pub fn public_view(&self) -> PublicView {
        self.public_view
    }

    pub fn placeholder_for(&self, node: &Node) -> Placeholder {
        self.hint.placeholder_for(node)
    }
}

impl Default for FieldRule {
    fn default() -> Self {
        Self::public()
    }
}

/// Maps field paths to rules.
///
/// Lookup is by longest matching prefix, so classifying `apiKeys` covers
/// `apiKeys.secret` unless a deeper entry overrides it. Paths with no matching
/// entry use the default rule, which is `Public` unless changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationTable {
    default: FieldRule,
    rules: BTreeMap<FieldPath, FieldRule>,
}

impl ClassificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table declared by a `SettingsLayout` type.
    pub fn for_layout<T: SettingsLayout>() -> Self {
        let mut table = Self::new();
        T::classify_into(&FieldPath::root(), &mut table);
        table
    }

    /// Sets the rule for unclassified paths.
    #[must_use]
    pub fn with_default(mut self, rule: FieldRule) -> Self {
        self.default = rule;
        self
    }

    /// Builder form of [`ClassificationTable::insert`].
    #[must_use]
    pub fn classify(mut self, path: impl Into<FieldPath>, rule: FieldRule) -> Self {
        self.insert(path, rule);
        self
    }

    /// Classifies `path` and everything under it. Replaces an existing entry.
    pub fn insert(&mut self, path: impl Into<FieldPath>, rule: FieldRule) -> Option<FieldRule> {
        self.rules.insert(path.into(), rule)
    }

    /// The rule governing `path`.
    pub fn rule_for<S: AsRef<str>>(&self, path: &[S]) -> &FieldRule {
        let path = FieldPath::from_keys(path);
        (1..=path.len())
            .rev()
            .find_map(|len| self.rules.get(&path[..len]))
            .unwrap_or(&self.default)
    }

    pub fn default_rule(&self) -> &FieldRule {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &FieldRule)> {
        self.rules.iter()
    }
}
