//! Disclosure levels and the per-field visibility decision.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ClassificationTable, FieldRule, PublicView};
use crate::{
    classification::Sensitivity,
    tree::{ConfigTree, FieldPath, Mapping, Node, Scalar},
};

/// How much of the configuration a read reveals.
///
/// Levels are totally ordered: a higher level shows at least as much in the
/// clear and permits at least as many edits as a lower one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosureLevel {
    Public,
    Masked,
    Full,
}

impl DisclosureLevel {
    pub const ALL: [DisclosureLevel; 3] = [
        DisclosureLevel::Public,
        DisclosureLevel::Masked,
        DisclosureLevel::Full,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DisclosureLevel::Public => "public",
            DisclosureLevel::Masked => "masked",
            DisclosureLevel::Full => "full",
        }
    }
}

impl fmt::Display for DisclosureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown disclosure level `{0}`; expected `public`, `masked`, or `full`")]
pub struct ParseLevelError(String);

impl FromStr for DisclosureLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisclosureLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLevelError(s.to_owned()))
    }
}

/// What a read returns for one leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// The real value.
    Clear,
    /// A placeholder standing in for the value.
    Placeholder,
    /// Nothing: the key is absent from the tree.
    Omitted,
}

/// Applies a [`ClassificationTable`] at one [`DisclosureLevel`].
#[derive(Clone, Copy, Debug)]
pub struct DisclosurePolicy<'a> {
    level: DisclosureLevel,
    table: &'a ClassificationTable,
}

impl<'a> DisclosurePolicy<'a> {
    pub fn new(level: DisclosureLevel, table: &'a ClassificationTable) -> Self {
        Self { level, table }
    }

    pub fn level(&self) -> DisclosureLevel {
        self.level
    }

    /// Whether fields at `path` are shown in the clear, independent of value.
    pub fn reveals_in_clear<S: AsRef<str>>(&self, path: &[S]) -> bool {
        reveals(self.level, self.table.rule_for(path).sensitivity())
    }

    /// Whether edits to `path` are meant to be sent back.
    ///
    /// Placeholder fields report `false`. The data layer does not block writes
    /// to them; the redaction filter discards placeholder echoes instead.
    pub fn is_editable<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.reveals_in_clear(path)
    }

    /// What a read returns for the leaf `value` at `path`.
    pub fn visibility<S: AsRef<str>>(&self, path: &[S], value: &Node) -> Visibility {
        let rule = self.table.rule_for(path);
        visibility_of(self.level, rule, value)
    }

    /// Applies the policy to a full tree, as a read collaborator must before
    /// returning it.
    ///
    /// Omitted leaves are removed. Mappings emptied by omission are pruned;
    /// mappings that were already empty are kept if their path is revealed.
    pub fn disclose(&self, tree: &ConfigTree) -> ConfigTree {
        let mut path = FieldPath::root();
        ConfigTree::from(self.disclose_map(tree.root(), &mut path))
    }

    fn disclose_map(&self, map: &Mapping, path: &mut FieldPath) -> Mapping {
        let mut out = Mapping::new();
        for (key, node) in map.iter() {
            path.push(key);
            match node {
                Node::Map(inner) => {
                    let disclosed = self.disclose_map(inner, path);
                    let keep_empty = inner.is_empty() && self.reveals_in_clear(path.as_slice());
                    if !disclosed.is_empty() || keep_empty {
                        out.insert(key, Node::Map(disclosed));
                    }
                }
                leaf => {
                    let rule = self.table.rule_for(path.as_slice());
                    match visibility_of(self.level, rule, leaf) {
                        Visibility::Clear => {
                            out.insert(key, leaf.clone());
                        }
                        Visibility::Placeholder => {
                            out.insert(key, Scalar::Masked(rule.placeholder_for(leaf)));
                        }
                        Visibility::Omitted => {}
                    }
                }
            }
            path.pop();
        }
        out
    }
}

fn reveals(level: DisclosureLevel, sensitivity: Sensitivity) -> bool {
    match level {
        DisclosureLevel::Full => true,
        DisclosureLevel::Masked => sensitivity <= Sensitivity::Sensitive,
        DisclosureLevel::Public => sensitivity == Sensitivity::Public,
    }
}

fn visibility_of(level: DisclosureLevel, rule: &FieldRule, value: &Node) -> Visibility {
    if reveals(level, rule.sensitivity()) {
        return Visibility::Clear;
    }
    let masks = match (level, rule.sensitivity()) {
        (DisclosureLevel::Masked, Sensitivity::Secret) => true,
        (DisclosureLevel::Public, Sensitivity::Sensitive) => rule.public_view() == PublicView::Mask,
        _ => false,
    };
    if masks && value.has_value() {
        Visibility::Placeholder
    } else {
        Visibility::Omitted
    }
}
