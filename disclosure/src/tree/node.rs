//! Node types for configuration trees.
//!
//! A node is a scalar, a list of scalars, or a mapping. Equality is structural
//! throughout: scalars compare by value, lists element-wise in order, and
//! mappings by key set regardless of insertion order.

use std::fmt;

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Number;

use crate::policy::REDACTED_PLACEHOLDER;

/// Where a placeholder came from.
///
/// A placeholder produced by a disclosure read is the baseline's stand-in for a
/// hidden value. When the editing layer writes a placeholder back (the operator
/// focused the field but typed nothing), the written value is an echo. The two
/// compare unequal, so an echo surfaces in the raw diff and is then discarded
/// by the redaction filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaceholderOrigin {
    /// Produced by a disclosure read.
    Disclosed,
    /// Written back by an edit.
    Echoed,
}

/// Stand-in for a leaf whose value is not shown at the current disclosure level.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placeholder {
    hint: String,
    origin: PlaceholderOrigin,
}

impl Placeholder {
    /// A placeholder produced by a disclosure read, displayed as `hint`.
    pub fn new(hint: impl Into<String>) -> Self {
        Self {
            hint: hint.into(),
            origin: PlaceholderOrigin::Disclosed,
        }
    }

    /// The display text, e.g. `"••••1234"`. Advisory only.
    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn origin(&self) -> PlaceholderOrigin {
        self.origin
    }

    /// The same placeholder, as written back by an edit.
    #[must_use]
    pub fn echoed(mut self) -> Self {
        self.origin = PlaceholderOrigin::Echoed;
        self
    }
}

impl Default for Placeholder {
    fn default() -> Self {
        Self::new(REDACTED_PLACEHOLDER)
    }
}

/// A leaf value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// A value hidden by the disclosure policy.
    Masked(Placeholder),
}

impl Scalar {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Scalar::Masked(_))
    }

    /// Whether the leaf holds something worth hiding: not null and not an empty string.
    pub fn has_value(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::String(s) => !s.is_empty(),
            Scalar::Bool(_) | Scalar::Number(_) | Scalar::Masked(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Plain text rendering, used to derive placeholder hints.
    pub(crate) fn display_text(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::String(s) => s.clone(),
            Scalar::Masked(p) => p.hint.clone(),
        }
    }

    fn into_echo(self) -> Self {
        match self {
            Scalar::Masked(p) => Scalar::Masked(p.echoed()),
            other => other,
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Masked(p) => serializer.serialize_str(&p.hint),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::String(s) => write!(f, "{s:?}"),
            other => f.write_str(&other.display_text()),
        }
    }
}

/// A configuration tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Scalar(Scalar),
    /// Lists hold scalars only and compare as whole values.
    List(Vec<Scalar>),
    Map(Mapping),
}

impl Node {
    pub fn null() -> Self {
        Node::Scalar(Scalar::Null)
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }

    /// True for a masked scalar and for a list containing a masked element.
    pub fn is_placeholder(&self) -> bool {
        match self {
            Node::Scalar(scalar) => scalar.is_placeholder(),
            Node::List(items) => items.iter().any(Scalar::is_placeholder),
            Node::Map(_) => false,
        }
    }

    /// Whether a leaf holds an existing value. Empty lists and mappings do not.
    pub fn has_value(&self) -> bool {
        match self {
            Node::Scalar(scalar) => scalar.has_value(),
            Node::List(items) => !items.is_empty(),
            Node::Map(map) => !map.is_empty(),
        }
    }

    /// Re-tags every placeholder in this node as written back by an edit.
    #[must_use]
    pub fn into_echo(self) -> Self {
        match self {
            Node::Scalar(scalar) => Node::Scalar(scalar.into_echo()),
            Node::List(items) => Node::List(items.into_iter().map(Scalar::into_echo).collect()),
            Node::Map(map) => Node::Map(
                map.into_iter()
                    .map(|(key, node)| (key, node.into_echo()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(scalar) => scalar.serialize(serializer),
            Node::List(items) => items.serialize(serializer),
            Node::Map(map) => map.serialize(serializer),
        }
    }
}

macro_rules! impl_from_for_scalar {
    ($ty:ty, $variant:ident, $convert:expr) => {
        impl From<$ty> for Scalar {
            fn from(value: $ty) -> Self {
                Scalar::$variant($convert(value))
            }
        }

        impl From<$ty> for Node {
            fn from(value: $ty) -> Self {
                Node::Scalar(Scalar::from(value))
            }
        }
    };
}

impl_from_for_scalar!(bool, Bool, std::convert::identity);
impl_from_for_scalar!(i32, Number, Number::from);
impl_from_for_scalar!(i64, Number, Number::from);
impl_from_for_scalar!(u32, Number, Number::from);
impl_from_for_scalar!(u64, Number, Number::from);
impl_from_for_scalar!(String, String, std::convert::identity);
impl_from_for_scalar!(&str, String, str::to_owned);
impl_from_for_scalar!(Placeholder, Masked, std::convert::identity);

impl From<f64> for Scalar {
    /// Non-finite floats have no JSON representation and become `Null`.
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Scalar::Null, Scalar::Number)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Scalar(Scalar::from(value))
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::Scalar(value)
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Node {
    fn from(value: Vec<T>) -> Self {
        Node::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Node::Map(value)
    }
}

/// An insertion-ordered mapping from unique string keys to nodes.
///
/// Order is kept for display grouping only; two mappings with the same entries
/// in a different order are equal.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.position(key).map(|index| &self.entries[index].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.position(key).map(|index| &mut self.entries[index].1)
    }

    /// Inserts or replaces `key`. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) -> Option<Node> {
        let key = key.into();
        let node = node.into();
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, node)),
            None => {
                self.entries.push((key, node));
                None
            }
        }
    }

    /// Builder form of [`Mapping::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, node: impl Into<Node>) -> Self {
        self.insert(key, node);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.position(key).map(|index| self.entries.remove(index).1)
    }

    /// Returns the node at `key`, inserting `default()` first if it is absent.
    pub fn get_or_insert_with(&mut self, key: &str, default: impl FnOnce() -> Node) -> &mut Node {
        let index = match self.position(key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_owned(), default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, node)| other.get(key).is_some_and(|theirs| theirs == node))
    }
}

impl Eq for Mapping {}

impl<K: Into<String>, V: Into<Node>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (key, node) in iter {
            map.insert(key, node);
        }
        map
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, node) in self.iter() {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}
