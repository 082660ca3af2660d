//! Conversion between [`ConfigTree`] and `serde_json::Value`.
//!
//! Trees round-trip through JSON objects, arrays of scalars, and scalars.
//! Placeholders render as their hint text. Producers that still mark hidden
//! values with a reserved character sequence can be read with
//! [`ConfigTree::from_json_with_marker`], which lifts marked strings into
//! [`Scalar::Masked`].

use std::borrow::Cow;

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::{ConfigTree, FieldPath, Mapping, Node, Placeholder, Scalar};

/// The reserved character sequence that marks a masked string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderMarker(Cow<'static, str>);

impl PlaceholderMarker {
    pub fn new(marker: impl Into<Cow<'static, str>>) -> Self {
        Self(marker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `value` carries the marker. An empty marker matches nothing.
    pub fn matches(&self, value: &str) -> bool {
        !self.0.is_empty() && value.contains(self.0.as_ref())
    }
}

impl Default for PlaceholderMarker {
    fn default() -> Self {
        Self::new("••••")
    }
}

/// The JSON value does not have the shape of a configuration tree.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("a configuration tree must be a JSON object")]
    NotAnObject,
    #[error("list at `{0}` contains a non-scalar element")]
    NonScalarInList(FieldPath),
}

impl ConfigTree {
    /// Renders the tree as JSON. Placeholders become their hint text.
    pub fn to_json(&self) -> JsonValue {
        mapping_to_json(self.root())
    }

    /// Reads a tree, treating strings that contain `marker` as placeholders.
    pub fn from_json_with_marker(
        value: JsonValue,
        marker: &PlaceholderMarker,
    ) -> Result<Self, ShapeError> {
        read_tree(value, Some(marker))
    }
}

impl TryFrom<JsonValue> for ConfigTree {
    type Error = ShapeError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        read_tree(value, None)
    }
}

pub(crate) fn node_to_json(node: &Node) -> JsonValue {
    match node {
        Node::Scalar(scalar) => scalar_to_json(scalar),
        Node::List(items) => JsonValue::Array(items.iter().map(scalar_to_json).collect()),
        Node::Map(map) => mapping_to_json(map),
    }
}

fn mapping_to_json(map: &Mapping) -> JsonValue {
    JsonValue::Object(
        map.iter()
            .map(|(key, node)| (key.to_owned(), node_to_json(node)))
            .collect(),
    )
}

fn scalar_to_json(scalar: &Scalar) -> JsonValue {
    match scalar {
        Scalar::Null => JsonValue::Null,
        Scalar::Bool(b) => JsonValue::Bool(*b),
        Scalar::Number(n) => JsonValue::Number(n.clone()),
        Scalar::String(s) => JsonValue::String(s.clone()),
        Scalar::Masked(p) => JsonValue::String(p.hint().to_owned()),
    }
}

fn read_tree(value: JsonValue, marker: Option<&PlaceholderMarker>) -> Result<ConfigTree, ShapeError> {
    let JsonValue::Object(object) = value else {
        return Err(ShapeError::NotAnObject);
    };
    let mut path = FieldPath::root();
    read_object(object, &mut path, marker).map(ConfigTree::from)
}

fn read_object(
    object: serde_json::Map<String, JsonValue>,
    path: &mut FieldPath,
    marker: Option<&PlaceholderMarker>,
) -> Result<Mapping, ShapeError> {
    let mut map = Mapping::new();
    for (key, value) in object {
        path.push(&key);
        let node = read_node(value, path, marker)?;
        path.pop();
        map.insert(key, node);
    }
    Ok(map)
}

fn read_node(
    value: JsonValue,
    path: &mut FieldPath,
    marker: Option<&PlaceholderMarker>,
) -> Result<Node, ShapeError> {
    match value {
        JsonValue::Object(object) => read_object(object, path, marker).map(Node::Map),
        JsonValue::Array(items) => items
            .into_iter()
            .map(|item| {
                read_scalar(item, marker).ok_or_else(|| ShapeError::NonScalarInList(path.clone()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Node::List),
        scalar => read_scalar(scalar, marker)
            .map(Node::Scalar)
            .ok_or_else(|| ShapeError::NonScalarInList(path.clone())),
    }
}

fn read_scalar(value: JsonValue, marker: Option<&PlaceholderMarker>) -> Option<Scalar> {
    match value {
        JsonValue::Null => Some(Scalar::Null),
        JsonValue::Bool(b) => Some(Scalar::Bool(b)),
        JsonValue::Number(n) => Some(Scalar::Number(n)),
        JsonValue::String(s) if marker.is_some_and(|m| m.matches(&s)) => {
            Some(Scalar::Masked(Placeholder::new(s)))
        }
        JsonValue::String(s) => Some(Scalar::String(s)),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}
