//! Configuration trees.
//!
//! A [`ConfigTree`] is a root [`Mapping`] of sections. Sections nest further
//! mappings, and leaves are scalars or lists of scalars. In practice trees are
//! shallow: section, subsection, field.

pub(crate) mod json;
mod node;
mod path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use json::{PlaceholderMarker, ShapeError};
pub use node::{Mapping, Node, Placeholder, PlaceholderOrigin, Scalar};
pub use path::{FieldPath, PathError};

/// A full configuration state.
///
/// Equality is structural: mappings compare by key set regardless of order,
/// lists element by element, numbers by their JSON form. Placeholders are the
/// one exception to comparing serialized forms: a placeholder written back by
/// an edit ([`PlaceholderOrigin::Echoed`]) never equals the one a read
/// produced, even though both serialize as the same hint. That difference is
/// what lets a diff surface the echo so the apply gate can drop it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigTree {
    root: Mapping,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn into_root(self) -> Mapping {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Resolves `path` through nested mappings.
    ///
    /// Returns `None` for the empty path, for a missing key, and for a path
    /// that runs through a scalar or list.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(first.as_ref())?;
        for key in rest {
            node = node.as_map()?.get(key.as_ref())?;
        }
        Some(node)
    }

    /// Sets the value at `path`, creating intermediate mappings as needed, and
    /// returns the previous value.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty or a prefix of it resolves to a scalar or list.
    /// Paths come from the static field layout, so this is a caller defect.
    pub fn set<S: AsRef<str>>(&mut self, path: &[S], value: impl Into<Node>) -> Option<Node> {
        match self.try_set(path, value) {
            Ok(previous) => previous,
            Err(err) => panic!("{err}"),
        }
    }

    /// Non-panicking form of [`ConfigTree::set`].
    pub fn try_set<S: AsRef<str>>(
        &mut self,
        path: &[S],
        value: impl Into<Node>,
    ) -> Result<Option<Node>, PathError> {
        let Some((leaf, prefix)) = path.split_last() else {
            return Err(PathError::Empty);
        };
        let mut current = &mut self.root;
        for (index, key) in prefix.iter().enumerate() {
            current = match current.get_or_insert_with(key.as_ref(), || Node::Map(Mapping::new()))
            {
                Node::Map(map) => map,
                Node::Scalar(_) | Node::List(_) => {
                    return Err(PathError::MalformedPath {
                        path: FieldPath::from_keys(path),
                        at: FieldPath::from_keys(&path[..=index]),
                    });
                }
            };
        }
        Ok(current.insert(leaf.as_ref(), value))
    }

    /// Removes and returns the value at `path`. Missing paths are a no-op.
    pub fn remove<S: AsRef<str>>(&mut self, path: &[S]) -> Option<Node> {
        let (leaf, prefix) = path.split_last()?;
        let mut current = &mut self.root;
        for key in prefix {
            current = current.get_mut(key.as_ref())?.as_map_mut()?;
        }
        current.remove(leaf.as_ref())
    }

    /// All non-mapping leaves with their paths, in display order.
    pub fn leaves(&self) -> Vec<(FieldPath, &Node)> {
        let mut out = Vec::new();
        let mut path = FieldPath::root();
        collect_leaves(&self.root, &mut path, &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }
}

fn collect_leaves<'a>(map: &'a Mapping, path: &mut FieldPath, out: &mut Vec<(FieldPath, &'a Node)>) {
    for (key, node) in map.iter() {
        path.push(key);
        match node {
            Node::Map(inner) => collect_leaves(inner, path, out),
            leaf => out.push((path.clone(), leaf)),
        }
        path.pop();
    }
}

impl From<Mapping> for ConfigTree {
    fn from(root: Mapping) -> Self {
        Self { root }
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        ConfigTree::try_from(value).map_err(serde::de::Error::custom)
    }
}
