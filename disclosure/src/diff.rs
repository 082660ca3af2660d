//! Structural diff between a baseline tree and an edited tree.
//!
//! The diff is a pure comparison. It never looks at disclosure levels or
//! classifications; masking concerns are handled afterwards by
//! [`crate::gate`].

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::tree::{json::node_to_json, ConfigTree, FieldPath, Mapping, Node};

/// The new state of one changed key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    /// The key now holds this value (added or replaced).
    Set(Node),
    /// The key exists in the baseline but not in the edited tree.
    Removed,
}

impl Change {
    /// The new value, if any.
    pub fn value(&self) -> Option<&Node> {
        match self {
            Change::Set(node) => Some(node),
            Change::Removed => None,
        }
    }
}

/// A node of a [`ChangeSet`]: either a nested set of changes or a changed key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeNode {
    Nested(ChangeMap),
    Leaf(Change),
}

/// Insertion-ordered mapping of changed keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeMap {
    entries: Vec<(String, ChangeNode)>,
}

impl ChangeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&ChangeNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Appends an entry. Keys are unique by construction of the diff.
    pub(crate) fn push(&mut self, key: impl Into<String>, node: ChangeNode) {
        self.entries.push((key.into(), node));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChangeNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for ChangeMap {
    type Item = (String, ChangeNode);
    type IntoIter = std::vec::IntoIter<(String, ChangeNode)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// The sparse difference between two trees.
///
/// Only changed keys are present; unchanged subtrees are absent rather than
/// carried with their old value. Every leaf differs from the baseline, and an
/// empty change set means "no changes".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    root: ChangeMap,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_root(root: ChangeMap) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ChangeMap {
        &self.root
    }

    pub(crate) fn into_root(self) -> ChangeMap {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of changed leaves.
    pub fn len(&self) -> usize {
        self.leaves().len()
    }

    /// Changed leaves with their paths, in display order.
    pub fn leaves(&self) -> Vec<(FieldPath, &Change)> {
        let mut out = Vec::new();
        let mut path = FieldPath::root();
        collect_leaves(&self.root, &mut path, &mut out);
        out
    }

    /// The top-level keys (configuration sections) that have changes.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.root.iter().map(|(key, _)| key)
    }

    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&ChangeNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(first.as_ref())?;
        for key in rest {
            match node {
                ChangeNode::Nested(map) => node = map.get(key.as_ref())?,
                ChangeNode::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    /// The changed value at `path`, if `path` names a changed leaf.
    pub fn change_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&Change> {
        match self.get(path)? {
            ChangeNode::Leaf(change) => Some(change),
            ChangeNode::Nested(_) => None,
        }
    }

    /// Applies the changes to `tree`, as the storage side of a write would.
    ///
    /// A nested change over a non-mapping value replaces that value with a
    /// mapping.
    pub fn apply_to(&self, tree: &mut ConfigTree) {
        let mut root = std::mem::take(tree).into_root();
        apply_map(&self.root, &mut root);
        *tree = ConfigTree::from(root);
    }

    /// The payload as JSON. Removed keys render as `null`.
    pub fn to_json(&self) -> JsonValue {
        change_map_to_json(&self.root)
    }
}

/// Computes the change set that turns `baseline` into `edited`.
///
/// For every key in the union of both mappings at each level:
/// - present on one side only: the key is included (absent is distinct from
///   every present value, including null);
/// - mappings on both sides: recurse, include only a non-empty result;
/// - otherwise: include the edited value if the two differ structurally.
///
/// Lists compare as whole values. Result keys follow the edited tree's order,
/// then baseline-only keys in baseline order.
pub fn diff(baseline: &ConfigTree, edited: &ConfigTree) -> ChangeSet {
    ChangeSet::from_root(diff_maps(baseline.root(), edited.root()))
}

fn diff_maps(baseline: &Mapping, edited: &Mapping) -> ChangeMap {
    let mut changes = ChangeMap::new();
    for (key, new) in edited.iter() {
        match (baseline.get(key), new) {
            (None, new) => changes.push(key, ChangeNode::Leaf(Change::Set(new.clone()))),
            (Some(Node::Map(old)), Node::Map(new)) => {
                let nested = diff_maps(old, new);
                if !nested.is_empty() {
                    changes.push(key, ChangeNode::Nested(nested));
                }
            }
            (Some(old), new) if old != new => {
                changes.push(key, ChangeNode::Leaf(Change::Set(new.clone())));
            }
            (Some(_), _) => {}
        }
    }
    for key in baseline.keys().filter(|key| !edited.contains_key(key)) {
        changes.push(key, ChangeNode::Leaf(Change::Removed));
    }
    changes
}

fn collect_leaves<'a>(
    map: &'a ChangeMap,
    path: &mut FieldPath,
    out: &mut Vec<(FieldPath, &'a Change)>,
) {
    for (key, node) in map.iter() {
        path.push(key);
        match node {
            ChangeNode::Nested(inner) => collect_leaves(inner, path, out),
            ChangeNode::Leaf(change) => out.push((path.clone(), change)),
        }
        path.pop();
    }
}

fn apply_map(changes: &ChangeMap, target: &mut Mapping) {
    for (key, node) in changes.iter() {
        match node {
            ChangeNode::Leaf(Change::Set(value)) => {
                target.insert(key, value.clone());
            }
            ChangeNode::Leaf(Change::Removed) => {
                target.remove(key);
            }
            ChangeNode::Nested(inner) => {
                let slot = target.get_or_insert_with(key, || Node::Map(Mapping::new()));
                if !slot.is_map() {
                    *slot = Node::Map(Mapping::new());
                }
                if let Node::Map(map) = slot {
                    apply_map(inner, map);
                }
            }
        }
    }
}

fn change_map_to_json(map: &ChangeMap) -> JsonValue {
    JsonValue::Object(
        map.iter()
            .map(|(key, node)| {
                let value = match node {
                    ChangeNode::Nested(inner) => change_map_to_json(inner),
                    ChangeNode::Leaf(Change::Set(value)) => node_to_json(value),
                    ChangeNode::Leaf(Change::Removed) => JsonValue::Null,
                };
                (key.to_owned(), value)
            })
            .collect(),
    )
}

impl Serialize for ChangeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, node) in self.iter() {
            match node {
                ChangeNode::Nested(inner) => map.serialize_entry(key, inner)?,
                ChangeNode::Leaf(Change::Set(value)) => map.serialize_entry(key, value)?,
                ChangeNode::Leaf(Change::Removed) => map.serialize_entry(key, &())?,
            }
        }
        map.end()
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}
