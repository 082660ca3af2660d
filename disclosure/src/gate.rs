//! Redaction filter and apply gate.
//!
//! A raw [`ChangeSet`] may contain placeholder echoes: masked fields the
//! editing layer wrote back without a real edit. The filter drops them and
//! prunes mappings left empty. The gate then turns the filtered set into one
//! of three named outcomes, and only [`GateOutcome::Ready`] leads to a write.

use std::fmt;

use crate::{
    diff::{Change, ChangeMap, ChangeNode, ChangeSet},
    policy::DisclosureLevel,
    tree::{FieldPath, Mapping, Node},
};

/// Result of the redaction filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Redacted {
    /// The change set with placeholder echoes removed.
    pub changes: ChangeSet,
    /// Paths whose only change was a placeholder echo.
    pub dropped: Vec<FieldPath>,
}

/// Drops every leaf whose new value is a placeholder, then prunes empty
/// mappings so every remaining key path leads to a real change.
///
/// A list containing a placeholder element counts as a placeholder. Removals
/// are kept: deleting a key is never a masking artifact.
pub fn strip_placeholders(changes: ChangeSet) -> Redacted {
    let mut dropped = Vec::new();
    let mut path = FieldPath::root();
    let root = strip_change_map(changes.into_root(), &mut path, &mut dropped);
    Redacted {
        changes: ChangeSet::from_root(root),
        dropped,
    }
}

fn strip_change_map(
    map: ChangeMap,
    path: &mut FieldPath,
    dropped: &mut Vec<FieldPath>,
) -> ChangeMap {
    let mut kept = ChangeMap::new();
    for (key, node) in map {
        path.push(&key);
        match node {
            ChangeNode::Nested(inner) => {
                let inner = strip_change_map(inner, path, dropped);
                if !inner.is_empty() {
                    kept.push(key, ChangeNode::Nested(inner));
                }
            }
            ChangeNode::Leaf(Change::Removed) => kept.push(key, ChangeNode::Leaf(Change::Removed)),
            ChangeNode::Leaf(Change::Set(value)) => {
                if let Some(value) = strip_node(value, path, dropped) {
                    kept.push(key, ChangeNode::Leaf(Change::Set(value)));
                }
            }
        }
        path.pop();
    }
    kept
}

fn strip_node(node: Node, path: &mut FieldPath, dropped: &mut Vec<FieldPath>) -> Option<Node> {
    match node {
        Node::Map(map) if map.is_empty() => Some(Node::Map(map)),
        Node::Map(map) => {
            let mut kept = Mapping::new();
            for (key, child) in map {
                path.push(&key);
                if let Some(child) = strip_node(child, path, dropped) {
                    kept.insert(key, child);
                }
                path.pop();
            }
            (!kept.is_empty()).then_some(Node::Map(kept))
        }
        leaf if leaf.is_placeholder() => {
            dropped.push(path.clone());
            None
        }
        leaf => Some(leaf),
    }
}

/// Changed field names for one configuration section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionSummary {
    name: String,
    fields: Vec<FieldPath>,
}

impl SectionSummary {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field paths relative to the section. Empty when the section itself is
    /// a top-level leaf that changed.
    pub fn fields(&self) -> &[FieldPath] {
        &self.fields
    }
}

/// Section-grouped list of what a write will change.
///
/// Names only, never values, so secrets are not re-displayed. Advisory: the
/// summary never alters the payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    sections: Vec<SectionSummary>,
}

impl ChangeSummary {
    pub fn of(changes: &ChangeSet) -> Self {
        let mut sections: Vec<SectionSummary> = Vec::new();
        for (path, _) in changes.leaves() {
            let Some(section) = path.section() else {
                continue;
            };
            let field = path.within_section();
            match sections.iter_mut().find(|s| s.name == section) {
                Some(existing) => {
                    if !field.is_empty() {
                        existing.fields.push(field);
                    }
                }
                None => sections.push(SectionSummary {
                    name: section.to_owned(),
                    fields: if field.is_empty() { Vec::new() } else { vec![field] },
                }),
            }
        }
        Self { sections }
    }

    pub fn sections(&self) -> &[SectionSummary] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Every listed field as a full path from the root.
    pub fn paths(&self) -> Vec<FieldPath> {
        self.sections
            .iter()
            .flat_map(|section| {
                let root = FieldPath::root().child(&section.name);
                if section.fields.is_empty() {
                    vec![root]
                } else {
                    section
                        .fields
                        .iter()
                        .map(|field| FieldPath::from_keys(root.iter().chain(field.iter())))
                        .collect()
                }
            })
            .collect()
    }
}

impl fmt::Display for ChangeSummary {
    /// One line per section: `email: smtp.host, smtp.port`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            f.write_str(&section.name)?;
            if !section.fields.is_empty() {
                let fields: Vec<String> = section.fields.iter().map(ToString::to_string).collect();
                write!(f, ": {}", fields.join(", "))?;
            }
        }
        Ok(())
    }
}

/// Edits that were discarded because they only echoed placeholders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskedEdits {
    paths: Vec<FieldPath>,
    level: DisclosureLevel,
}

impl MaskedEdits {
    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    pub fn level(&self) -> DisclosureLevel {
        self.level
    }

    /// Operator-facing explanation of why the edit had no effect.
    pub fn guidance(&self) -> String {
        let paths: Vec<String> = self.paths.iter().map(ToString::to_string).collect();
        format!(
            "only masked fields were edited ({}); they are hidden at `{}` disclosure. \
Switch to `{}` disclosure to edit secret fields.",
            paths.join(", "),
            self.level,
            DisclosureLevel::Full,
        )
    }
}

impl fmt::Display for MaskedEdits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.guidance())
    }
}

/// A filtered change set awaiting operator confirmation.
///
/// Dropping or cancelling it has no side effect on either tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingApply {
    changes: ChangeSet,
    summary: ChangeSummary,
    dropped: Vec<FieldPath>,
}

impl PendingApply {
    /// The exact payload a confirmed write transmits.
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn summary(&self) -> &ChangeSummary {
        &self.summary
    }

    /// Placeholder echoes that were filtered out alongside the real edits.
    pub fn dropped(&self) -> &[FieldPath] {
        &self.dropped
    }

    pub fn cancel(self) {}

    pub fn into_changes(self) -> ChangeSet {
        self.changes
    }
}

/// What the gate decided for a raw change set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// The raw change set was already empty. Informational.
    NoChangesDetected,
    /// Every change was a placeholder echo.
    AllChangesMasked(MaskedEdits),
    /// Real changes remain and await confirmation.
    Ready(PendingApply),
}

/// Filters and classifies change sets for one disclosure level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApplyGate {
    level: DisclosureLevel,
}

impl ApplyGate {
    pub fn new(level: DisclosureLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> DisclosureLevel {
        self.level
    }

    pub fn evaluate(&self, raw: ChangeSet) -> GateOutcome {
        if raw.is_empty() {
            return GateOutcome::NoChangesDetected;
        }
        let Redacted { changes, dropped } = strip_placeholders(raw);
        if changes.is_empty() {
            if dropped.is_empty() {
                return GateOutcome::NoChangesDetected;
            }
            return GateOutcome::AllChangesMasked(MaskedEdits {
                paths: dropped,
                level: self.level,
            });
        }
        let summary = ChangeSummary::of(&changes);
        GateOutcome::Ready(PendingApply {
            changes,
            summary,
            dropped,
        })
    }
}
