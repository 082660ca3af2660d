//! Adapters for logging change sets through `slog`.
//!
//! Everything here logs field paths, never field values. A change set built
//! at `Full` disclosure carries real secrets, so the adapters project it onto
//! its paths before anything reaches a drain.
//!
//! Values are emitted as structured JSON via `slog`'s nested-value support.

use serde_json::{Map, Value as JsonValue};
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    diff::{Change, ChangeSet},
    gate::{ChangeSummary, MaskedEdits},
    policy::DisclosureLevel,
    tree::FieldPath,
};

/// A `slog::Value` holding a path-only JSON projection.
#[derive(Clone, Debug, PartialEq)]
pub struct PathJson {
    value: JsonValue,
}

impl PathJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for PathJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Projects a value onto the field paths it touches.
///
/// ## Example
/// ```ignore
/// use disclosure::slog::IntoPathJson;
///
/// info!(logger, "applying"; "changes" => changes.path_json());
/// ```
pub trait IntoPathJson {
    fn path_json(&self) -> PathJson;
}

fn path_list<'a>(paths: impl IntoIterator<Item = &'a FieldPath>) -> JsonValue {
    JsonValue::Array(
        paths
            .into_iter()
            .map(|path| JsonValue::String(path.to_string()))
            .collect(),
    )
}

impl IntoPathJson for ChangeSet {
    /// `{"set": [...], "removed": [...]}`
    fn path_json(&self) -> PathJson {
        let (set, removed): (Vec<_>, Vec<_>) = self
            .leaves()
            .into_iter()
            .partition(|(_, change)| matches!(change, Change::Set(_)));
        let mut map = Map::new();
        map.insert("set".to_owned(), path_list(set.iter().map(|(path, _)| path)));
        map.insert(
            "removed".to_owned(),
            path_list(removed.iter().map(|(path, _)| path)),
        );
        PathJson::new(JsonValue::Object(map))
    }
}

impl IntoPathJson for ChangeSummary {
    /// `{"section": ["field", ...], ...}`
    fn path_json(&self) -> PathJson {
        let map = self
            .sections()
            .iter()
            .map(|section| (section.name().to_owned(), path_list(section.fields())))
            .collect();
        PathJson::new(JsonValue::Object(map))
    }
}

impl IntoPathJson for MaskedEdits {
    fn path_json(&self) -> PathJson {
        PathJson::new(path_list(self.paths()))
    }
}

impl SlogValue for FieldPath {
    fn serialize(
        &self,
        _record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        serializer.emit_arguments(key, &format_args!("{self}"))
    }
}

impl SlogValue for DisclosureLevel {
    fn serialize(
        &self,
        _record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        serializer.emit_str(key, self.as_str())
    }
}
