//! Integration tests for the slog module.
//!
//! These tests verify that:
//! - change sets, summaries and masked edits log their field paths
//! - no logged representation carries a field value
//! - `FieldPath` and `DisclosureLevel` emit as plain strings

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::Arguments,
    sync::{Arc, Mutex},
};

use disclosure::{
    diff, slog::IntoPathJson, ApplyGate, ClassificationTable, ConfigTree, DisclosureLevel,
    EditSession, FieldPath, FieldRule, GateOutcome, MemoryBackend, Placeholder,
};
use serde_json::{json, Value as JsonValue};
use slog::{o, Drain, Logger, OwnedKVList, Record, KV};

// A test serializer that captures serialized key-value pairs
struct CapturingSerializer {
    captured: RefCell<HashMap<String, CapturedValue>>,
}

#[derive(Debug, Clone, PartialEq)]
enum CapturedValue {
    Str(String),
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Unit,
    None,
    // For nested serde values, we capture the JSON representation
    Serde(JsonValue),
}

impl CapturingSerializer {
    fn new() -> Self {
        Self {
            captured: RefCell::new(HashMap::new()),
        }
    }

    fn get(&self, key: &str) -> Option<CapturedValue> {
        self.captured.borrow().get(key).cloned()
    }

    fn snapshot(&self) -> HashMap<String, CapturedValue> {
        self.captured.borrow().clone()
    }
}

impl slog::Serializer for CapturingSerializer {
    fn emit_arguments(&mut self, key: slog::Key, val: &Arguments<'_>) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Str(val.to_string()));
        Ok(())
    }

    fn emit_str(&mut self, key: slog::Key, val: &str) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Str(val.into()));
        Ok(())
    }

    fn emit_bool(&mut self, key: slog::Key, val: bool) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Bool(val));
        Ok(())
    }

    fn emit_i64(&mut self, key: slog::Key, val: i64) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::I64(val));
        Ok(())
    }

    fn emit_u64(&mut self, key: slog::Key, val: u64) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::U64(val));
        Ok(())
    }

    fn emit_usize(&mut self, key: slog::Key, val: usize) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::U64(val as u64));
        Ok(())
    }

    fn emit_f64(&mut self, key: slog::Key, val: f64) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::F64(val));
        Ok(())
    }

    fn emit_unit(&mut self, key: slog::Key) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Unit);
        Ok(())
    }

    fn emit_none(&mut self, key: slog::Key) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::None);
        Ok(())
    }

    fn emit_serde(&mut self, key: slog::Key, val: &dyn slog::SerdeValue) -> slog::Result {
        // Serialize the value to JSON to capture it
        let json = serde_json::to_value(val.as_serde()).unwrap_or(JsonValue::Null);
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Serde(json));
        Ok(())
    }
}

/// Helper function to serialize a slog::Value into any Serializer.
fn serialize_to_capture<V: slog::Value, S: slog::Serializer>(
    value: &V,
    key: &'static str,
    serializer: &mut S,
) {
    static RS: slog::RecordStatic<'static> = slog::record_static!(slog::Level::Info, "");
    let args = format_args!("");
    let record = slog::Record::new(&RS, &args, slog::b!());
    value.serialize(&record, key, serializer).unwrap();
}

fn capture_json<V: slog::Value>(value: &V) -> JsonValue {
    let mut serializer = CapturingSerializer::new();
    serialize_to_capture(value, "value", &mut serializer);
    match serializer.get("value") {
        Some(CapturedValue::Serde(json)) => json,
        other => panic!("expected Serde value, got {other:?}"),
    }
}

fn tree(value: JsonValue) -> ConfigTree {
    ConfigTree::try_from(value).unwrap()
}

// ============================================================================
// Adapter output
// ============================================================================

#[test]
fn change_set_logs_paths_by_kind() {
    let baseline = tree(json!({
        "app": { "name": "Console", "banner": "hi" },
        "smtp": { "password": "old-secret" }
    }));
    let edited = tree(json!({
        "app": { "name": "Admin" },
        "smtp": { "password": "new-secret" }
    }));
    let changes = diff(&baseline, &edited);

    let json = capture_json(&changes.path_json());
    assert_eq!(
        json,
        json!({ "set": ["app.name", "smtp.password"], "removed": ["app.banner"] })
    );
    assert!(!json.to_string().contains("secret\""));
    assert!(!json.to_string().contains("Admin"));
}

#[test]
fn summary_logs_sections_and_fields() {
    let baseline = tree(json!({ "email": { "smtp": { "host": "a", "port": 25 } }, "flag": false }));
    let edited = tree(json!({ "email": { "smtp": { "host": "b", "port": 587 } }, "flag": true }));
    let GateOutcome::Ready(pending) =
        ApplyGate::new(DisclosureLevel::Full).evaluate(diff(&baseline, &edited))
    else {
        panic!("expected Ready");
    };

    let json = capture_json(&pending.summary().path_json());
    assert_eq!(
        json,
        json!({ "email": ["smtp.host", "smtp.port"], "flag": [] })
    );
}

#[test]
fn masked_edits_log_dropped_paths() {
    let mut baseline = tree(json!({ "apiKeys": {} }));
    baseline.set(&["apiKeys", "secret"], Placeholder::new("••••1234"));
    let mut edited = baseline.clone();
    edited.set(&["apiKeys", "secret"], Placeholder::new("••••1234").echoed());

    let GateOutcome::AllChangesMasked(masked) =
        ApplyGate::new(DisclosureLevel::Masked).evaluate(diff(&baseline, &edited))
    else {
        panic!("expected AllChangesMasked");
    };
    assert_eq!(capture_json(&masked.path_json()), json!(["apiKeys.secret"]));
}

#[test]
fn path_and_level_emit_strings() {
    let mut serializer = CapturingSerializer::new();
    serialize_to_capture(&FieldPath::from("email.smtp.host"), "path", &mut serializer);
    serialize_to_capture(&DisclosureLevel::Masked, "level", &mut serializer);
    assert_eq!(
        serializer.get("path"),
        Some(CapturedValue::Str("email.smtp.host".to_owned()))
    );
    assert_eq!(
        serializer.get("level"),
        Some(CapturedValue::Str("masked".to_owned()))
    );
}

// ============================================================================
// Session logging
// ============================================================================

/// A drain that keeps every record's message and key-value pairs.
#[derive(Clone, Default)]
struct MemoryDrain {
    records: Arc<Mutex<Vec<(String, HashMap<String, CapturedValue>)>>>,
}

impl Drain for MemoryDrain {
    type Ok = ();
    type Err = slog::Never;

    fn log(&self, record: &Record<'_>, values: &OwnedKVList) -> Result<(), slog::Never> {
        let mut serializer = CapturingSerializer::new();
        record.kv().serialize(record, &mut serializer).unwrap();
        values.serialize(record, &mut serializer).unwrap();
        self.records
            .lock()
            .unwrap()
            .push((record.msg().to_string(), serializer.snapshot()));
        Ok(())
    }
}

#[test]
fn session_logs_never_carry_values() {
    let store = tree(json!({
        "app": { "name": "Console" },
        "apiKeys": { "secret": "sk_live_abcd1234" }
    }));
    let table = ClassificationTable::new().classify("apiKeys.secret", FieldRule::secret());
    let drain = MemoryDrain::default();
    let logger = Logger::root(drain.clone(), o!());

    let mut session = EditSession::open(
        MemoryBackend::new(store, table.clone()),
        table,
        DisclosureLevel::Full,
        logger,
    )
    .unwrap();
    session.edit("apiKeys.secret", "sk_live_new_5678").unwrap();
    session.review().unwrap();
    session.confirm().unwrap();

    let records = drain.records.lock().unwrap();
    let messages: Vec<&str> = records.iter().map(|(msg, _)| msg.as_str()).collect();
    assert!(messages.contains(&"configuration loaded"));
    assert!(messages.contains(&"apply confirmed"));

    for (_, values) in records.iter() {
        let rendered = format!("{values:?}");
        assert!(!rendered.contains("sk_live"), "value leaked: {rendered}");
    }

    let (_, confirmed) = records
        .iter()
        .find(|(msg, _)| msg == "apply confirmed")
        .unwrap();
    assert_eq!(
        confirmed.get("summary"),
        Some(&CapturedValue::Serde(json!({ "apiKeys": ["secret"] })))
    );
}
