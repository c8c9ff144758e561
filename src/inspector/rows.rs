//! BSON to JSON row shaping
//!
//! ObjectIds become hex strings and datetimes become RFC 3339 strings with
//! millisecond precision, at any depth. Everything else is relaxed extended
//! JSON.

use bson::{Bson, Document};
use chrono::SecondsFormat;
use serde_json::{Map, Value};

pub fn document_to_json(document: &Document) -> Value {
    let map: Map<String, Value> = document
        .iter()
        .map(|(key, value)| (key.clone(), bson_to_json(value)))
        .collect();
    Value::Object(map)
}

pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(
            dt.to_chrono()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(document) => document_to_json(document),
        other => other.clone().into_relaxed_extjson(),
    }
}
