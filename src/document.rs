use mongodb::bson::{Bson, Document, oid::ObjectId};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// parse_object_id
///
/// Converts a path segment into the `_id` used by every collection. Anything that is
/// not a 24-character hex string is rejected as `AppError::InvalidId`.
pub fn parse_object_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| AppError::InvalidId(raw.to_string()))
}

/// to_json
///
/// Renders a stored BSON value the way the web client expects it: ObjectIds become
/// their hex string and dates become RFC 3339 strings. Everything else follows the
/// relaxed Extended JSON mapping, so plain numbers, strings and booleans stay plain.
pub fn to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(text) => Value::String(text),
            Err(_) => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: Document) -> Value {
    let map: Map<String, Value> = doc.into_iter().map(|(k, v)| (k, to_json(v))).collect();
    Value::Object(map)
}

/// Array form of a query result.
pub fn documents_to_json(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(document_to_json).collect())
}

/// `null` when the lookup found nothing, matching a `findOne` miss.
pub fn optional_document_to_json(doc: Option<Document>) -> Value {
    doc.map(document_to_json).unwrap_or(Value::Null)
}
