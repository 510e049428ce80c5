//! Conversion between the BSON and JSON document representations.
//!
//! Both access-layer flavors share one wire form (BSON); JSON-flavored
//! documents cross this boundary on every read and write. The conversion is
//! a pure transformation and never drops a field: a value with no faithful
//! counterpart on the other side is an encoding error.
//!
//! Lossy-but-useful mappings going from BSON to JSON:
//!
//! - `DateTime` becomes an RFC 3339 string
//! - `ObjectId` becomes its hex string
//! - `Decimal128` becomes its string form
//! - UUID binaries become the canonical UUID string
//!
//! Going from JSON to BSON, integral numbers become `Int64` and fractional
//! numbers become `Double`; strings stay strings (no date or id sniffing).

use bson::{Bson, Document, spec::BinarySubtype};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::error::{DaoError, DaoResult};

/// Converts one BSON value into its JSON representation.
pub fn bson_to_json(value: &Bson) -> DaoResult<Value> {
    match value {
        Bson::Null => Ok(Value::Null),
        Bson::Boolean(value) => Ok(Value::Bool(*value)),
        Bson::Int32(value) => Ok(Value::Number((*value as i64).into())),
        Bson::Int64(value) => Ok(Value::Number((*value).into())),
        Bson::Double(value) => Number::from_f64(*value)
            .map(Value::Number)
            .ok_or_else(|| {
                DaoError::Encoding(format!("non-finite double {value} has no JSON form"))
            }),
        Bson::String(value) => Ok(Value::String(value.clone())),
        Bson::Array(items) => Ok(Value::Array(
            items
                .iter()
                .map(bson_to_json)
                .collect::<DaoResult<Vec<_>>>()?,
        )),
        Bson::Document(doc) => Ok(Value::Object(document_to_json(doc)?)),
        Bson::DateTime(value) => Ok(Value::String(
            value
                .try_to_rfc3339_string()
                .map_err(|e| DaoError::Encoding(e.to_string()))?,
        )),
        Bson::ObjectId(oid) => Ok(Value::String(oid.to_hex())),
        Bson::Decimal128(value) => Ok(Value::String(value.to_string())),
        Bson::Binary(binary) if binary.subtype == BinarySubtype::Uuid => {
            Uuid::from_slice(&binary.bytes)
                .map(|uuid| Value::String(uuid.to_string()))
                .map_err(|e| DaoError::Encoding(e.to_string()))
        }
        other => Err(DaoError::Encoding(format!(
            "BSON value {other:?} has no JSON representation"
        ))),
    }
}

/// Converts one JSON value into its BSON representation.
pub fn json_to_bson(value: &Value) -> DaoResult<Bson> {
    match value {
        Value::Null => Ok(Bson::Null),
        Value::Bool(value) => Ok(Bson::Boolean(*value)),
        Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Ok(Bson::Int64(value))
            } else if number.as_u64().is_some() {
                // representable as f64 only by losing precision
                Err(DaoError::Encoding(format!(
                    "integer {number} does not fit a signed BSON integer"
                )))
            } else if let Some(value) = number.as_f64() {
                Ok(Bson::Double(value))
            } else {
                Err(DaoError::Encoding(format!(
                    "number {number} does not fit a BSON integer or double"
                )))
            }
        }
        Value::String(value) => Ok(Bson::String(value.clone())),
        Value::Array(items) => Ok(Bson::Array(
            items
                .iter()
                .map(json_to_bson)
                .collect::<DaoResult<Vec<_>>>()?,
        )),
        Value::Object(map) => Ok(Bson::Document(json_to_document(map)?)),
    }
}

/// Converts a BSON document into an ordered JSON object.
pub fn document_to_json(doc: &Document) -> DaoResult<Map<String, Value>> {
    doc.iter()
        .map(|(field, value)| Ok((field.clone(), bson_to_json(value)?)))
        .collect()
}

/// Converts a JSON object into a BSON document, preserving field order.
pub fn json_to_document(map: &Map<String, Value>) -> DaoResult<Document> {
    map.iter()
        .map(|(field, value)| Ok((field.clone(), json_to_bson(value)?)))
        .collect()
}
