//! The two document representations behind one abstract contract.
//!
//! Access objects are generic over a [`DocumentFormat`]: the type of the
//! ordered field map they hand to callers and accept as request documents.
//! Two instantiations exist, [`BsonFormat`] and [`JsonFormat`]; both reach
//! the driver through the same BSON wire form, with the JSON flavor crossing
//! the [`codec`](crate::codec) boundary on every read and write.
//!
//! The trait is the complete capability set an access object needs: request
//! assembly primitives, model encode/decode, and the wire boundary. No
//! capability is looked up ambiently; everything is threaded through these
//! associated functions.

use bson::{Bson, Document, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, from_value, to_value};
use std::fmt::Debug;

use crate::{
    codec,
    error::{DaoError, DaoResult},
};

/// A document representation plus the capabilities to build and convert it.
pub trait DocumentFormat: Send + Sync + 'static {
    /// Ordered field map used for models and request documents.
    type Doc: Clone + Debug + Send + Sync + 'static;
    /// A single node within a document.
    type Value: Clone + Debug + Send + Sync + 'static;

    /// Returns an empty document.
    fn empty() -> Self::Doc;

    /// Writes a field into a document under construction.
    ///
    /// A repeated field name keeps the last value written.
    fn insert(doc: &mut Self::Doc, field: &str, value: Self::Value);

    /// Wraps a document as a value so it can nest.
    fn into_value(doc: Self::Doc) -> Self::Value;

    /// Wraps values as an array value.
    fn array(values: Vec<Self::Value>) -> Self::Value;

    /// A bare string value.
    fn string(value: &str) -> Self::Value;

    /// Encodes any serializable value into this representation.
    ///
    /// # Errors
    ///
    /// Returns an [`Encoding`](DaoError::Encoding) error if the value cannot
    /// be represented; nothing is silently dropped.
    fn encode_value<T: Serialize + ?Sized>(value: &T) -> DaoResult<Self::Value>;

    /// Encodes a model into its document form.
    fn encode_model<M: Serialize>(model: &M) -> DaoResult<Self::Doc>;

    /// Decodes a model from its document form.
    fn decode_model<M: DeserializeOwned>(doc: Self::Doc) -> DaoResult<M>;

    /// Converts a document to the wire form handed to the driver.
    fn into_wire(doc: Self::Doc) -> DaoResult<Document>;

    /// Converts a wire document back into this representation.
    fn from_wire(doc: Document) -> DaoResult<Self::Doc>;

    /// Converts a single value to its wire form.
    fn value_into_wire(value: Self::Value) -> DaoResult<Bson>;
}

/// The BSON flavor: documents are [`bson::Document`] trees, wire conversion
/// is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct BsonFormat;

impl DocumentFormat for BsonFormat {
    type Doc = Document;
    type Value = Bson;

    fn empty() -> Document {
        Document::new()
    }

    fn insert(doc: &mut Document, field: &str, value: Bson) {
        doc.insert(field.to_string(), value);
    }

    fn into_value(doc: Document) -> Bson {
        Bson::Document(doc)
    }

    fn array(values: Vec<Bson>) -> Bson {
        Bson::Array(values)
    }

    fn string(value: &str) -> Bson {
        Bson::String(value.to_string())
    }

    fn encode_value<T: Serialize + ?Sized>(value: &T) -> DaoResult<Bson> {
        Ok(serialize_to_bson(&value)?)
    }

    fn encode_model<M: Serialize>(model: &M) -> DaoResult<Document> {
        match serialize_to_bson(model)? {
            Bson::Document(doc) => Ok(doc),
            other => Err(DaoError::Encoding(format!(
                "model serialized to {other:?} instead of a document"
            ))),
        }
    }

    fn decode_model<M: DeserializeOwned>(doc: Document) -> DaoResult<M> {
        Ok(deserialize_from_bson(Bson::Document(doc))?)
    }

    fn into_wire(doc: Document) -> DaoResult<Document> {
        Ok(doc)
    }

    fn from_wire(doc: Document) -> DaoResult<Document> {
        Ok(doc)
    }

    fn value_into_wire(value: Bson) -> DaoResult<Bson> {
        Ok(value)
    }
}

/// The JSON flavor: documents are ordered [`serde_json::Map`]s, converted to
/// and from BSON at the wire boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl DocumentFormat for JsonFormat {
    type Doc = Map<String, Value>;
    type Value = Value;

    fn empty() -> Map<String, Value> {
        Map::new()
    }

    fn insert(doc: &mut Map<String, Value>, field: &str, value: Value) {
        doc.insert(field.to_string(), value);
    }

    fn into_value(doc: Map<String, Value>) -> Value {
        Value::Object(doc)
    }

    fn array(values: Vec<Value>) -> Value {
        Value::Array(values)
    }

    fn string(value: &str) -> Value {
        Value::String(value.to_string())
    }

    fn encode_value<T: Serialize + ?Sized>(value: &T) -> DaoResult<Value> {
        Ok(to_value(value)?)
    }

    fn encode_model<M: Serialize>(model: &M) -> DaoResult<Map<String, Value>> {
        match to_value(model)? {
            Value::Object(doc) => Ok(doc),
            other => Err(DaoError::Encoding(format!(
                "model serialized to non-object JSON value: {other}"
            ))),
        }
    }

    fn decode_model<M: DeserializeOwned>(doc: Map<String, Value>) -> DaoResult<M> {
        Ok(from_value(Value::Object(doc))?)
    }

    fn into_wire(doc: Map<String, Value>) -> DaoResult<Document> {
        codec::json_to_document(&doc)
    }

    fn from_wire(doc: Document) -> DaoResult<Map<String, Value>> {
        codec::document_to_json(&doc)
    }

    fn value_into_wire(value: Value) -> DaoResult<Bson> {
        codec::json_to_bson(&value)
    }
}
