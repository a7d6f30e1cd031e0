//! Document and identifier primitives shared by models, queries and drivers.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// A stored document: an ordered map of field names to JSON values
pub type Document = serde_json::Map<String, Value>;

/// Key under which every document stores its identifier
pub const ID_FIELD: &str = "_id";

/// Globally unique document identifier.
///
/// The nil value is the "unset" sentinel: a model whose id is nil has never
/// been persisted and will be inserted on save.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The unset sentinel
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn parse_str(input: &str) -> ModelResult<Self> {
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| ModelError::Serialization(format!("invalid object id '{}': {}", input, e)))
    }

    /// Read an identifier back out of a stored `_id` value
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(|s| Uuid::parse_str(s).ok()).map(Self)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::String(id.0.to_string())
    }
}

/// Filter selecting a single document by identifier
pub fn id_filter(id: impl Into<Value>) -> Document {
    let mut filter = Document::new();
    filter.insert(ID_FIELD.to_string(), id.into());
    filter
}

/// Serialize a value into a document; the value must encode as a JSON object
pub fn to_document<T: Serialize + ?Sized>(value: &T) -> ModelResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ModelError::Serialization(format!(
            "expected an object, got {}",
            value_kind(&other)
        ))),
    }
}

/// Decode a stored document into a typed value
pub fn from_document<T: DeserializeOwned>(document: Document) -> ModelResult<T> {
    serde_json::from_value(Value::Object(document))
        .map_err(|e| ModelError::Serialization(format!("failed to decode document: {}", e)))
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_id_nil_is_unset() {
        assert!(ObjectId::nil().is_nil());
        assert!(ObjectId::default().is_nil());
        assert!(!ObjectId::new().is_nil());
        assert_ne!(ObjectId::new(), ObjectId::new());
    }

    #[test]
    fn test_object_id_string_forms() {
        let id = ObjectId::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(format!("{:?}", id), "ObjectId(\"550e8400-e29b-41d4-a716-446655440000\")");
        assert_eq!(Value::from(id), json!("550e8400-e29b-41d4-a716-446655440000"));
        assert_eq!(ObjectId::from_value(&Value::from(id)), Some(id));
        assert!("not-an-id".parse::<ObjectId>().is_err());
    }

    #[test]
    fn test_to_document_requires_object() {
        assert!(to_document(&json!({"name": "Alice"})).is_ok());

        let err = to_document(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("expected an object, got array"));
    }

    #[test]
    fn test_id_filter() {
        let id = ObjectId::new();
        let filter = id_filter(id);
        assert_eq!(filter.get("_id"), Some(&Value::from(id)));
    }
}
