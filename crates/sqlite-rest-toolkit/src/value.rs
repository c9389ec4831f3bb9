//! The value domain shared by request parameters and result rows.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Blobs longer than this many bytes are projected as [`BLOB_PLACEHOLDER`].
pub const BLOB_PLACEHOLDER_THRESHOLD: usize = 1024;

/// Token substituted for oversized blob columns.
pub const BLOB_PLACEHOLDER: &str = "<BLOB>";

/// Column name → value map supplied for inserts and updates.
///
/// Insertion order is preserved, so an INSERT lists columns in the order the
/// caller supplied them.
pub type FieldMap = IndexMap<String, Value>;

/// A single SQL value.
///
/// The first five variants mirror SQLite's storage classes. `BlobPlaceholder`
/// only appears in query results, standing in for a blob longer than
/// [`BLOB_PLACEHOLDER_THRESHOLD`].
///
/// Serializes to plain JSON: numbers, strings and `null`; blobs become
/// standard base64 strings and the placeholder becomes `"<BLOB>"`.
/// Deserializes from any JSON value (see [`Value::from_json`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
   Null,
   Integer(i64),
   Real(f64),
   Text(String),
   Blob(Vec<u8>),
   BlobPlaceholder,
}

impl Value {
   /// Coerce a decoded JSON value into the SQL value domain.
   ///
   /// Never fails. Booleans become `1`/`0`, integers that do not fit in an
   /// `i64` become reals, and arrays/objects are kept as their compact JSON text.
   pub fn from_json(value: JsonValue) -> Self {
      match value {
         JsonValue::Null => Value::Null,
         JsonValue::Bool(b) => Value::Integer(i64::from(b)),
         JsonValue::Number(number) => {
            if let Some(int_val) = number.as_i64() {
               Value::Integer(int_val)
            } else {
               // u64 beyond i64::MAX or a fractional number
               Value::Real(number.as_f64().unwrap_or_default())
            }
         }
         JsonValue::String(s) => Value::Text(s),
         other => Value::Text(other.to_string()),
      }
   }

   /// Project a blob read from the database, applying the placeholder policy.
   pub fn from_blob(blob: Vec<u8>) -> Self {
      if blob.len() > BLOB_PLACEHOLDER_THRESHOLD {
         Value::BlobPlaceholder
      } else {
         Value::Blob(blob)
      }
   }

   /// Convert to the JSON value the transport layer will serialize.
   pub fn to_json(&self) -> JsonValue {
      match self {
         Value::Null => JsonValue::Null,
         Value::Integer(i) => JsonValue::from(*i),
         Value::Real(f) => JsonValue::from(*f),
         Value::Text(s) => JsonValue::String(s.clone()),
         Value::Blob(b) => JsonValue::String(STANDARD.encode(b)),
         Value::BlobPlaceholder => JsonValue::String(BLOB_PLACEHOLDER.to_string()),
      }
   }

   pub fn is_null(&self) -> bool {
      matches!(self, Value::Null)
   }

   pub fn as_i64(&self) -> Option<i64> {
      match self {
         Value::Integer(i) => Some(*i),
         _ => None,
      }
   }

   pub fn as_str(&self) -> Option<&str> {
      match self {
         Value::Text(s) => Some(s),
         _ => None,
      }
   }

   /// Textual rendering of a scalar, as SQLite would print it.
   ///
   /// Used for pragma results, which may come back as either text or integers.
   pub fn to_text(&self) -> Option<String> {
      match self {
         Value::Integer(i) => Some(i.to_string()),
         Value::Real(f) => Some(f.to_string()),
         Value::Text(s) => Some(s.clone()),
         _ => None,
      }
   }
}

impl From<JsonValue> for Value {
   fn from(value: JsonValue) -> Self {
      Value::from_json(value)
   }
}

impl From<i64> for Value {
   fn from(value: i64) -> Self {
      Value::Integer(value)
   }
}

impl From<f64> for Value {
   fn from(value: f64) -> Self {
      Value::Real(value)
   }
}

impl From<&str> for Value {
   fn from(value: &str) -> Self {
      Value::Text(value.to_string())
   }
}

impl From<String> for Value {
   fn from(value: String) -> Self {
      Value::Text(value)
   }
}

impl From<Vec<u8>> for Value {
   fn from(value: Vec<u8>) -> Self {
      Value::Blob(value)
   }
}

impl Serialize for Value {
   fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      match self {
         Value::Null => serializer.serialize_none(),
         Value::Integer(i) => serializer.serialize_i64(*i),
         Value::Real(f) => serializer.serialize_f64(*f),
         Value::Text(s) => serializer.serialize_str(s),
         Value::Blob(b) => serializer.serialize_str(&STANDARD.encode(b)),
         Value::BlobPlaceholder => serializer.serialize_str(BLOB_PLACEHOLDER),
      }
   }
}

impl<'de> Deserialize<'de> for Value {
   fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
   where
      D: Deserializer<'de>,
   {
      JsonValue::deserialize(deserializer).map(Value::from_json)
   }
}
