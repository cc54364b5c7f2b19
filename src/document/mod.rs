//! Document value model
//!
//! The structured value type the storage layer consumes: ordered named
//! fields, a three-way comparison per field under a direction, a binary
//! encoding and named-field lookup. Key patterns, per-dictionary options and
//! the identifying fragment appended to secondary index entries are all
//! documents.

mod codec;
mod value;

pub use codec::{document_size, DecodeError, DocumentReader, MIN_DOCUMENT_SIZE};
pub use value::{compare_values, Value, ValueRef};

pub(crate) use codec::{read_u32, read_value, take, write_payload};

use thiserror::Error;

/// An ordered list of named fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, Value)>,
}

/// JSON input that has no document representation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FromJsonError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("field '{field}' has unsupported JSON type {kind}")]
    Unsupported { field: String, kind: &'static str },
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First field with the given name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Encode as a self-delimiting binary document
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.fields.len() * 16);
        out.extend_from_slice(&[0u8; 4]);
        for (name, value) in &self.fields {
            let value = value.as_value_ref();
            out.push(value.tag());
            out.extend_from_slice(name.as_bytes());
            out.push(0);
            write_payload(&mut out, value);
        }
        out.push(0);
        let size = out.len() as u32;
        out[..4].copy_from_slice(&size.to_le_bytes());
        out
    }

    /// Decode a document from the start of `buf`.
    ///
    /// Returns the document and the number of bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut reader = DocumentReader::new(buf)?;
        let mut doc = Document::new();
        while let Some((name, value)) = reader.next_element()? {
            let name = std::str::from_utf8(name).map_err(|_| DecodeError::BadName)?;
            doc.push(name, value.to_value());
        }
        Ok((doc, reader.size()))
    }

    /// Convert a flat JSON object.
    ///
    /// Integers become `Int`, other numbers `Double`. Nested objects and
    /// arrays are not representable.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, FromJsonError> {
        let object = match json {
            serde_json::Value::Object(map) => map,
            other => return Err(FromJsonError::NotAnObject(json_kind(other))),
        };
        let mut doc = Document::new();
        for (name, value) in object {
            let converted = match value {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(b) => Value::Bool(*b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => Value::Int(i),
                    None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
                },
                serde_json::Value::String(s) => Value::String(s.clone()),
                other => {
                    return Err(FromJsonError::Unsupported {
                        field: name.clone(),
                        kind: json_kind(other),
                    })
                }
            };
            doc.push(name.clone(), converted);
        }
        Ok(doc)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}: {}", name, value)?;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_decode_preserves_field_order() {
        let doc = Document::new()
            .with("b", 1)
            .with("a", "x")
            .with("c", Value::ObjectId([7; 12]))
            .with("d", Value::Null);
        let bytes = doc.encode();
        let (decoded, used) = Document::decode(&bytes).unwrap();
        assert_eq!(decoded, doc);
        assert_eq!(used, bytes.len());
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let doc = Document::new().with("_id", 5);
        let mut bytes = doc.encode();
        let len = bytes.len();
        bytes.extend_from_slice(b"trailing");
        let (_, used) = Document::decode(&bytes).unwrap();
        assert_eq!(used, len);
    }

    #[test]
    fn test_from_json_key_pattern() {
        let doc = Document::from_json(&json!({"a": 1, "b": -1, "c": "hashed"})).unwrap();
        assert_eq!(doc.get("a"), Some(&Value::Int(1)));
        assert_eq!(doc.get("b"), Some(&Value::Int(-1)));
        assert_eq!(doc.get("c").and_then(Value::as_str), Some("hashed"));
    }

    #[test]
    fn test_from_json_rejects_nested() {
        let err = Document::from_json(&json!({"a": {"b": 1}})).unwrap_err();
        assert!(matches!(err, FromJsonError::Unsupported { kind: "object", .. }));
        assert!(Document::from_json(&json!([1])).is_err());
    }

    #[test]
    fn test_display() {
        let doc = Document::new().with("a", 1).with("b", -1);
        assert_eq!(doc.to_string(), "{ a: 1, b: -1 }");
    }
}
