//! Encoded index entries
//!
//! ```text
//! +-------------------------------+
//! | Key size (u32 LE)             |  includes itself
//! +-------------------------------+
//! | tag | payload                 |  one per key field
//! +-------------------------------+
//! | Identifying fragment          |  optional, an encoded document
//! +-------------------------------+
//! ```
//!
//! The leading component is self-describing, so the comparator can find
//! where the fragment starts without knowing the key pattern.

use crate::document::{read_u32, read_value, take, write_payload, DecodeError, Document, Value, ValueRef};

const HEADER_LEN: usize = 4;

/// Encode a leading key component
pub fn encode_key(values: &[Value]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + values.len() * 9);
    out.extend_from_slice(&[0u8; HEADER_LEN]);
    for value in values {
        let value = value.as_value_ref();
        out.push(value.tag());
        write_payload(&mut out, value);
    }
    let size = out.len() as u32;
    out[..HEADER_LEN].copy_from_slice(&size.to_le_bytes());
    out
}

/// Encode a full entry: the key, then the identifying fragment if any.
///
/// Secondary indexes append the fragment so duplicate keys stay distinct;
/// within one dictionary every entry has one or none does.
pub fn encode_entry(values: &[Value], fragment: Option<&Document>) -> Vec<u8> {
    let mut out = encode_key(values);
    if let Some(doc) = fragment {
        out.extend_from_slice(&doc.encode());
    }
    out
}

/// A borrowed, validated leading key component
#[derive(Debug, Clone, Copy)]
pub struct LeadingKey<'a> {
    bytes: &'a [u8],
}

impl<'a> LeadingKey<'a> {
    /// Parse the leading component at the start of `buf`
    pub fn parse(buf: &'a [u8]) -> Result<Self, DecodeError> {
        let declared = read_u32(buf, 0)? as usize;
        if declared < HEADER_LEN || declared > buf.len() {
            return Err(DecodeError::BadSize { declared, available: buf.len() });
        }
        Ok(Self { bytes: &buf[..declared] })
    }

    /// Size in bytes of the leading component
    pub fn data_size(&self) -> usize {
        self.bytes.len()
    }

    pub fn values(&self) -> KeyValues<'a> {
        KeyValues { bytes: self.bytes, pos: HEADER_LEN }
    }

    /// Decode into owned values
    pub fn to_values(&self) -> Result<Vec<Value>, DecodeError> {
        self.values().map(|v| v.map(|v| v.to_value())).collect()
    }
}

/// Iterator over the fields of a leading key component
#[derive(Debug, Clone)]
pub struct KeyValues<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for KeyValues<'a> {
    type Item = Result<ValueRef<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let bytes: &'a [u8] = self.bytes;
        let result = take(bytes, self.pos, 1).and_then(|t| read_value(bytes, t[0], self.pos + 1));
        match result {
            Ok((value, next)) => {
                self.pos = next;
                Some(Ok(value))
            }
            Err(e) => {
                self.pos = self.bytes.len();
                Some(Err(e))
            }
        }
    }
}

/// Split an entry into its leading component and the remaining bytes
pub fn split_entry(buf: &[u8]) -> Result<(LeadingKey<'_>, &[u8]), DecodeError> {
    let key = LeadingKey::parse(buf)?;
    Ok((key, &buf[key.data_size()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_without_fragment_has_no_remainder() {
        let entry = encode_entry(&[Value::Int(1), Value::from("x")], None);
        let (key, rest) = split_entry(&entry).unwrap();
        assert!(rest.is_empty());
        assert_eq!(key.to_values().unwrap(), vec![Value::Int(1), Value::from("x")]);
    }

    #[test]
    fn test_entry_with_fragment() {
        let id = Document::new().with("_id", 42);
        let entry = encode_entry(&[Value::Bool(true)], Some(&id));
        let (key, rest) = split_entry(&entry).unwrap();
        assert_eq!(key.to_values().unwrap(), vec![Value::Bool(true)]);
        assert_eq!(Document::decode(rest).unwrap().0, id);
    }

    #[test]
    fn test_declared_size_past_buffer_is_rejected() {
        let mut entry = encode_key(&[Value::Int(9)]);
        entry[0] = 200;
        assert!(matches!(LeadingKey::parse(&entry), Err(DecodeError::BadSize { declared: 200, .. })));
    }

    #[test]
    fn test_empty_key() {
        let entry = encode_key(&[]);
        assert_eq!(entry.len(), 4);
        assert_eq!(LeadingKey::parse(&entry).unwrap().values().count(), 0);
    }
}
