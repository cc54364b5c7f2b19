//! Binary encoding for values and documents
//!
//! Value payloads (after a one-byte type tag):
//!
//! ```text
//! Double    8 bytes, f64 LE
//! Int       8 bytes, i64 LE
//! String    u32 LE length + bytes
//! Binary    u32 LE length + bytes
//! ObjectId  12 bytes
//! Bool      1 byte (0 or 1)
//! Null, MinKey, MaxKey: no payload
//! ```
//!
//! Document layout:
//!
//! ```text
//! +-----------------------------+
//! | Total size (u32 LE)         |  includes itself and the terminator
//! +-----------------------------+
//! | tag | name bytes | 0x00 |   |  repeated per element
//! | payload                     |
//! +-----------------------------+
//! | 0x00 terminator             |
//! +-----------------------------+
//! ```

use thiserror::Error;

use super::value::{tag, ValueRef};

/// Smallest valid document: size header + terminator
pub const MIN_DOCUMENT_SIZE: usize = 5;

/// Errors decoding a value, key or document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("buffer truncated: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unknown type tag {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("declared size {declared} is invalid for a buffer of {available} bytes")]
    BadSize { declared: usize, available: usize },

    #[error("field name at offset {offset} is not terminated")]
    UnterminatedName { offset: usize },

    #[error("invalid bool byte {byte:#04x} at offset {offset}")]
    BadBool { byte: u8, offset: usize },

    #[error("field name is not valid UTF-8")]
    BadName,
}

pub(crate) fn take(buf: &[u8], offset: usize, needed: usize) -> Result<&[u8], DecodeError> {
    buf.get(offset..offset.saturating_add(needed))
        .filter(|s| s.len() == needed)
        .ok_or(DecodeError::Truncated {
            offset,
            needed,
            available: buf.len().saturating_sub(offset),
        })
}

pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Result<u32, DecodeError> {
    let bytes = take(buf, offset, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_u64(buf: &[u8], offset: usize) -> Result<u64, DecodeError> {
    let bytes = take(buf, offset, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}

/// Read the payload for `tag_byte` starting at `offset`.
///
/// Returns the value and the offset just past it.
pub(crate) fn read_value(
    buf: &[u8],
    tag_byte: u8,
    offset: usize,
) -> Result<(ValueRef<'_>, usize), DecodeError> {
    match tag_byte {
        tag::MIN_KEY => Ok((ValueRef::MinKey, offset)),
        tag::MAX_KEY => Ok((ValueRef::MaxKey, offset)),
        tag::NULL => Ok((ValueRef::Null, offset)),
        tag::INT => Ok((ValueRef::Int(read_u64(buf, offset)? as i64), offset + 8)),
        tag::DOUBLE => Ok((
            ValueRef::Double(f64::from_bits(read_u64(buf, offset)?)),
            offset + 8,
        )),
        tag::STRING | tag::BINARY => {
            let len = read_u32(buf, offset)? as usize;
            let bytes = take(buf, offset + 4, len)?;
            let value = if tag_byte == tag::STRING {
                ValueRef::String(bytes)
            } else {
                ValueRef::Binary(bytes)
            };
            Ok((value, offset + 4 + len))
        }
        tag::OBJECT_ID => {
            let bytes = take(buf, offset, 12)?;
            let oid: &[u8; 12] = bytes
                .try_into()
                .map_err(|_| DecodeError::Truncated { offset, needed: 12, available: bytes.len() })?;
            Ok((ValueRef::ObjectId(oid), offset + 12))
        }
        tag::BOOL => {
            let byte = take(buf, offset, 1)?[0];
            match byte {
                0 => Ok((ValueRef::Bool(false), offset + 1)),
                1 => Ok((ValueRef::Bool(true), offset + 1)),
                _ => Err(DecodeError::BadBool { byte, offset }),
            }
        }
        other => Err(DecodeError::UnknownTag { tag: other, offset: offset.saturating_sub(1) }),
    }
}

/// Append the payload of `value` (without its tag)
pub(crate) fn write_payload(out: &mut Vec<u8>, value: ValueRef<'_>) {
    match value {
        ValueRef::MinKey | ValueRef::MaxKey | ValueRef::Null => {}
        ValueRef::Int(n) => out.extend_from_slice(&n.to_le_bytes()),
        ValueRef::Double(d) => out.extend_from_slice(&d.to_bits().to_le_bytes()),
        ValueRef::String(bytes) | ValueRef::Binary(bytes) => {
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        ValueRef::ObjectId(oid) => out.extend_from_slice(oid),
        ValueRef::Bool(b) => out.push(u8::from(b)),
    }
}

/// Borrowing iterator over the elements of an encoded document
#[derive(Debug, Clone)]
pub struct DocumentReader<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> DocumentReader<'a> {
    /// Validate the size header and position before the first element.
    ///
    /// `buf` may extend past the document; only the declared size is read.
    pub fn new(buf: &'a [u8]) -> Result<Self, DecodeError> {
        let size = document_size(buf)?;
        Ok(Self { buf: &buf[..size], pos: 4, end: size - 1 })
    }

    /// Size in bytes of the underlying document
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    /// Next element, `Ok(None)` at the terminator
    pub fn next_element(&mut self) -> Result<Option<(&'a [u8], ValueRef<'a>)>, DecodeError> {
        if self.pos >= self.end {
            return Ok(None);
        }
        let buf: &'a [u8] = self.buf;
        let tag_byte = buf[self.pos];
        let name_start = self.pos + 1;
        let name_len = buf[name_start..self.end]
            .iter()
            .position(|&b| b == 0)
            .ok_or(DecodeError::UnterminatedName { offset: name_start })?;
        let name = &buf[name_start..name_start + name_len];
        let (value, next) = read_value(&buf[..self.end], tag_byte, name_start + name_len + 1)?;
        self.pos = next;
        Ok(Some((name, value)))
    }
}

/// Declared size of the document at the start of `buf`, validated against it
pub fn document_size(buf: &[u8]) -> Result<usize, DecodeError> {
    let declared = read_u32(buf, 0)? as usize;
    if declared < MIN_DOCUMENT_SIZE || declared > buf.len() {
        return Err(DecodeError::BadSize { declared, available: buf.len() });
    }
    if buf[declared - 1] != 0 {
        return Err(DecodeError::BadSize { declared, available: buf.len() });
    }
    Ok(declared)
}
