//! Per-field sort directions derived from an index key pattern
//!
//! The descriptor persisted with every dictionary is the 4-byte
//! little-endian encoding of the direction bitmask: bit `i` is set when
//! key-pattern field `i` sorts descending.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;

use crate::document::{Document, Value};
use crate::errors::{StoreError, StoreResult};

/// Immutable field-direction descriptor for a composite key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyOrdering {
    bits: u32,
}

impl KeyOrdering {
    /// Size in bytes of the persisted descriptor
    pub const ENCODED_LEN: usize = 4;

    /// Most fields a key pattern may have
    pub const MAX_FIELDS: usize = 32;

    /// All fields ascending; the ordering applied to identifying fragments
    pub const fn ascending() -> Self {
        Self { bits: 0 }
    }

    /// Derive the ordering from a key pattern such as `{a: 1, b: -1}`.
    ///
    /// A field is descending iff its value is a negative number; any other
    /// value (e.g. `"hashed"`) is ascending.
    pub fn from_key_pattern(pattern: &Document) -> StoreResult<Self> {
        if pattern.len() > Self::MAX_FIELDS {
            return Err(StoreError::invalid_key_pattern(format!(
                "key pattern has {} fields, at most {} are supported",
                pattern.len(),
                Self::MAX_FIELDS
            ))
            .with_details(format!("key: {}", pattern)));
        }
        let mut bits = 0u32;
        for (i, (_, value)) in pattern.iter().enumerate() {
            if is_descending(value) {
                bits |= 1 << i;
            }
        }
        Ok(Self { bits })
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Direction of field `i`. Fields past the bitmask are ascending.
    pub fn is_descending(&self, field: usize) -> bool {
        field < Self::MAX_FIELDS && self.bits & (1 << field) != 0
    }

    /// Apply field `i`'s direction to an ascending comparison
    pub fn apply(&self, field: usize, ascending: CmpOrdering) -> CmpOrdering {
        if self.is_descending(field) {
            ascending.reverse()
        } else {
            ascending
        }
    }

    /// The persisted descriptor bytes
    pub fn to_descriptor(&self) -> [u8; Self::ENCODED_LEN] {
        self.bits.to_le_bytes()
    }

    /// Read a descriptor. `None` unless exactly `ENCODED_LEN` bytes.
    pub fn from_descriptor(descriptor: &[u8]) -> Option<Self> {
        let raw: [u8; Self::ENCODED_LEN] = descriptor.try_into().ok()?;
        Some(Self { bits: u32::from_le_bytes(raw) })
    }
}

fn is_descending(value: &Value) -> bool {
    value.as_f64().map(|n| n < 0.0).unwrap_or(false)
}

impl fmt::Display for KeyOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyOrdering({:#010x})", self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions_from_pattern() {
        let pattern = Document::new().with("a", 1).with("b", -1).with("c", -1.5).with("d", "hashed");
        let ordering = KeyOrdering::from_key_pattern(&pattern).unwrap();
        assert!(!ordering.is_descending(0));
        assert!(ordering.is_descending(1));
        assert!(ordering.is_descending(2));
        assert!(!ordering.is_descending(3));
        assert_eq!(ordering.bits(), 0b0110);
    }

    #[test]
    fn test_descriptor_is_fixed_size_le() {
        let ordering = KeyOrdering::from_bits(0x0102_0304);
        assert_eq!(ordering.to_descriptor(), [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(KeyOrdering::from_descriptor(&ordering.to_descriptor()), Some(ordering));
        assert_eq!(KeyOrdering::from_descriptor(&[1, 2, 3]), None);
        assert_eq!(KeyOrdering::from_descriptor(&[1, 2, 3, 4, 5]), None);
    }

    #[test]
    fn test_too_many_fields_rejected() {
        let mut pattern = Document::new();
        for i in 0..33 {
            pattern.push(format!("f{}", i), 1);
        }
        let err = KeyOrdering::from_key_pattern(&pattern).unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::InvalidKeyPattern);
    }

    #[test]
    fn test_fields_past_mask_are_ascending() {
        let ordering = KeyOrdering::from_bits(u32::MAX);
        assert!(ordering.is_descending(31));
        assert!(!ordering.is_descending(32));
        assert_eq!(ordering.apply(40, CmpOrdering::Less), CmpOrdering::Less);
    }
}
