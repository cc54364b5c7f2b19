//! Composite key comparator
//!
//! Invoked by the engine on every key comparison, from many threads at once.
//! It reads only its inputs and the immutable ordering, does not allocate on
//! the success path, and never returns an error: an entry pair that breaks
//! the fragment invariant, or that does not decode, terminates the process.

use std::cmp::Ordering as CmpOrdering;
use std::fmt::Write as _;

use thiserror::Error;

use crate::document::{compare_values, DecodeError, DocumentReader};
use crate::errors::{fatal, ErrorCode};
use crate::observability::{Event, Logger};

use super::encoding::split_entry;
use super::ordering::KeyOrdering;

/// Why two entries could not be compared
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("left entry does not decode: {0}")]
    Left(DecodeError),

    #[error("right entry does not decode: {0}")]
    Right(DecodeError),

    #[error("identifying fragment present on one entry only (left: {left}, right: {right})")]
    FragmentMismatch { left: bool, right: bool },
}

/// Compare two encoded entries, reporting invariant violations as errors
pub fn try_compare(a: &[u8], b: &[u8], ordering: &KeyOrdering) -> Result<CmpOrdering, CompareError> {
    let (key_a, rest_a) = split_entry(a).map_err(CompareError::Left)?;
    let (key_b, rest_b) = split_entry(b).map_err(CompareError::Right)?;

    let mut left = key_a.values();
    let mut right = key_b.values();
    let mut field = 0;
    loop {
        match (left.next(), right.next()) {
            (None, None) => break,
            (None, Some(r)) => {
                r.map_err(CompareError::Right)?;
                return Ok(CmpOrdering::Less);
            }
            (Some(l), None) => {
                l.map_err(CompareError::Left)?;
                return Ok(CmpOrdering::Greater);
            }
            (Some(l), Some(r)) => {
                let l = l.map_err(CompareError::Left)?;
                let r = r.map_err(CompareError::Right)?;
                let c = ordering.apply(field, compare_values(l, r));
                if c != CmpOrdering::Equal {
                    return Ok(c);
                }
            }
        }
        field += 1;
    }

    match (rest_a.is_empty(), rest_b.is_empty()) {
        (true, true) => Ok(CmpOrdering::Equal),
        (false, false) => compare_fragments(rest_a, rest_b),
        (left_empty, right_empty) => Err(CompareError::FragmentMismatch {
            left: !left_empty,
            right: !right_empty,
        }),
    }
}

fn compare_fragments(a: &[u8], b: &[u8]) -> Result<CmpOrdering, CompareError> {
    let mut left = DocumentReader::new(a).map_err(CompareError::Left)?;
    let mut right = DocumentReader::new(b).map_err(CompareError::Right)?;
    compare_readers(&mut left, &mut right, &KeyOrdering::ascending())
}

/// Compare two encoded documents element by element under `ordering`.
///
/// Values first, then field names; a document that runs out of elements
/// first sorts first.
pub fn compare_documents(a: &[u8], b: &[u8], ordering: &KeyOrdering) -> Result<CmpOrdering, CompareError> {
    let mut left = DocumentReader::new(a).map_err(CompareError::Left)?;
    let mut right = DocumentReader::new(b).map_err(CompareError::Right)?;
    compare_readers(&mut left, &mut right, ordering)
}

fn compare_readers(
    left: &mut DocumentReader<'_>,
    right: &mut DocumentReader<'_>,
    ordering: &KeyOrdering,
) -> Result<CmpOrdering, CompareError> {
    let mut field = 0;
    loop {
        let l = left.next_element().map_err(CompareError::Left)?;
        let r = right.next_element().map_err(CompareError::Right)?;
        match (l, r) {
            (None, None) => return Ok(CmpOrdering::Equal),
            (None, Some(_)) => return Ok(CmpOrdering::Less),
            (Some(_), None) => return Ok(CmpOrdering::Greater),
            (Some((name_l, l)), Some((name_r, r))) => {
                let c = ordering.apply(field, compare_values(l, r));
                if c != CmpOrdering::Equal {
                    return Ok(c);
                }
                let c = name_l.cmp(name_r);
                if c != CmpOrdering::Equal {
                    return Ok(c);
                }
            }
        }
        field += 1;
    }
}

/// Compare two encoded entries. Terminates the process on an invariant
/// violation.
pub fn compare_entries(a: &[u8], b: &[u8], ordering: &KeyOrdering) -> CmpOrdering {
    match try_compare(a, b, ordering) {
        Ok(c) => c,
        Err(err) => comparator_failure(&err, a, b, ordering),
    }
}

/// Engine-facing trampoline.
///
/// The engine hands over the dictionary's stored descriptor with each pair
/// of keys. The ordering is rebuilt from those bytes on the stack, so no
/// state is shared between invocations.
pub fn compare_with_descriptor(descriptor: &[u8], a: &[u8], b: &[u8]) -> CmpOrdering {
    match KeyOrdering::from_descriptor(descriptor) {
        Some(ordering) => compare_entries(a, b, &ordering),
        None => {
            let len = descriptor.len().to_string();
            Logger::fatal(
                Event::ComparatorFailure.as_str(),
                &[("descriptor_len", len.as_str()), ("reason", "malformed ordering descriptor")],
            );
            fatal::halt(
                ErrorCode::ComparatorFailure,
                "ordering descriptor has the wrong size",
                "compare",
            )
        }
    }
}

fn comparator_failure(err: &CompareError, a: &[u8], b: &[u8], ordering: &KeyOrdering) -> ! {
    let reason = err.to_string();
    let ordering = ordering.to_string();
    let left = hex(a);
    let right = hex(b);
    let left_len = a.len().to_string();
    let right_len = b.len().to_string();
    Logger::fatal(
        Event::ComparatorFailure.as_str(),
        &[
            ("left", left.as_str()),
            ("left_len", left_len.as_str()),
            ("ordering", ordering.as_str()),
            ("reason", reason.as_str()),
            ("right", right.as_str()),
            ("right_len", right_len.as_str()),
        ],
    );
    fatal::halt(ErrorCode::ComparatorFailure, &reason, "compare")
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Value};
    use crate::keys::encoding::{encode_entry, encode_key};

    fn ordering(bits: u32) -> KeyOrdering {
        KeyOrdering::from_bits(bits)
    }

    #[test]
    fn test_ascending_and_descending_fields() {
        let a = encode_key(&[Value::Int(1), Value::from("b")]);
        let b = encode_key(&[Value::Int(1), Value::from("c")]);
        assert_eq!(compare_entries(&a, &b, &ordering(0)), CmpOrdering::Less);
        assert_eq!(compare_entries(&a, &b, &ordering(0b10)), CmpOrdering::Greater);
        // first field equal, so its direction is irrelevant
        assert_eq!(compare_entries(&a, &b, &ordering(0b01)), CmpOrdering::Less);
    }

    #[test]
    fn test_mixed_numeric_types() {
        let a = encode_key(&[Value::Int(2)]);
        let b = encode_key(&[Value::Double(2.5)]);
        let c = encode_key(&[Value::Double(2.0)]);
        assert_eq!(compare_entries(&a, &b, &ordering(0)), CmpOrdering::Less);
        assert_eq!(compare_entries(&a, &c, &ordering(0)), CmpOrdering::Equal);
    }

    #[test]
    fn test_fragments_break_ties() {
        let id1 = Document::new().with("_id", 1);
        let id2 = Document::new().with("_id", 2);
        let a = encode_entry(&[Value::from("x")], Some(&id1));
        let b = encode_entry(&[Value::from("x")], Some(&id2));
        // fragments are always ascending, whatever the key direction
        assert_eq!(compare_entries(&a, &b, &ordering(1)), CmpOrdering::Less);
        assert_eq!(compare_entries(&b, &a, &ordering(1)), CmpOrdering::Greater);
        assert_eq!(compare_entries(&a, &a, &ordering(1)), CmpOrdering::Equal);
    }

    #[test]
    fn test_leading_key_decides_before_fragment() {
        let id1 = Document::new().with("_id", 1);
        let id2 = Document::new().with("_id", 2);
        let a = encode_entry(&[Value::Int(5)], Some(&id2));
        let b = encode_entry(&[Value::Int(6)], Some(&id1));
        assert_eq!(compare_entries(&a, &b, &ordering(0)), CmpOrdering::Less);
    }

    #[test]
    fn test_fragment_on_one_side_is_reported() {
        let id = Document::new().with("_id", 1);
        let a = encode_entry(&[Value::Int(5)], Some(&id));
        let b = encode_entry(&[Value::Int(5)], None);
        assert_eq!(
            try_compare(&a, &b, &ordering(0)),
            Err(CompareError::FragmentMismatch { left: true, right: false })
        );
        assert_eq!(
            try_compare(&b, &a, &ordering(0)),
            Err(CompareError::FragmentMismatch { left: false, right: true })
        );
    }

    #[test]
    fn test_fragment_mismatch_behind_unequal_keys_is_not_reached() {
        let id = Document::new().with("_id", 1);
        let a = encode_entry(&[Value::Int(5)], Some(&id));
        let b = encode_entry(&[Value::Int(6)], None);
        assert_eq!(try_compare(&a, &b, &ordering(0)), Ok(CmpOrdering::Less));
    }

    #[test]
    fn test_decode_failure_is_reported() {
        let good = encode_key(&[Value::Int(1)]);
        assert!(matches!(try_compare(&[1, 0], &good, &ordering(0)), Err(CompareError::Left(_))));
        assert!(matches!(try_compare(&good, &[9, 0, 0, 0], &ordering(0)), Err(CompareError::Right(_))));
    }

    #[test]
    fn test_shorter_key_sorts_first() {
        let a = encode_key(&[Value::Int(1)]);
        let b = encode_key(&[Value::Int(1), Value::MinKey]);
        assert_eq!(compare_entries(&a, &b, &ordering(0)), CmpOrdering::Less);
    }

    #[test]
    fn test_compare_documents_by_value_then_name() {
        let a = Document::new().with("a", 1).encode();
        let b = Document::new().with("b", 1).encode();
        let c = Document::new().with("a", 1).with("z", 0).encode();
        assert_eq!(compare_documents(&a, &b, &ordering(0)), Ok(CmpOrdering::Less));
        assert_eq!(compare_documents(&a, &c, &ordering(0)), Ok(CmpOrdering::Less));
        assert_eq!(compare_documents(&a, &a, &ordering(0)), Ok(CmpOrdering::Equal));
    }

    #[test]
    fn test_descriptor_trampoline() {
        let a = encode_key(&[Value::Int(1)]);
        let b = encode_key(&[Value::Int(2)]);
        let desc = ordering(1).to_descriptor();
        assert_eq!(compare_with_descriptor(&desc, &a, &b), CmpOrdering::Greater);
        assert_eq!(compare_with_descriptor(&[0, 0, 0, 0], &a, &b), CmpOrdering::Less);
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x00, 0xab, 0x10]), "00ab10");
    }
}
