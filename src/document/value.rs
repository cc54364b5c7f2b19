//! Field values and their canonical ordering
//!
//! Values of different types order by canonical type rank:
//! MinKey < Null < Number < String < Binary < ObjectId < Bool < MaxKey.
//! Int and Double share the Number rank and compare numerically.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;

/// Type tags shared by the key and document encodings
pub(crate) mod tag {
    pub const DOUBLE: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const BINARY: u8 = 0x05;
    pub const OBJECT_ID: u8 = 0x07;
    pub const BOOL: u8 = 0x08;
    pub const NULL: u8 = 0x0A;
    pub const INT: u8 = 0x12;
    pub const MAX_KEY: u8 = 0x7F;
    pub const MIN_KEY: u8 = 0xFF;
}

/// An owned field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    MinKey,
    Null,
    Int(i64),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    ObjectId([u8; 12]),
    Bool(bool),
    MaxKey,
}

/// A borrowed view of an encoded value.
///
/// Strings are kept as raw bytes; comparison never validates or allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    MinKey,
    Null,
    Int(i64),
    Double(f64),
    String(&'a [u8]),
    Binary(&'a [u8]),
    ObjectId(&'a [u8; 12]),
    Bool(bool),
    MaxKey,
}

impl Value {
    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Value::MinKey => ValueRef::MinKey,
            Value::Null => ValueRef::Null,
            Value::Int(n) => ValueRef::Int(*n),
            Value::Double(d) => ValueRef::Double(*d),
            Value::String(s) => ValueRef::String(s.as_bytes()),
            Value::Binary(b) => ValueRef::Binary(b),
            Value::ObjectId(oid) => ValueRef::ObjectId(oid),
            Value::Bool(b) => ValueRef::Bool(*b),
            Value::MaxKey => ValueRef::MaxKey,
        }
    }

    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.as_value_ref().type_name()
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_value_ref(), f)
    }
}

impl<'a> ValueRef<'a> {
    pub(crate) fn tag(&self) -> u8 {
        match self {
            ValueRef::MinKey => tag::MIN_KEY,
            ValueRef::Null => tag::NULL,
            ValueRef::Int(_) => tag::INT,
            ValueRef::Double(_) => tag::DOUBLE,
            ValueRef::String(_) => tag::STRING,
            ValueRef::Binary(_) => tag::BINARY,
            ValueRef::ObjectId(_) => tag::OBJECT_ID,
            ValueRef::Bool(_) => tag::BOOL,
            ValueRef::MaxKey => tag::MAX_KEY,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            ValueRef::MinKey => 0,
            ValueRef::Null => 1,
            ValueRef::Int(_) | ValueRef::Double(_) => 2,
            ValueRef::String(_) => 3,
            ValueRef::Binary(_) => 4,
            ValueRef::ObjectId(_) => 5,
            ValueRef::Bool(_) => 6,
            ValueRef::MaxKey => 7,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ValueRef::MinKey => "minKey",
            ValueRef::Null => "null",
            ValueRef::Int(_) => "long",
            ValueRef::Double(_) => "double",
            ValueRef::String(_) => "string",
            ValueRef::Binary(_) => "binData",
            ValueRef::ObjectId(_) => "objectId",
            ValueRef::Bool(_) => "bool",
            ValueRef::MaxKey => "maxKey",
        }
    }

    pub fn to_value(&self) -> Value {
        match *self {
            ValueRef::MinKey => Value::MinKey,
            ValueRef::Null => Value::Null,
            ValueRef::Int(n) => Value::Int(n),
            ValueRef::Double(d) => Value::Double(d),
            ValueRef::String(s) => Value::String(String::from_utf8_lossy(s).into_owned()),
            ValueRef::Binary(b) => Value::Binary(b.to_vec()),
            ValueRef::ObjectId(oid) => Value::ObjectId(*oid),
            ValueRef::Bool(b) => Value::Bool(b),
            ValueRef::MaxKey => Value::MaxKey,
        }
    }
}

impl fmt::Display for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::MinKey => write!(f, "MinKey"),
            ValueRef::Null => write!(f, "null"),
            ValueRef::Int(n) => write!(f, "{}", n),
            ValueRef::Double(d) => write!(f, "{:?}", d),
            ValueRef::String(s) => write!(f, "\"{}\"", String::from_utf8_lossy(s)),
            ValueRef::Binary(b) => write!(f, "BinData({} bytes)", b.len()),
            ValueRef::ObjectId(oid) => {
                write!(f, "ObjectId(\"")?;
                for byte in oid.iter() {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "\")")
            }
            ValueRef::Bool(b) => write!(f, "{}", b),
            ValueRef::MaxKey => write!(f, "MaxKey"),
        }
    }
}

/// Three-way comparison of two values, ascending.
///
/// Total over all inputs: NaN equals NaN and sorts before every other number.
pub fn compare_values(a: ValueRef<'_>, b: ValueRef<'_>) -> CmpOrdering {
    let rank = a.type_rank().cmp(&b.type_rank());
    if rank != CmpOrdering::Equal {
        return rank;
    }
    match (a, b) {
        (ValueRef::Int(x), ValueRef::Int(y)) => x.cmp(&y),
        (ValueRef::Int(x), ValueRef::Double(y)) => compare_int_double(x, y),
        (ValueRef::Double(x), ValueRef::Int(y)) => compare_int_double(y, x).reverse(),
        (ValueRef::Double(x), ValueRef::Double(y)) => compare_doubles(x, y),
        (ValueRef::String(x), ValueRef::String(y)) => x.cmp(y),
        (ValueRef::Binary(x), ValueRef::Binary(y)) => {
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (ValueRef::ObjectId(x), ValueRef::ObjectId(y)) => x.cmp(y),
        (ValueRef::Bool(x), ValueRef::Bool(y)) => x.cmp(&y),
        _ => CmpOrdering::Equal,
    }
}

fn compare_doubles(x: f64, y: f64) -> CmpOrdering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => CmpOrdering::Equal,
        (true, false) => CmpOrdering::Less,
        (false, true) => CmpOrdering::Greater,
        (false, false) => x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal),
    }
}

fn compare_int_double(x: i64, y: f64) -> CmpOrdering {
    if y.is_nan() {
        return CmpOrdering::Greater;
    }
    // 2^63 as f64; anything at or beyond it is outside i64 range
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if y >= LIMIT {
        return CmpOrdering::Less;
    }
    if y < -LIMIT {
        return CmpOrdering::Greater;
    }
    let truncated = y.trunc();
    match x.cmp(&(truncated as i64)) {
        CmpOrdering::Equal => compare_doubles(0.0, y - truncated),
        other => other,
    }
}
