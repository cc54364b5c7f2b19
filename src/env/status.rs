//! Engine status report

use std::fmt;

use chrono::{TimeZone, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::engine::{StatusSnapshot, StatusValue};

/// Filesystem fullness as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilesystemStatus {
    Ok,
    /// Approaching the redzone
    GettingFull,
    /// In the redzone; the engine is read-only
    CriticallyFull,
    /// No space left
    Blocked,
    Unknown(u32),
}

impl FilesystemStatus {
    pub fn from_raw(state: u32) -> Self {
        match state {
            0 => FilesystemStatus::Ok,
            1 => FilesystemStatus::GettingFull,
            2 => FilesystemStatus::CriticallyFull,
            3 => FilesystemStatus::Blocked,
            other => FilesystemStatus::Unknown(other),
        }
    }
}

impl fmt::Display for FilesystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilesystemStatus::Ok => f.write_str("OK"),
            FilesystemStatus::GettingFull => f.write_str("Getting full..."),
            FilesystemStatus::CriticallyFull => {
                f.write_str("Critically full. Engine is read-only until space is freed.")
            }
            FilesystemStatus::Blocked => f.write_str("Completely full. Free up some space now."),
            FilesystemStatus::Unknown(code) => write!(f, "Unknown. Code: {}", code),
        }
    }
}

/// A rendered status value
#[derive(Debug, Clone, PartialEq)]
pub enum StatusField {
    Integer(u64),
    Text(String),
    Seconds(f64),
}

impl StatusField {
    fn from_value(value: &StatusValue) -> Self {
        match value {
            StatusValue::Integer(n) => StatusField::Integer(*n),
            StatusValue::Text(s) => StatusField::Text(s.clone()),
            StatusValue::Timestamp(secs) => StatusField::Text(render_timestamp(*secs)),
            StatusValue::Duration(d) => StatusField::Seconds(d.as_secs_f64()),
            StatusValue::Counter(parts) => {
                StatusField::Integer(parts.iter().fold(0u64, |sum, n| sum.wrapping_add(*n)))
            }
        }
    }
}

fn render_timestamp(secs: i64) -> String {
    match Utc.timestamp_opt(secs, 0).single() {
        Some(t) => t.to_rfc3339(),
        None => secs.to_string(),
    }
}

impl Serialize for StatusField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatusField::Integer(n) => serializer.serialize_u64(*n),
            StatusField::Text(s) => serializer.serialize_str(s),
            StatusField::Seconds(secs) => serializer.serialize_f64(*secs),
        }
    }
}

/// Structured engine status.
///
/// Serializes as one flat map: `panic code`, `panic string`,
/// `filesystem status`, then every engine row in reported order.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub panic_code: u64,
    pub panic_string: String,
    pub filesystem: FilesystemStatus,
    pub fields: Vec<(String, StatusField)>,
}

impl StatusReport {
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Self {
        Self {
            panic_code: snapshot.panic,
            panic_string: snapshot.panic_string.clone(),
            filesystem: FilesystemStatus::from_raw(snapshot.redzone_state),
            fields: snapshot
                .rows
                .iter()
                .map(|row| (row.key.clone(), StatusField::from_value(&row.value)))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&StatusField> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl Serialize for StatusReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.fields.len()))?;
        map.serialize_entry("panic code", &self.panic_code)?;
        map.serialize_entry("panic string", &self.panic_string)?;
        map.serialize_entry("filesystem status", &self.filesystem.to_string())?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StatusRow;
    use std::time::Duration;

    fn snapshot(redzone_state: u32, rows: Vec<StatusRow>) -> StatusSnapshot {
        StatusSnapshot {
            redzone_state,
            panic: 0,
            panic_string: String::new(),
            rows,
        }
    }

    #[test]
    fn test_filesystem_status_strings() {
        let cases = [
            (0, "OK"),
            (1, "Getting full..."),
            (2, "Critically full. Engine is read-only until space is freed."),
            (3, "Completely full. Free up some space now."),
            (9, "Unknown. Code: 9"),
        ];
        for (raw, text) in cases {
            assert_eq!(FilesystemStatus::from_raw(raw).to_string(), text);
        }
    }

    #[test]
    fn test_row_rendering() {
        let report = StatusReport::from_snapshot(&snapshot(
            0,
            vec![
                StatusRow::new("n", "", StatusValue::Integer(7)),
                StatusRow::new("s", "", StatusValue::Text("x".into())),
                StatusRow::new("t", "", StatusValue::Timestamp(0)),
                StatusRow::new("d", "", StatusValue::Duration(Duration::from_millis(1500))),
                StatusRow::new("c", "", StatusValue::Counter(vec![1, 2, 3])),
            ],
        ));
        assert_eq!(report.get("n"), Some(&StatusField::Integer(7)));
        assert_eq!(report.get("t"), Some(&StatusField::Text("1970-01-01T00:00:00+00:00".into())));
        assert_eq!(report.get("d"), Some(&StatusField::Seconds(1.5)));
        assert_eq!(report.get("c"), Some(&StatusField::Integer(6)));
    }

    #[test]
    fn test_serializes_in_order() {
        let report = StatusReport::from_snapshot(&snapshot(
            1,
            vec![
                StatusRow::new("z", "", StatusValue::Integer(1)),
                StatusRow::new("a", "", StatusValue::Integer(2)),
            ],
        ));
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"panic code":0,"panic string":"","filesystem status":"Getting full...","z":1,"a":2}"#
        );
    }
}
