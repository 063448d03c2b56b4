//! Decoding of legacy timestamp cells.
//!
//! The legacy ORM wrote `DATETIME` columns as text with a numeric offset,
//! e.g. `2018-09-10 12:34:56.123456789+08:00`. Older rows and hand-edited
//! databases also contain RFC 3339 text, naive text (taken as UTC) and
//! integer epoch seconds.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a textual legacy timestamp into UTC.
///
/// Returns `None` if no known format matches.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|naive| naive.and_utc())
        })
}

/// A timestamp cell as stored by the legacy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyTime(pub DateTime<Utc>);

/// A text cell that matched no known timestamp format.
#[derive(Debug, thiserror::Error)]
#[error("invalid timestamp: {0:?}")]
pub struct TimestampError(pub String);

impl FromSql for LegacyTime {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(secs) => DateTime::from_timestamp(secs, 0)
                .map(Self)
                .ok_or(FromSqlError::OutOfRange(secs)),
            ValueRef::Text(bytes) => {
                let text =
                    std::str::from_utf8(bytes).map_err(|e| FromSqlError::Other(Box::new(e)))?;
                parse_timestamp(text).map(Self).ok_or_else(|| {
                    FromSqlError::Other(Box::new(TimestampError(text.to_string())))
                })
            }
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl From<LegacyTime> for DateTime<Utc> {
    fn from(time: LegacyTime) -> Self {
        time.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_orm_format_with_offset() {
        let dt = parse_timestamp("2018-09-10 12:34:56.123456789+08:00").unwrap();
        assert_eq!(dt.timestamp(), 1_536_554_096);
    }

    #[test]
    fn parses_rfc3339() {
        let dt = parse_timestamp("2018-09-10T04:34:56Z").unwrap();
        assert_eq!(dt.timestamp(), 1_536_554_096);
    }

    #[test]
    fn parses_naive_as_utc() {
        let dt = parse_timestamp("2018-09-10 04:34:56").unwrap();
        assert_eq!(dt.timestamp(), 1_536_554_096);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn decodes_integer_cells() {
        let time = LegacyTime::column_result(ValueRef::Integer(1_536_554_096)).unwrap();
        assert_eq!(time.0.timestamp(), 1_536_554_096);
    }

    #[test]
    fn rejects_real_cells() {
        assert!(LegacyTime::column_result(ValueRef::Real(1.5)).is_err());
    }
}
