// src/domain/record.rs

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Format the capture flow writes `dateAndTime` in, e.g. `3/1/2024, 9:00:00 AM`.
/// Month, day and hour are not zero-padded; chrono accepts one or two digits.
pub const DATE_AND_TIME_FORMAT: &str = "%m/%d/%Y, %I:%M:%S %p";

/// One reported waste-collection event, as stored under the collection path.
///
/// Every field except `id` is optional: the writer lives elsewhere and older
/// entries are missing some of them. The `id` is the store key and is never
/// derived from content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionRecord {
    #[serde(skip)]
    pub id: String,
    pub owner_name: Option<String>,
    pub house_address: Option<String>,
    pub date_and_time: Option<String>,
    pub readable_date: Option<String>,
    pub review_status: Option<String>,
}

/// Why a record's `dateAndTime` could not be used as a sort key.
/// Recovered locally by the projection; never surfaced per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordParseError {
    Missing,
    Malformed(String),
}

impl fmt::Display for RecordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordParseError::Missing => write!(f, "dateAndTime missing"),
            RecordParseError::Malformed(raw) => write!(f, "dateAndTime malformed: {raw:?}"),
        }
    }
}

impl std::error::Error for RecordParseError {}

impl CollectionRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Decode one child of the collection. The key becomes the record id.
    pub fn from_json(key: &str, value: &Value) -> Result<Self, serde_json::Error> {
        let mut record: CollectionRecord = serde_json::from_value(value.clone())?;
        record.id = key.to_string();
        Ok(record)
    }

    /// Like `from_json`, but a child that does not decode is kept as an
    /// id-only record so it still shows up (with placeholders) downstream.
    pub fn from_json_lossy(key: &str, value: &Value) -> Self {
        match Self::from_json(key, value) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("record {key} could not be decoded, keeping id only: {e}");
                Self::new(key)
            }
        }
    }

    pub fn parsed_date_and_time(&self) -> Result<NaiveDateTime, RecordParseError> {
        match self.date_and_time.as_deref() {
            Some(raw) => parse_date_and_time(raw),
            None => Err(RecordParseError::Missing),
        }
    }
}

/// Parse a `dateAndTime` value under `DATE_AND_TIME_FORMAT`.
///
/// Locale formatters put a narrow no-break space (U+202F) or a no-break space
/// before the AM/PM marker; both are read as a plain space.
pub fn parse_date_and_time(raw: &str) -> Result<NaiveDateTime, RecordParseError> {
    let normalized: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '\u{202f}' | '\u{a0}' => ' ',
            other => other,
        })
        .collect();

    if normalized.is_empty() {
        return Err(RecordParseError::Missing);
    }

    NaiveDateTime::parse_from_str(&normalized, DATE_AND_TIME_FORMAT)
        .map_err(|_| RecordParseError::Malformed(raw.to_string()))
}
