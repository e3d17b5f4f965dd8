//! Logged message types.
//!
//! An [`Entry`] is persisted as `{ "name", "id", "message", "date" }`, the
//! shape existing archives already use.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Fractional digits written for timestamps created in-process
/// (microseconds, like the archives produced so far).
const DEFAULT_FRACTION_DIGITS: usize = 6;

/// Point in time a message was sent.
///
/// Archives contain offset-carrying (`+03:00`, `Z`) and naive ISO-8601
/// dates with varying fractional precision. A parsed timestamp keeps the
/// text it was read from and is written back unchanged, so rewriting a log
/// never changes the text of older entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn now() -> Self {
        Utc::now().into()
    }

    /// Parses an ISO-8601 date, with or without a UTC offset.
    pub fn parse(s: &str) -> Option<Self> {
        let valid = DateTime::parse_from_rfc3339(s).is_ok()
            || NaiveDateTime::parse_from_str(s, NAIVE_FORMAT).is_ok();
        valid.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Seconds, then microseconds unless whole, then the offset if any.
    fn format(seconds: impl fmt::Display, nanos: u32, offset: Option<String>) -> Self {
        let mut text = seconds.to_string();
        if nanos > 0 {
            let digits = format!("{:09}", nanos.min(999_999_999));
            text.push('.');
            text.push_str(&digits[..DEFAULT_FRACTION_DIGITS]);
        }
        if let Some(offset) = offset {
            text.push_str(&offset);
        }
        Self(text)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        dt.fixed_offset().into()
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::format(
            dt.format(SECONDS_FORMAT),
            dt.timestamp_subsec_nanos(),
            Some(dt.format("%:z").to_string()),
        )
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::format(
            dt.format(SECONDS_FORMAT),
            dt.and_utc().timestamp_subsec_nanos(),
            None,
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO-8601 date: {raw}")))
    }
}

/// One logged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Display name of the sender. May be empty.
    #[serde(rename = "name")]
    pub author_name: String,
    /// Stable numeric identifier of the sender.
    #[serde(rename = "id")]
    pub author_id: i64,
    /// Message body.
    #[serde(rename = "message")]
    pub text: String,
    #[serde(rename = "date")]
    pub timestamp: Timestamp,
}

impl Entry {
    pub fn new(
        author_name: impl Into<String>,
        author_id: i64,
        text: impl Into<String>,
        timestamp: impl Into<Timestamp>,
    ) -> Self {
        Self {
            author_name: author_name.into(),
            author_id,
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    /// One display line, `name (id): message [date]`, with `emphasize`
    /// applied to the name and the message.
    pub fn display_line(&self, emphasize: impl Fn(&str) -> String) -> String {
        format!(
            "{} ({}): {} [{}]",
            emphasize(&self.author_name),
            self.author_id,
            emphasize(&self.text),
            self.timestamp
        )
    }
}
