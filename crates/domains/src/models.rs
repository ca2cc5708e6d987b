//! # Domain Models
//!
//! These structs represent the core entities of the briefing server:
//! reader comments attached to a day, and the read-only daily archive.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Upper bound on a trimmed comment body, in characters.
pub const MAX_CONTENT_CHARS: usize = 500;
/// Nicknames are truncated to this many characters.
pub const MAX_NICKNAME_CHARS: usize = 20;
/// Placeholder stored when a nickname is absent or blank.
pub const DEFAULT_NICKNAME: &str = "anonymous";

/// A day key in `YYYY-MM-DD` shape.
///
/// Only the digit shape is checked: `2024-13-01` is accepted and simply
/// matches nothing in the stores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BriefingDate(String);

impl BriefingDate {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let bytes = raw.as_bytes();
        let shaped = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });

        if shaped {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::InvalidDate)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `YYYY-MM` prefix.
    pub fn month(&self) -> &str {
        &self.0[..7]
    }
}

impl TryFrom<String> for BriefingDate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BriefingDate> for String {
    fn from(value: BriefingDate) -> Self {
        value.0
    }
}

impl fmt::Display for BriefingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pseudonymous client identifier derived from request metadata.
/// Used both as the rate-limit key and as the stored `ip_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored comment as shown to readers. `ip_hash` is never selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub date: BriefingDate,
    pub nickname: String,
    pub content: String,
    #[serde(with = "millis_rfc3339")]
    pub created_at: DateTime<Utc>,
}

/// Timestamps on the wire keep millisecond precision and a `Z` suffix, the
/// same text the comment store writes.
pub mod millis_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

/// A validated comment ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub date: BriefingDate,
    pub nickname: String,
    pub content: String,
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Raw write payload. Every field is optional so that missing fields surface
/// as validation errors rather than decode errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitComment {
    pub date: Option<String>,
    pub nickname: Option<String>,
    pub content: Option<String>,
}

/// A curated news article from the bundled archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub date: String,
    pub category: String,
    pub title: String,
    pub title_original: Option<String>,
    pub url: String,
    pub summary: Option<String>,
    pub insight: Option<String>,
    pub detected_date: Option<String>,
    pub created_at: String,
}

/// The operator's analysis report for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBriefing {
    pub date: String,
    pub analysis: String,
    pub created_at: String,
}

/// What an analysis write did to the `daily_briefings` row of its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Everything a day page needs, including its neighbours for navigation.
/// Neighbour fields are `prevDate` / `nextDate` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyData {
    pub briefing: Option<DailyBriefing>,
    pub articles: Vec<Article>,
    pub prev_date: Option<String>,
    pub next_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_accepts_digit_shape_only() {
        assert!(BriefingDate::parse("2025-01-31").is_ok());
        // month 13 is shape-valid
        assert!(BriefingDate::parse("2024-13-01").is_ok());

        for bad in ["", "2024-1-01", "2024/01/01", "20240101", "2024-01-011", "abcd-ef-gh", " 2024-01-01"] {
            assert_eq!(BriefingDate::parse(bad), Err(DomainError::InvalidDate), "{bad:?}");
        }
    }

    #[test]
    fn date_rejects_non_ascii_digits() {
        // U+0661 ARABIC-INDIC DIGIT ONE is a Unicode digit but not ASCII.
        assert!(BriefingDate::parse("٢٠٢٤-01-01").is_err());
    }

    #[test]
    fn date_month_prefix() {
        let date = BriefingDate::parse("2025-03-09").unwrap();
        assert_eq!(date.month(), "2025-03");
    }

    #[test]
    fn comment_timestamp_keeps_milliseconds() {
        use chrono::TimeZone;

        let comment = Comment {
            id: 1,
            date: BriefingDate::parse("2025-06-02").unwrap(),
            nickname: DEFAULT_NICKNAME.to_string(),
            content: "hi".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["created_at"], "2025-06-02T00:00:00.000Z");

        let back: Comment = serde_json::from_value(json).unwrap();
        assert_eq!(back, comment);
    }

    #[test]
    fn daily_data_uses_camel_case_neighbours() {
        let data = DailyData {
            briefing: None,
            articles: Vec::new(),
            prev_date: Some("2025-06-01".to_string()),
            next_date: None,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["prevDate"], "2025-06-01");
        assert!(json["nextDate"].is_null());
        assert!(json.get("prev_date").is_none());
    }

    #[test]
    fn date_deserialize_validates() {
        let ok: Result<BriefingDate, _> = serde_json::from_str("\"2025-03-09\"");
        assert!(ok.is_ok());
        let bad: Result<BriefingDate, _> = serde_json::from_str("\"March 9\"");
        assert!(bad.is_err());
    }
}
