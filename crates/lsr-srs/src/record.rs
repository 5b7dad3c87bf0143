use std::{collections::BTreeMap, convert::Infallible, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    normalize::{normalize_title, normalize_url},
    schedule::MS_PER_DAY,
};

/// Every tracked problem, keyed by its storage key (`id` when known, else the url).
pub type RecordSet = BTreeMap<String, ProblemRecord>;

/// Identifier reported by the host site. Older records carry numeric ids,
/// newer ones may carry slugs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Problem difficulty as labelled by the host site.
///
/// Deserialization is lenient: casing is ignored and anything that is not
/// easy/medium/hard (including `null` and the empty string) becomes `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unknown,
}

impl Difficulty {
    /// Lenient parse, see the type docs.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Unknown,
        }
    }

    /// Scale applied to the unbounded ladder. Easier problems wait longer.
    pub const fn interval_multiplier(self) -> f64 {
        match self {
            Self::Easy => 1.5,
            Self::Medium | Self::Unknown => 1.0,
            Self::Hard => 0.7,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<Option<String>> for Difficulty {
    fn from(label: Option<String>) -> Self {
        label.as_deref().map_or(Self::Unknown, Self::parse)
    }
}

impl FromStr for Difficulty {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked problem and its review history.
///
/// Serialized with camelCase keys and millisecond timestamps, which is the
/// layout the browser extension stores and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRecord {
    #[serde(default)]
    pub id: Option<ProblemId>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Set once, at the first solve.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_solved: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default = "first_solve")]
    pub solve_count: u32,
    /// Index into the interval schedule. Only ever increases.
    #[serde(default)]
    pub review_count: u32,
    /// Only legacy records lack this; see [`crate::backfill_next_reviews`].
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub next_review: Option<DateTime<Utc>>,
    /// Milliseconds spent on the originating solve.
    #[serde(default)]
    pub time_spent: Option<u64>,
}

const fn first_solve() -> u32 {
    1
}

impl ProblemRecord {
    /// A fresh record for a problem solved for the first time at `now`.
    ///
    /// `next_review` is left unset; the reconciler fills it in.
    pub fn from_event(event: &SolvedEvent, now: DateTime<Utc>) -> Self {
        Self {
            id: event.id.clone(),
            url: event.url.clone(),
            title: event.title.clone(),
            difficulty: event.difficulty,
            tags: event.tags.clone(),
            created_at: now,
            last_solved: Some(event.submitted_at),
            last_reviewed: None,
            solve_count: 1,
            review_count: 0,
            next_review: None,
            time_spent: event.time_spent,
        }
    }

    /// `true` when a review date is set and has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.is_some_and(|due| due <= now)
    }

    /// Whole days since the last review, `None` if never reviewed.
    pub fn days_since_last_review(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_reviewed
            .map(|reviewed| (now - reviewed).num_milliseconds().div_euclid(MS_PER_DAY))
    }

    /// The instant the current schedule was computed from: the last review,
    /// or the first solve for a record never reviewed.
    pub fn schedule_anchor(&self) -> DateTime<Utc> {
        self.last_reviewed.unwrap_or(self.created_at)
    }

    pub fn normalized_url(&self) -> String {
        normalize_url(&self.url)
    }

    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

/// A successful submission observed on the host site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedEvent {
    #[serde(default)]
    pub id: Option<ProblemId>,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Milliseconds from page entry to the accepted submission.
    #[serde(default)]
    pub time_spent: Option<u64>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub submitted_at: DateTime<Utc>,
}

impl SolvedEvent {
    /// Storage key for this event: the id when present, else the url.
    /// `None` when the event carries neither.
    pub fn record_key(&self) -> Option<String> {
        self.id
            .as_ref()
            .map(ToString::to_string)
            .filter(|id| !id.is_empty())
            .or_else(|| Some(self.url.clone()).filter(|url| !url.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_difficulty_parse_is_lenient() {
        assert_eq!(Difficulty::parse("Easy"), Difficulty::Easy);
        assert_eq!(Difficulty::parse(" MEDIUM "), Difficulty::Medium);
        assert_eq!(Difficulty::parse("hard"), Difficulty::Hard);
        assert_eq!(Difficulty::parse(""), Difficulty::Unknown);
        assert_eq!(Difficulty::parse("Insane"), Difficulty::Unknown);
    }

    #[test]
    fn test_record_deserializes_extension_layout() {
        let json = r#"{
            "id": 1,
            "url": "https://leetcode.com/problems/two-sum/",
            "title": "1. Two Sum",
            "difficulty": "Easy",
            "tags": ["Array", "Hash Table"],
            "createdAt": 1700000000000,
            "lastSolved": 1700000000000,
            "lastReviewed": null,
            "solveCount": 1,
            "reviewCount": 0,
            "nextReview": 1700129600000,
            "timeSpent": 420000
        }"#;

        let record: ProblemRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, Some(ProblemId::Number(1)));
        assert_eq!(record.difficulty, Difficulty::Easy);
        assert_eq!(record.created_at, at(1_700_000_000_000));
        assert_eq!(record.last_reviewed, None);
        assert_eq!(record.next_review, Some(at(1_700_129_600_000)));
        assert_eq!(record.time_spent, Some(420_000));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["createdAt"], 1_700_000_000_000_i64);
        assert_eq!(back["difficulty"], "Easy");
    }

    #[test]
    fn test_legacy_record_defaults() {
        let json = r#"{
            "url": "https://leetcode.com/problems/a/",
            "title": "A",
            "difficulty": "",
            "createdAt": 1700000000000
        }"#;

        let record: ProblemRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.difficulty, Difficulty::Unknown);
        assert_eq!(record.solve_count, 1);
        assert_eq!(record.review_count, 0);
        assert!(record.next_review.is_none());
        assert!(!record.is_due(at(1_800_000_000_000)));
    }

    #[test]
    fn test_days_since_last_review_floors() {
        let reviewed = at(1_700_000_000_000);
        let mut record: ProblemRecord = serde_json::from_value(serde_json::json!({
            "url": "u",
            "createdAt": 1_700_000_000_000_i64,
        }))
        .unwrap();
        assert_eq!(record.days_since_last_review(reviewed), None);

        record.last_reviewed = Some(reviewed);
        let later = reviewed + Duration::days(2) + Duration::hours(23);
        assert_eq!(record.days_since_last_review(later), Some(2));
        assert_eq!(record.days_since_last_review(reviewed), Some(0));
    }

    #[test]
    fn test_record_key_prefers_id() {
        let mut event = SolvedEvent {
            id: Some(ProblemId::Number(42)),
            url: "https://leetcode.com/problems/x/".to_string(),
            title: "X".to_string(),
            difficulty: Difficulty::Medium,
            tags: Vec::new(),
            time_spent: None,
            submitted_at: at(0),
        };
        assert_eq!(event.record_key().as_deref(), Some("42"));

        event.id = Some(ProblemId::Text(String::new()));
        assert_eq!(
            event.record_key().as_deref(),
            Some("https://leetcode.com/problems/x/")
        );

        event.id = None;
        event.url.clear();
        assert_eq!(event.record_key(), None);
    }
}
