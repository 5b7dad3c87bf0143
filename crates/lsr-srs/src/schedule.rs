//! Review date computation.
//!
//! Two modes are supported:
//!
//! * **Unbounded** (no study window): a fixed ladder of day intervals indexed by
//!   the review count and scaled by difficulty.
//! * **Bounded** (study window set): the span between a problem's first solve
//!   and the study end date is split into a handful of reviews on a quadratic
//!   ramp, so early reviews are close together and later ones stretch toward
//!   the deadline. Nothing is ever scheduled past the end date.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Difficulty, ProblemRecord};

/// Milliseconds in one day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Day intervals of the unbounded ladder. The last rung repeats forever.
pub const REVIEW_LADDER_DAYS: [i64; 8] = [1, 3, 7, 14, 30, 60, 120, 240];

/// Truncate a timestamp to midnight (UTC) of the same day.
pub fn midnight(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// A global deadline that caps every computed review date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyWindow {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub end_date: NaiveDate,
}

impl StudyWindow {
    pub const fn new(end_date: NaiveDate) -> Self {
        Self {
            start_date: None,
            end_date,
        }
    }

    pub const fn with_start(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Build a window from raw settings strings (`YYYY-MM-DD`).
    ///
    /// Returns `None` when no end date is configured, when either date does not
    /// parse, or when the start date falls after the end date. Callers treat
    /// `None` as "schedule without a window".
    pub fn parse(end_date: Option<&str>, start_date: Option<&str>) -> Option<Self> {
        let end_date = parse_date(end_date?)?;
        let start_date = match start_date.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_date(raw)?),
            None => None,
        };

        match start_date {
            Some(start) if start > end_date => None,
            Some(start) => Some(Self::new(end_date).with_start(start)),
            None => Some(Self::new(end_date)),
        }
    }

    /// Midnight of the end date.
    pub fn end(&self) -> DateTime<Utc> {
        self.end_date.and_time(NaiveTime::MIN).and_utc()
    }

    /// Midnight of the start date, if any.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// The bounded-mode review plan for one problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPlan {
    /// First solve, clamped to the window start.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub anchor: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
    /// Whole days between `anchor` and `end`.
    pub span_days: i64,
    /// Day offsets from `anchor`, one per planned review. Empty when the
    /// anchor already lies past the end date.
    pub offsets: Vec<i64>,
}

impl ReviewPlan {
    /// Lay out the reviews for a problem first solved at `created_at`.
    pub fn new(created_at: DateTime<Utc>, window: &StudyWindow) -> Self {
        let end = window.end();
        let anchor = window
            .start()
            .map_or(created_at, |start| created_at.max(start));

        if anchor > end {
            return Self {
                anchor,
                end,
                span_days: 0,
                offsets: Vec::new(),
            };
        }

        let span_days =
            ((end - anchor).num_milliseconds() as f64 / MS_PER_DAY as f64).round() as i64;
        let segments = segment_count(span_days);
        let offsets = (1..=segments)
            .map(|i| {
                let ratio = i as f64 / segments as f64;
                (span_days as f64 * ratio * ratio).round() as i64
            })
            .collect();

        Self {
            anchor,
            end,
            span_days,
            offsets,
        }
    }

    /// Review date for the `review_count`-th review (0-based), truncated to
    /// midnight and never past the end date.
    pub fn next_review(&self, review_count: u32) -> DateTime<Utc> {
        let next = self
            .offsets
            .get(review_count as usize)
            .map_or(self.end, |&days| self.anchor + Duration::days(days));

        midnight(next.min(self.end))
    }

    /// Every planned review date, in order.
    pub fn review_dates(&self) -> Vec<DateTime<Utc>> {
        (0..self.offsets.len() as u32)
            .map(|i| self.next_review(i))
            .collect()
    }
}

/// Number of reviews that fit in a window of `span_days` days.
///
/// * ≤ 7 days: 1
/// * ≤ 14 days: 2
/// * ≤ 30 days: 3
/// * ≤ 45 days: 4
/// * longer: 5
pub const fn segment_count(span_days: i64) -> i64 {
    match span_days {
        d if d <= 7 => 1,
        d if d <= 14 => 2,
        d if d <= 30 => 3,
        d if d <= 45 => 4,
        _ => 5,
    }
}

/// Interval of the unbounded ladder for a given review count.
///
/// # Examples
/// ```
/// use lsr_srs::ladder_interval_days;
///
/// assert_eq!(ladder_interval_days(0), 1);
/// assert_eq!(ladder_interval_days(2), 7);
/// assert_eq!(ladder_interval_days(50), 240);
/// ```
pub fn ladder_interval_days(review_count: u32) -> i64 {
    let index = (review_count as usize).min(REVIEW_LADDER_DAYS.len() - 1);
    REVIEW_LADDER_DAYS[index]
}

/// Unbounded-mode review date.
///
/// # Arguments
///
/// * `difficulty` - Scales the ladder interval (Easy ×1.5, Medium ×1.0, Hard ×0.7)
/// * `review_count` - Index into [`REVIEW_LADDER_DAYS`], capped at the last rung
/// * `now` - The moment the schedule is computed; truncated to midnight first
///
/// # Returns
///
/// `midnight(now) + interval * multiplier` days. The result keeps the
/// fractional day that Easy and Hard multipliers produce.
pub fn unbounded_next_review(
    difficulty: Difficulty,
    review_count: u32,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let days = ladder_interval_days(review_count) as f64 * difficulty.interval_multiplier();
    let offset_ms = (days * MS_PER_DAY as f64).round() as i64;

    midnight(now) + Duration::milliseconds(offset_ms)
}

/// Bounded-mode review date, see [`ReviewPlan`].
///
/// A problem first solved after the end date is due on the end date,
/// whatever its review count.
pub fn bounded_next_review(
    created_at: DateTime<Utc>,
    review_count: u32,
    window: &StudyWindow,
) -> DateTime<Utc> {
    ReviewPlan::new(created_at, window).next_review(review_count)
}

/// Compute the next review date for a record.
///
/// Uses the bounded plan when a study window is given and the unbounded ladder
/// otherwise. Never fails: a malformed window is expected to have been turned
/// into `None` by [`StudyWindow::parse`] already.
pub fn compute_next_review(
    record: &ProblemRecord,
    window: Option<&StudyWindow>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match window {
        Some(window) => bounded_next_review(record.created_at, record.review_count, window),
        None => unbounded_next_review(record.difficulty, record.review_count, now),
    }
}
