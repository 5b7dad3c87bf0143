//! Merging solved events and review confirmations into the record set.
//!
//! Every function here takes the record set by value and hands it back in an
//! [`Applied`], so callers own loading and persisting it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    normalize::{normalize_title, normalize_url},
    record::{ProblemRecord, RecordSet, SolvedEvent},
    schedule::{StudyWindow, compute_next_review},
};

/// What a solved event did to the record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileAction {
    /// First time this problem was seen.
    Created,
    /// The problem was due, so the solve counted as a review.
    Advanced,
    /// The problem was not due yet; nothing changed.
    Ignored,
}

impl ReconcileAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Advanced => "advanced",
            Self::Ignored => "ignored",
        }
    }
}

/// Result of reconciling one solved event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Key of the created or matched record. `None` only when the event
    /// carried neither an id nor a url.
    pub key: Option<String>,
    pub action: ReconcileAction,
}

/// The record set after an operation, together with what the operation reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub records: RecordSet,
    pub outcome: T,
}

impl<T> Applied<T> {
    const fn new(records: RecordSet, outcome: T) -> Self {
        Self { records, outcome }
    }
}

/// Find the record a solved event refers to.
///
/// Lookup runs in three stages, first hit wins:
/// 1. normalized title equality (both non-empty)
/// 2. normalized url equality (both non-empty)
/// 3. exact key lookup with the event's id, falling back to its raw url
///
/// The last stage exists for legacy records stored before titles and urls
/// were reliable.
pub fn find_matching_key(records: &RecordSet, event: &SolvedEvent) -> Option<String> {
    let title = normalize_title(&event.title);
    let url = normalize_url(&event.url);

    let by_title = || {
        records
            .iter()
            .find(|(_, record)| !title.is_empty() && record.normalized_title() == title)
    };
    let by_url = || {
        records
            .iter()
            .find(|(_, record)| !url.is_empty() && record.normalized_url() == url)
    };

    by_title()
        .or_else(by_url)
        .map(|(key, _)| key.clone())
        .or_else(|| event.record_key().filter(|key| records.contains_key(key)))
}

/// Merge a solved event into the record set.
///
/// * unknown problem: a new record is created and scheduled
/// * known problem that is due (or has no review date): the solve counts as a
///   review and the schedule advances
/// * known problem not yet due: nothing changes, so solving ahead of schedule
///   cannot shortcut the spacing
pub fn reconcile(
    mut records: RecordSet,
    event: &SolvedEvent,
    window: Option<&StudyWindow>,
    now: DateTime<Utc>,
) -> Applied<Reconciliation> {
    if let Some(key) = find_matching_key(&records, event) {
        let action = match records.get_mut(&key) {
            Some(record) if record.next_review.is_none_or(|due| due <= now) => {
                record.last_solved = Some(event.submitted_at);
                record.time_spent = event.time_spent;
                record.solve_count += 1;
                advance(record, window, now);
                ReconcileAction::Advanced
            }
            _ => ReconcileAction::Ignored,
        };

        let outcome = Reconciliation {
            key: Some(key),
            action,
        };
        return Applied::new(records, outcome);
    }

    let Some(key) = event.record_key() else {
        let outcome = Reconciliation {
            key: None,
            action: ReconcileAction::Ignored,
        };
        return Applied::new(records, outcome);
    };

    let mut record = ProblemRecord::from_event(event, now);
    record.next_review = Some(compute_next_review(&record, window, now));
    records.insert(key.clone(), record);

    let outcome = Reconciliation {
        key: Some(key),
        action: ReconcileAction::Created,
    };
    Applied::new(records, outcome)
}

/// Mark a record reviewed, whether or not it is due.
///
/// Looks the record up by exact key only. Reports `false` when there is no
/// such record.
pub fn confirm_review(
    mut records: RecordSet,
    key: &str,
    window: Option<&StudyWindow>,
    now: DateTime<Utc>,
) -> Applied<bool> {
    let confirmed = match records.get_mut(key) {
        Some(record) => {
            advance(record, window, now);
            true
        }
        None => false,
    };

    Applied::new(records, confirmed)
}

/// Remove one record, looked up by exact key and then by its url field.
pub fn delete_record(mut records: RecordSet, key: &str) -> Applied<bool> {
    if records.remove(key).is_some() {
        return Applied::new(records, true);
    }

    let by_url = records
        .iter()
        .find(|(_, record)| record.url == key)
        .map(|(found, _)| found.clone());

    let deleted = by_url.is_some_and(|found| records.remove(&found).is_some());
    Applied::new(records, deleted)
}

/// Schedule every record that has no review date yet. Reports how many were fixed.
pub fn backfill_next_reviews(
    mut records: RecordSet,
    window: Option<&StudyWindow>,
) -> Applied<usize> {
    let mut fixed = 0;
    for record in records.values_mut().filter(|r| r.next_review.is_none()) {
        record.next_review = Some(compute_next_review(record, window, record.schedule_anchor()));
        fixed += 1;
    }

    Applied::new(records, fixed)
}

/// Recompute every record's review date under `window`, e.g. after the study
/// end date changed. Reports how many dates moved.
///
/// Without a window each record is rescheduled from its own last review (or
/// first solve), which reproduces the ladder date it was given at the time.
pub fn reschedule_all(mut records: RecordSet, window: Option<&StudyWindow>) -> Applied<usize> {
    let mut moved = 0;
    for record in records.values_mut() {
        let next = Some(compute_next_review(record, window, record.schedule_anchor()));
        if record.next_review != next {
            record.next_review = next;
            moved += 1;
        }
    }

    Applied::new(records, moved)
}

fn advance(record: &mut ProblemRecord, window: Option<&StudyWindow>, now: DateTime<Utc>) {
    record.last_reviewed = Some(now);
    record.review_count += 1;
    record.next_review = Some(compute_next_review(record, window, now));
}
