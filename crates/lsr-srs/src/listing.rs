use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{ProblemRecord, RecordSet};

/// A record annotated for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemView {
    /// Storage key; what confirm and delete expect.
    pub key: String,
    #[serde(flatten)]
    pub record: ProblemRecord,
    pub days_since_last_review: Option<i64>,
    pub is_due_for_review: bool,
}

impl ProblemView {
    pub fn new(key: &str, record: &ProblemRecord, now: DateTime<Utc>) -> Self {
        Self {
            key: key.to_string(),
            record: record.clone(),
            days_since_last_review: record.days_since_last_review(now),
            is_due_for_review: record.is_due(now),
        }
    }
}

/// Records whose review date has passed, in key order.
pub fn due_reviews(records: &RecordSet, now: DateTime<Utc>) -> Vec<ProblemView> {
    records
        .iter()
        .filter(|(_, record)| record.is_due(now))
        .map(|(key, record)| ProblemView::new(key, record, now))
        .collect()
}

/// Every record, soonest review first. Records without a review date go last,
/// keeping their key order.
pub fn all_problems(records: &RecordSet, now: DateTime<Utc>) -> Vec<ProblemView> {
    let mut views: Vec<ProblemView> = records
        .iter()
        .map(|(key, record)| ProblemView::new(key, record, now))
        .collect();

    views.sort_by(|a, b| by_next_review(&a.record, &b.record));
    views
}

fn by_next_review(a: &ProblemRecord, b: &ProblemRecord) -> Ordering {
    match (a.next_review, b.next_review) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
