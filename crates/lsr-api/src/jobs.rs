//! Background jobs.
//!
//! The only job counts the problems due for review on a fixed interval. The
//! count feeds the `reviews_due` gauge, the server-side stand-in for the
//! extension's badge.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::interval};

use crate::{metrics, tracker::ReviewTracker};

/// Start all background jobs
///
/// Returns the join handles so the caller can abort them on shutdown
pub fn start_background_jobs(tracker: Arc<ReviewTracker>, every: Duration) -> Vec<JoinHandle<()>> {
    vec![tokio::spawn(periodic_due_check_job(tracker, every))]
}

/// Shortest period the due check runs at
const MIN_DUE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Count due reviews now and then every `every`, at least one second apart
async fn periodic_due_check_job(tracker: Arc<ReviewTracker>, every: Duration) {
    let mut interval = interval(every.max(MIN_DUE_CHECK_INTERVAL));

    loop {
        // First tick completes immediately
        interval.tick().await;

        if let Err(e) = check_due_reviews(&tracker).await {
            tracing::error!("Failed to count due reviews: {e}");
        }
    }
}

/// Refresh the due-review gauge. Returns the count.
pub async fn check_due_reviews(tracker: &ReviewTracker) -> Result<usize, crate::error::ApiError> {
    let due = tracker.due_reviews().await?.len();
    metrics::set_reviews_due(due);

    if due > 0 {
        tracing::info!(due, "Problems due for review");
    } else {
        tracing::debug!("No problems due for review");
    }
    Ok(due)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use lsr_db::MemoryStore;
    use lsr_srs::{Difficulty, SolvedEvent};

    fn solved_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
    }

    fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_check_due_reviews_counts() {
        let store = MemoryStore::new();
        let tracker = ReviewTracker::new(store.clone()).with_clock(solved_at);
        assert_eq!(check_due_reviews(&tracker).await.unwrap(), 0);

        tracker
            .record_solved(SolvedEvent {
                id: None,
                url: "https://leetcode.com/problems/a/".to_string(),
                title: "A".to_string(),
                difficulty: Difficulty::Medium,
                tags: Vec::new(),
                time_spent: None,
                submitted_at: solved_at(),
            })
            .await
            .unwrap();

        // Seen from a month later the first rung has long passed
        let tracker = ReviewTracker::new(store).with_clock(later);
        assert_eq!(check_due_reviews(&tracker).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_interval_job_keeps_running() {
        let tracker = Arc::new(ReviewTracker::new(MemoryStore::new()).with_clock(solved_at));
        let handles = start_background_jobs(tracker, Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(50)).await;
        for handle in handles {
            assert!(!handle.is_finished());
            handle.abort();
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let tracker = ReviewTracker::new(store);
        assert!(check_due_reviews(&tracker).await.is_err());
    }
}
