//! The review tracker service.
//!
//! Every operation follows the same cycle: load the records (and the study
//! window) from the stores, run the pure scheduling code from `lsr_srs`, save
//! the result. Mutating operations hold the write queue for the whole cycle,
//! so two writers can never interleave and the due-date gate always sees the
//! latest review count.

use std::{fmt, future::Future, sync::Arc, time::Instant};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use lsr_db::{ReviewStore, StoreError, StudySettings};
use lsr_srs::{
    Applied, Difficulty, ProblemView, ReconcileAction, Reconciliation, RecordSet, ReviewPlan,
    SolvedEvent, StudyWindow,
};

use crate::{error::ApiError, metrics, validation};

/// Version stamped on exported documents.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Source of the current time.
pub type Clock = fn() -> DateTime<Utc>;

/// Stored study window and whether it is usable for scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyWindowStatus {
    #[serde(flatten)]
    pub settings: StudySettings,
    /// `None` when unset or malformed; scheduling then uses the ladder.
    pub window: Option<StudyWindow>,
}

/// New study window requested by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyWindowUpdate {
    pub end_date: String,
    #[serde(default)]
    pub start_date: Option<String>,
}

/// A bounded review plan with its dates spelled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPlanView {
    pub key: String,
    #[serde(flatten)]
    pub plan: ReviewPlan,
    pub review_dates: Vec<NaiveDate>,
    pub review_count: u32,
}

/// Everything the user tracks, as handed out by the export action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub problems: Vec<ProblemView>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

pub struct ReviewTracker {
    store: Arc<dyn ReviewStore>,
    write_queue: Mutex<()>,
    clock: Clock,
}

impl fmt::Debug for ReviewTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewTracker").finish_non_exhaustive()
    }
}

impl ReviewTracker {
    pub fn new<S: ReviewStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
            write_queue: Mutex::new(()),
            clock: Utc::now,
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Merge a "problem solved" event into the records.
    pub async fn record_solved(&self, event: SolvedEvent) -> Result<Reconciliation, ApiError> {
        validation::validate_solved_event(&event)?;
        let _queue = self.write_queue.lock().await;

        let window = self.study_window().await?;
        let records = self.load_records().await?;
        let applied = lsr_srs::reconcile(records, &event, window.as_ref(), self.now());
        let outcome = applied.outcome.clone();

        if outcome.action != ReconcileAction::Ignored {
            self.save_records(&applied.records).await?;
        }

        metrics::record_reconcile_action(outcome.action);
        tracing::info!(
            key = outcome.key.as_deref().unwrap_or_default(),
            action = outcome.action.as_str(),
            title = %event.title,
            "Solved event reconciled"
        );
        Ok(outcome)
    }

    /// Mark a record reviewed regardless of its due date. `false` when the
    /// key is unknown.
    pub async fn confirm_review(&self, key: &str) -> Result<bool, ApiError> {
        let _queue = self.write_queue.lock().await;

        let window = self.study_window().await?;
        let records = self.load_records().await?;
        let confirmed = self
            .persist_if(lsr_srs::confirm_review(records, key, window.as_ref(), self.now()), |c| *c)
            .await?;

        if confirmed {
            tracing::info!(key, "Review confirmed");
        } else {
            tracing::info!(key, "Review confirmation for unknown problem");
        }
        Ok(confirmed)
    }

    /// Delete one record by key or url. `false` when nothing matched.
    pub async fn delete(&self, key: &str) -> Result<bool, ApiError> {
        let _queue = self.write_queue.lock().await;

        let records = self.load_records().await?;
        let deleted = self
            .persist_if(lsr_srs::delete_record(records, key), |d| *d)
            .await?;

        if deleted {
            tracing::info!(key, "Problem deleted");
        } else {
            tracing::info!(key, "Problem not found for deletion");
        }
        Ok(deleted)
    }

    /// Remove every record.
    pub async fn clear_all(&self) -> Result<bool, ApiError> {
        let _queue = self.write_queue.lock().await;

        observe("clear", self.store.clear()).await?;
        tracing::info!("All problems cleared");
        Ok(true)
    }

    /// Records due for review now.
    pub async fn due_reviews(&self) -> Result<Vec<ProblemView>, ApiError> {
        let records = self.load_records().await?;
        Ok(lsr_srs::due_reviews(&records, self.now()))
    }

    /// Every record, soonest review first, optionally of one difficulty only.
    pub async fn all_problems(
        &self,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<ProblemView>, ApiError> {
        let records = self.load_records().await?;
        let mut views = lsr_srs::all_problems(&records, self.now());

        if let Some(difficulty) = difficulty {
            views.retain(|view| view.record.difficulty == difficulty);
        }
        Ok(views)
    }

    /// The bounded review plan of one record. `None` when no study window is set.
    pub async fn review_plan(&self, key: &str) -> Result<Option<ReviewPlanView>, ApiError> {
        let window = self.study_window().await?;
        let records = self.load_records().await?;
        let record = records
            .get(key)
            .ok_or_else(|| ApiError::NotFound(format!("Problem '{key}' is not tracked")))?;

        Ok(window.map(|window| {
            let plan = ReviewPlan::new(record.created_at, &window);
            ReviewPlanView {
                key: key.to_string(),
                review_dates: plan.review_dates().iter().map(|d| d.date_naive()).collect(),
                review_count: record.review_count,
                plan,
            }
        }))
    }

    /// Recompute every review date under the current settings.
    pub async fn reschedule_all(&self) -> Result<usize, ApiError> {
        let _queue = self.write_queue.lock().await;
        self.reschedule_locked().await
    }

    /// Schedule records stored without a review date. Run once at startup.
    pub async fn backfill_next_reviews(&self) -> Result<usize, ApiError> {
        let _queue = self.write_queue.lock().await;

        let window = self.study_window().await?;
        let records = self.load_records().await?;
        let fixed = self
            .persist_if(lsr_srs::backfill_next_reviews(records, window.as_ref()), |n| *n > 0)
            .await?;

        if fixed > 0 {
            tracing::info!(fixed, "Backfilled missing review dates");
        }
        Ok(fixed)
    }

    pub async fn study_window_status(&self) -> Result<StudyWindowStatus, ApiError> {
        let settings = observe("load_settings", self.store.load_settings()).await?;
        let window = settings.window();
        Ok(StudyWindowStatus { settings, window })
    }

    /// Store a new study window and reschedule everything under it. Returns
    /// how many review dates moved.
    pub async fn set_study_window(&self, update: StudyWindowUpdate) -> Result<usize, ApiError> {
        let today = self.now().date_naive();
        let end = validation::validate_study_end(&update.end_date, today)?;
        let start = validation::validate_study_start(update.start_date.as_deref(), end)?;

        let settings = StudySettings {
            end_date: Some(end.format("%Y-%m-%d").to_string()),
            start_date: start.map(|s| s.format("%Y-%m-%d").to_string()),
        };

        let _queue = self.write_queue.lock().await;
        let moved = self.replace_settings(&settings).await?;
        tracing::info!(end_date = %end, start_date = ?start, "Study window set");
        Ok(moved)
    }

    /// Drop the study window and go back to the ladder.
    pub async fn clear_study_window(&self) -> Result<usize, ApiError> {
        let _queue = self.write_queue.lock().await;
        let moved = self.replace_settings(&StudySettings::default()).await?;
        tracing::info!("Study window cleared");
        Ok(moved)
    }

    pub async fn export(&self) -> Result<ExportDocument, ApiError> {
        Ok(ExportDocument {
            problems: self.all_problems(None).await?,
            export_date: self.now(),
            version: EXPORT_VERSION.to_string(),
        })
    }

    /// Caller must hold the write queue.
    async fn reschedule_locked(&self) -> Result<usize, ApiError> {
        let window = self.study_window().await?;
        let records = self.load_records().await?;
        let moved = self
            .persist_if(lsr_srs::reschedule_all(records, window.as_ref()), |n| *n > 0)
            .await?;

        tracing::info!(moved, bounded = window.is_some(), "Review dates recomputed");
        Ok(moved)
    }

    /// Store new settings together with every record rescheduled under them.
    /// Caller must hold the write queue.
    async fn replace_settings(&self, settings: &StudySettings) -> Result<usize, ApiError> {
        let window = settings.window();
        let records = self.load_records().await?;
        let applied = lsr_srs::reschedule_all(records, window.as_ref());

        observe("save_schedule", self.store.save_schedule(&applied.records, settings)).await?;

        let moved = applied.outcome;
        tracing::info!(moved, bounded = window.is_some(), "Review dates recomputed");
        Ok(moved)
    }

    /// The usable study window, if any. Malformed settings are logged and
    /// treated as unset.
    async fn study_window(&self) -> Result<Option<StudyWindow>, ApiError> {
        let settings = observe("load_settings", self.store.load_settings()).await?;
        if settings.is_malformed() {
            tracing::warn!(
                end_date = ?settings.end_date,
                start_date = ?settings.start_date,
                "Ignoring malformed study window settings"
            );
        }
        Ok(settings.window())
    }

    async fn load_records(&self) -> Result<RecordSet, ApiError> {
        Ok(observe("load_all", self.store.load_all()).await?)
    }

    async fn save_records(&self, records: &RecordSet) -> Result<(), ApiError> {
        Ok(observe("save_all", self.store.save_all(records)).await?)
    }

    async fn persist_if<T>(
        &self,
        applied: Applied<T>,
        changed: impl FnOnce(&T) -> bool,
    ) -> Result<T, ApiError> {
        if changed(&applied.outcome) {
            self.save_records(&applied.records).await?;
        }
        Ok(applied.outcome)
    }
}

async fn observe<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    let start = Instant::now();
    let result = call.await;
    metrics::record_store_operation(operation, start.elapsed().as_secs_f64(), result.is_ok());
    result
}
