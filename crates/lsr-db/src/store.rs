//! Store abstractions the review tracker persists through.
//!
//! The tracker treats persistence as load-all → operate → save-all, so the
//! traits only expose whole-collection reads and writes.

use async_trait::async_trait;
use sqlx::PgPool;

use lsr_srs::{ProblemRecord, RecordSet};

use crate::{
    error::StoreError,
    models::StudySettings,
    repositories::{problem, settings},
};

/// Durable mapping from record key to [`ProblemRecord`].
#[async_trait]
pub trait ProblemStore: Send + Sync {
    /// Every stored record.
    async fn load_all(&self) -> Result<RecordSet, StoreError>;

    /// Replace the stored records with `records`.
    async fn save_all(&self, records: &RecordSet) -> Result<(), StoreError>;

    /// Remove every record.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// The single study window setting.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load_settings(&self) -> Result<StudySettings, StoreError>;

    async fn save_settings(&self, settings: &StudySettings) -> Result<(), StoreError>;
}

/// Records and settings behind one store, for changes that touch both.
#[async_trait]
pub trait ReviewStore: ProblemStore + SettingsStore {
    /// Store `settings` and replace the records with `records` as one write.
    /// On failure neither is changed.
    async fn save_schedule(
        &self,
        records: &RecordSet,
        settings: &StudySettings,
    ) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProblemStore for PgStore {
    async fn load_all(&self) -> Result<RecordSet, StoreError> {
        let rows = problem::fetch_all_problems(&self.pool).await?;

        rows.into_iter()
            .map(|(key, record)| {
                match serde_json::from_value::<ProblemRecord>(record.0) {
                    Ok(record) => Ok((key, record)),
                    Err(source) => Err(StoreError::Serialization { key, source }),
                }
            })
            .collect()
    }

    async fn save_all(&self, records: &RecordSet) -> Result<(), StoreError> {
        // Single transaction so a failed save leaves the previous set intact
        let mut tx = self.pool.begin().await?;

        problem::delete_all_problems(&mut *tx).await?;
        for (key, record) in records {
            problem::insert_problem(&mut *tx, key, record).await?;
        }

        tx.commit().await?;
        tracing::debug!(count = records.len(), "Saved problem records");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let removed = problem::delete_all_problems(&self.pool).await?;
        tracing::info!(removed, "Cleared all problem records");
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for PgStore {
    async fn load_settings(&self) -> Result<StudySettings, StoreError> {
        Ok(settings::fetch_study_settings(&self.pool)
            .await?
            .unwrap_or_default())
    }

    async fn save_settings(&self, study: &StudySettings) -> Result<(), StoreError> {
        settings::upsert_study_settings(&self.pool, study).await?;
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn save_schedule(
        &self,
        records: &RecordSet,
        study: &StudySettings,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        settings::upsert_study_settings(&mut *tx, study).await?;
        problem::delete_all_problems(&mut *tx).await?;
        for (key, record) in records {
            problem::insert_problem(&mut *tx, key, record).await?;
        }

        tx.commit().await?;
        tracing::debug!(count = records.len(), "Saved settings with rescheduled records");
        Ok(())
    }
}
