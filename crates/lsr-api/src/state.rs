use std::sync::Arc;

use lsr_db::{MemoryStore, PgStore};

use crate::{ApiConfig, tracker::ReviewTracker};

#[derive(Clone, Debug)]
pub struct ApiState {
    pub tracker: Arc<ReviewTracker>,
}

impl ApiState {
    pub fn new(tracker: ReviewTracker) -> Self {
        Self {
            tracker: Arc::new(tracker),
        }
    }

    /// Pick the store from the configuration: PostgreSQL when `DATABASE_URL`
    /// is set, process memory otherwise.
    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let tracker = match config.database_url.as_deref() {
            Some(database_url) => {
                let pool = lsr_db::create_pool(database_url, config.db_max_connections).await?;
                lsr_db::ensure_db_and_migrate(database_url, &pool).await?;
                tracing::info!("Connected to PostgreSQL store");
                ReviewTracker::new(PgStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, records are kept in memory only");
                ReviewTracker::new(MemoryStore::new())
            }
        };

        Ok(Self::new(tracker))
    }
}
