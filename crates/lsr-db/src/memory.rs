//! In-process store, used when no database is configured and in tests.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use lsr_srs::RecordSet;

use crate::{
    error::StoreError,
    models::StudySettings,
    store::{ProblemStore, ReviewStore, SettingsStore},
};

#[derive(Debug, Default)]
struct MemoryState {
    problems: RecordSet,
    settings: StudySettings,
}

/// Store backed by process memory. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `problems`.
    pub fn with_records(problems: RecordSet) -> Self {
        let state = MemoryState {
            problems,
            settings: StudySettings::default(),
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            unavailable: Arc::default(),
        }
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    /// until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProblemStore for MemoryStore {
    async fn load_all(&self) -> Result<RecordSet, StoreError> {
        self.ensure_available()?;
        Ok(self.state.read().await.problems.clone())
    }

    async fn save_all(&self, records: &RecordSet) -> Result<(), StoreError> {
        self.ensure_available()?;
        self.state.write().await.problems = records.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.ensure_available()?;
        self.state.write().await.problems.clear();
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load_settings(&self) -> Result<StudySettings, StoreError> {
        self.ensure_available()?;
        Ok(self.state.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: &StudySettings) -> Result<(), StoreError> {
        self.ensure_available()?;
        self.state.write().await.settings = settings.clone();
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn save_schedule(
        &self,
        records: &RecordSet,
        settings: &StudySettings,
    ) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        state.problems = records.clone();
        state.settings = settings.clone();
        Ok(())
    }
}
