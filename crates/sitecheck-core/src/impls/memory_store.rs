//! In-memory job store (dev and tests).
//!
//! Same shape as the production store: a keyed job table plus a location
//! secret table, joined on fetch. Patch application goes through
//! `JobPatch::apply`, so the merge semantics under test are the ones the
//! controller relies on.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::StoreError;
use crate::domain::ids::{JobId, LocationId};
use crate::domain::job::JobRecord;
use crate::ports::job_store::{JobPatch, JobStore, JobWithSecret};

#[derive(Default)]
struct Tables {
    jobs: HashMap<JobId, JobRecord>,
    location_secrets: HashMap<LocationId, String>,
}

#[derive(Default)]
pub struct InMemoryJobStore {
    tables: Arc<Mutex<Tables>>,

    /// Number of `update` calls accepted. Lets tests assert that rejected
    /// requests performed no mutation at all.
    update_calls: AtomicU32,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_location(&self, id: LocationId, secret: impl Into<String>) {
        let mut tables = self.tables.lock().await;
        tables.location_secrets.insert(id, secret.into());
    }

    /// Insert a job row, replacing any existing row with the same id.
    pub async fn insert_job(&self, record: JobRecord) {
        let mut tables = self.tables.lock().await;
        tables.jobs.insert(record.id, record);
    }

    /// Current state of a row, cloned.
    pub async fn snapshot(&self, id: JobId) -> Option<JobRecord> {
        let tables = self.tables.lock().await;
        tables.jobs.get(&id).cloned()
    }

    pub fn update_count(&self) -> u32 {
        self.update_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn fetch_with_secret(&self, id: JobId) -> Result<Option<JobWithSecret>, StoreError> {
        let tables = self.tables.lock().await;
        let Some(record) = tables.jobs.get(&id) else {
            return Ok(None);
        };

        let secret = tables
            .location_secrets
            .get(&record.location_id)
            .ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "job {id} references missing location {}",
                    record.location_id
                ))
            })?;

        Ok(Some(JobWithSecret {
            record: record.clone(),
            location_secret: secret.clone(),
        }))
    }

    async fn fetch(&self, id: JobId) -> Result<Option<JobRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.jobs.get(&id).cloned())
    }

    async fn update(&self, id: JobId, patch: JobPatch) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let record = tables
            .jobs
            .get_mut(&id)
            .ok_or_else(|| StoreError::Corrupt(format!("update of missing job {id}")))?;

        patch.apply(record);
        self.update_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
