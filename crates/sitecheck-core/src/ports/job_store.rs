//! JobStore port - the keyed record store holding job rows.
//!
//! The store is the source of truth for job state. The controller only
//! needs three operations: a join-fetch that resolves the location secret
//! alongside the job, a plain fetch, and a partial update. Writes are
//! merges: a field absent from the patch is left untouched, which is what
//! lets check-out re-write `final_payout` explicitly instead of trusting
//! the write shape to preserve it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::StoreError;
use crate::domain::ids::JobId;
use crate::domain::job::{JobRecord, JobStatus};

/// A job row joined with its location's secret.
///
/// The location is never materialized on its own; the secret is the only
/// field check-in needs from it.
#[derive(Debug, Clone)]
pub struct JobWithSecret {
    pub record: JobRecord,
    pub location_secret: String,
}

/// Partial update of a job row.
///
/// Every field is optional; `None` means "leave untouched" and is skipped
/// during serialization, so the wire shape of a patch is exactly the set
/// of columns being written.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_payout: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_maintenance: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl JobPatch {
    /// Merge this patch into a record. Shared by the in-memory store; the
    /// REST store gets the same semantics from the row API's PATCH.
    pub fn apply(&self, record: &mut JobRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(t) = self.check_in_time {
            record.check_in_time = Some(t);
        }
        if let Some(p) = self.final_payout {
            record.final_payout = Some(p);
        }
        if let Some(t) = self.check_out_time {
            record.check_out_time = Some(t);
        }
        if let Some(s) = self.quality_score {
            record.quality_score = Some(s);
        }
        if let Some(s) = &self.quality_summary {
            record.quality_summary = Some(s.clone());
        }
        if let Some(m) = self.needs_maintenance {
            record.needs_maintenance = Some(m);
        }
        if let Some(u) = &self.photo_url {
            record.photo_url = Some(u.clone());
        }
    }
}

/// Keyed record store for job rows.
///
/// Implementations: `InMemoryJobStore` (dev/test), `RestJobStore`
/// (PostgREST-style row API).
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch a job joined with its location's secret. `Ok(None)` when the
    /// job does not exist.
    async fn fetch_with_secret(&self, id: JobId) -> Result<Option<JobWithSecret>, StoreError>;

    /// Fetch a job row. `Ok(None)` when the job does not exist.
    async fn fetch(&self, id: JobId) -> Result<Option<JobRecord>, StoreError>;

    /// Apply a partial update. Fields absent from the patch stay as they
    /// are in the store.
    async fn update(&self, id: JobId, patch: JobPatch) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::LocationId;
    use chrono::TimeZone;
    use ulid::Ulid;

    fn record() -> JobRecord {
        JobRecord::scheduled(
            JobId::from_ulid(Ulid::new()),
            LocationId::from_ulid(Ulid::new()),
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            100.0,
        )
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut job = record();
        job.final_payout = Some(90.0);
        let before = job.clone();

        JobPatch::default().apply(&mut job);

        assert_eq!(job.final_payout, before.final_payout);
        assert_eq!(job.status, before.status);
        assert_eq!(job.check_in_time, before.check_in_time);
    }

    #[test]
    fn patch_writes_only_named_fields() {
        let mut job = record();
        job.final_payout = Some(90.0);
        job.check_in_time = Some(job.scheduled_start);

        JobPatch {
            status: Some(JobStatus::Completed),
            quality_score: Some(95),
            ..Default::default()
        }
        .apply(&mut job);

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.quality_score, Some(95));
        // Untouched by the patch:
        assert_eq!(job.final_payout, Some(90.0));
        assert!(job.check_in_time.is_some());
    }

    #[test]
    fn patch_serialization_skips_absent_fields() {
        let patch = JobPatch {
            final_payout: Some(95.0),
            status: Some(JobStatus::Completed),
            ..Default::default()
        };

        let json = serde_json::to_value(&patch).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["final_payout"], 95.0);
        assert_eq!(obj["status"], "completed");
    }
}
