//! Lifecycle controller - the two-phase job state machine.
//!
//! Check-in: verify the presented location code, compute the punctuality
//! payout, persist it in one partial update. Check-out: re-read the
//! authoritative payout, derive a quality report (degradable), apply the
//! bonus rule, persist in one partial update that re-writes the payout
//! explicitly so it can never be dropped.
//!
//! All guards run before the first store write: a rejected request leaves
//! the record exactly as it was.

use std::sync::Arc;

use tracing::info;

use crate::app::analyzer::QualityAnalyzer;
use crate::domain::errors::{JobError, StoreError};
use crate::domain::ids::JobId;
use crate::domain::job::JobStatus;
use crate::domain::punctuality;
use crate::domain::quality::QualityReport;
use crate::ports::clock::Clock;
use crate::ports::job_store::{JobPatch, JobStore};

/// Flat bonus added to the payout for an excellent report.
pub const QUALITY_BONUS: f64 = 5.0;

/// Minimum score that earns the bonus (inclusive).
pub const QUALITY_BONUS_THRESHOLD: u8 = 90;

const BONUS_ANNOTATION: &str = " (quality bonus awarded)";

/// What check-in reports back to the worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckInOutcome {
    pub status: JobStatus,
    pub delay_minutes: f64,
    pub payout: f64,
}

/// What check-out reports back to the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutOutcome {
    pub status: JobStatus,
    pub report: QualityReport,
    pub payout: f64,
}

/// Orchestrates the two lifecycle transitions against the record store.
///
/// Collaborators are injected at construction; there are no ambient
/// clients anywhere in the crate.
pub struct LifecycleController {
    store: Arc<dyn JobStore>,
    analyzer: QualityAnalyzer,
    clock: Arc<dyn Clock>,
}

impl LifecycleController {
    pub fn new(store: Arc<dyn JobStore>, analyzer: QualityAnalyzer, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            analyzer,
            clock,
        }
    }

    /// Check a worker in against the presented location code.
    ///
    /// Exactly one record mutation on success, none on failure. A repeated
    /// check-in is rejected: the first punctuality evaluation is the one
    /// that counts, and `check_in_time` / `final_payout` are write-once.
    pub async fn check_in(
        &self,
        job_id: JobId,
        presented_code: &str,
    ) -> Result<CheckInOutcome, JobError> {
        let joined = self
            .store
            .fetch_with_secret(job_id)
            .await?
            .ok_or(JobError::NotFound(job_id))?;

        if presented_code != joined.location_secret {
            return Err(JobError::InvalidCode);
        }
        if joined.record.is_checked_in() {
            return Err(JobError::AlreadyCheckedIn(job_id));
        }

        let now = self.clock.now();
        let p = punctuality::evaluate(joined.record.scheduled_start, now, joined.record.base_pay);

        self.store
            .update(
                job_id,
                JobPatch {
                    status: Some(p.presence),
                    check_in_time: Some(now),
                    final_payout: Some(p.payout),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            job_id = %job_id,
            status = %p.presence,
            delay_minutes = p.delay_minutes,
            payout = p.payout,
            "worker checked in"
        );

        Ok(CheckInOutcome {
            status: p.presence,
            delay_minutes: p.delay_minutes,
            payout: p.payout,
        })
    }

    /// Check a worker out with their free-text notes.
    ///
    /// The job must exist and be checked in; both guards run before the
    /// analysis provider is ever called. Analyzer degradation does not
    /// block the check-out - the fallback report completes it with
    /// degraded quality data.
    pub async fn check_out(
        &self,
        job_id: JobId,
        notes: &str,
        photo_url: Option<String>,
    ) -> Result<CheckOutOutcome, JobError> {
        let record = self
            .store
            .fetch(job_id)
            .await?
            .ok_or(JobError::NotFound(job_id))?;

        if record.is_completed() {
            return Err(JobError::AlreadyCompleted(job_id));
        }
        if !record.is_checked_in() {
            return Err(JobError::NotCheckedIn(job_id));
        }

        // The authoritative payout is whatever check-in stored, re-read
        // here; client-supplied values are never trusted. Check-in writes
        // both fields together, so a checked-in row without a payout is
        // corrupt, not merely empty.
        let locked_payout = record.final_payout.ok_or_else(|| {
            StoreError::Corrupt(format!("job {job_id} is checked in but has no payout on record"))
        })?;

        let mut report = self.analyzer.analyze(notes).await;

        let payout = if report.score >= QUALITY_BONUS_THRESHOLD {
            report.summary.push_str(BONUS_ANNOTATION);
            locked_payout + QUALITY_BONUS
        } else {
            locked_payout
        };

        let now = self.clock.now();
        self.store
            .update(
                job_id,
                JobPatch {
                    status: Some(JobStatus::Completed),
                    check_in_time: None,
                    check_out_time: Some(now),
                    quality_score: Some(report.score),
                    quality_summary: Some(report.summary.clone()),
                    needs_maintenance: Some(report.needs_maintenance),
                    // Re-written even when unchanged: the partial update
                    // must never be the place this field gets lost.
                    final_payout: Some(payout),
                    photo_url,
                },
            )
            .await?;

        info!(
            job_id = %job_id,
            score = report.score,
            needs_maintenance = report.needs_maintenance,
            payout = payout,
            "worker checked out"
        );

        Ok(CheckOutOutcome {
            status: JobStatus::Completed,
            report,
            payout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ProviderError;
    use crate::domain::ids::LocationId;
    use crate::domain::job::JobRecord;
    use crate::impls::memory_store::InMemoryJobStore;
    use crate::ports::analysis::AnalysisProvider;
    use crate::ports::clock::FixedClock;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use ulid::Ulid;

    const SECRET: &str = "QR-SECRET-12";

    /// Canned provider that counts how often it is called.
    struct CountingProvider {
        reply: Result<String, ()>,
        calls: AtomicU32,
    }

    impl CountingProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicU32::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl AnalysisProvider for CountingProvider {
        async fn generate(&self, _: &str, _: bool) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(ProviderError::Status(502)),
            }
        }
    }

    fn scheduled_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    /// Store with one scheduled job (base pay 100) at a known location.
    async fn store_with_job() -> (Arc<InMemoryJobStore>, JobId) {
        let store = Arc::new(InMemoryJobStore::new());
        let location_id = LocationId::from_ulid(Ulid::new());
        let job_id = JobId::from_ulid(Ulid::new());

        store.insert_location(location_id, SECRET).await;
        store
            .insert_job(JobRecord::scheduled(
                job_id,
                location_id,
                scheduled_at(),
                100.0,
            ))
            .await;

        (store, job_id)
    }

    fn controller(
        store: Arc<InMemoryJobStore>,
        provider: Arc<CountingProvider>,
        now: DateTime<Utc>,
    ) -> LifecycleController {
        LifecycleController::new(
            store,
            QualityAnalyzer::new(provider),
            Arc::new(FixedClock::new(now)),
        )
    }

    const GREAT_REPLY: &str = r#"{"score": 95, "summary": "Great job", "maintenance_needed": false}"#;

    #[tokio::test]
    async fn punctual_check_in_locks_full_pay() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(GREAT_REPLY);
        let ctl = controller(
            store.clone(),
            provider,
            scheduled_at() + Duration::minutes(2),
        );

        let outcome = ctl.check_in(job_id, SECRET).await.unwrap();

        assert_eq!(outcome.status, JobStatus::OnSite);
        assert_eq!(outcome.delay_minutes, 2.0);
        assert_eq!(outcome.payout, 100.0);

        let row = store.snapshot(job_id).await.unwrap();
        assert_eq!(row.status, JobStatus::OnSite);
        assert_eq!(row.final_payout, Some(100.0));
        assert_eq!(row.check_in_time, Some(scheduled_at() + Duration::minutes(2)));
    }

    #[tokio::test]
    async fn late_check_in_applies_the_moderate_penalty() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(GREAT_REPLY);
        let ctl = controller(
            store.clone(),
            provider,
            scheduled_at() + Duration::minutes(15),
        );

        let outcome = ctl.check_in(job_id, SECRET).await.unwrap();

        assert_eq!(outcome.status, JobStatus::Late);
        assert_eq!(outcome.payout, 90.0);
        assert_eq!(store.snapshot(job_id).await.unwrap().final_payout, Some(90.0));
    }

    #[tokio::test]
    async fn wrong_code_is_rejected_without_touching_the_store() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(GREAT_REPLY);
        let ctl = controller(store.clone(), provider, scheduled_at());

        let err = ctl.check_in(job_id, "WRONG-CODE").await.unwrap_err();

        assert!(matches!(err, JobError::InvalidCode));
        assert_eq!(store.update_count(), 0);
        let row = store.snapshot(job_id).await.unwrap();
        assert_eq!(row.status, JobStatus::Scheduled);
        assert!(row.check_in_time.is_none());
    }

    #[tokio::test]
    async fn check_in_on_unknown_job_is_not_found() {
        let (store, _) = store_with_job().await;
        let provider = CountingProvider::replying(GREAT_REPLY);
        let ctl = controller(store, provider, scheduled_at());

        let missing = JobId::from_ulid(Ulid::new());
        let err = ctl.check_in(missing, SECRET).await.unwrap_err();

        assert!(matches!(err, JobError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn second_check_in_is_rejected_and_keeps_the_first_payout() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(GREAT_REPLY);

        let first = controller(
            store.clone(),
            provider.clone(),
            scheduled_at() + Duration::minutes(2),
        );
        first.check_in(job_id, SECRET).await.unwrap();

        // Much later retry: would re-derive a worse payout if allowed.
        let retry = controller(
            store.clone(),
            provider,
            scheduled_at() + Duration::minutes(40),
        );
        let err = retry.check_in(job_id, SECRET).await.unwrap_err();

        assert!(matches!(err, JobError::AlreadyCheckedIn(id) if id == job_id));
        assert_eq!(store.update_count(), 1);
        assert_eq!(store.snapshot(job_id).await.unwrap().final_payout, Some(100.0));
    }

    #[tokio::test]
    async fn full_lifecycle_with_bonus() {
        // Scheduled at T, base pay 100, check-in at T+15min: payout 90,
        // status late. Check-out scoring 95: payout 95, completed, bonus
        // annotation on the summary.
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(GREAT_REPLY);
        let ctl = controller(
            store.clone(),
            provider.clone(),
            scheduled_at() + Duration::minutes(15),
        );

        let check_in = ctl.check_in(job_id, SECRET).await.unwrap();
        assert_eq!(check_in.payout, 90.0);
        assert_eq!(check_in.status, JobStatus::Late);

        let check_out = ctl
            .check_out(job_id, "All clean", Some("https://cdn.example/p.jpg".into()))
            .await
            .unwrap();

        assert_eq!(check_out.status, JobStatus::Completed);
        assert_eq!(check_out.payout, 95.0);
        assert_eq!(check_out.report.score, 95);
        assert!(check_out.report.summary.contains("Great job"));
        assert!(check_out.report.summary.contains("bonus"));
        assert_eq!(provider.calls(), 1);

        let row = store.snapshot(job_id).await.unwrap();
        assert_eq!(row.status, JobStatus::Completed);
        assert_eq!(row.final_payout, Some(95.0));
        assert_eq!(row.quality_score, Some(95));
        assert_eq!(row.needs_maintenance, Some(false));
        assert_eq!(row.photo_url.as_deref(), Some("https://cdn.example/p.jpg"));
        assert!(row.check_out_time.is_some());
        // Check-in fields survived the second partial update.
        assert!(row.check_in_time.is_some());
    }

    #[tokio::test]
    async fn score_of_89_earns_no_bonus() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(
            r#"{"score": 89, "summary": "Almost perfect", "maintenance_needed": false}"#,
        );
        let ctl = controller(
            store.clone(),
            provider,
            scheduled_at() + Duration::minutes(15),
        );

        ctl.check_in(job_id, SECRET).await.unwrap();
        let outcome = ctl.check_out(job_id, "notes", None).await.unwrap();

        assert_eq!(outcome.payout, 90.0);
        assert!(!outcome.report.summary.contains("bonus"));
        assert_eq!(store.snapshot(job_id).await.unwrap().final_payout, Some(90.0));
    }

    #[tokio::test]
    async fn score_of_exactly_90_earns_the_bonus() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(
            r#"{"score": 90, "summary": "Solid work", "maintenance_needed": false}"#,
        );
        let ctl = controller(store.clone(), provider, scheduled_at());

        ctl.check_in(job_id, SECRET).await.unwrap();
        let outcome = ctl.check_out(job_id, "notes", None).await.unwrap();

        assert_eq!(outcome.payout, 105.0);
    }

    #[tokio::test]
    async fn perfect_score_earns_the_bonus() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(
            r#"{"score": 100, "summary": "Immaculate", "maintenance_needed": false}"#,
        );
        let ctl = controller(store, provider, scheduled_at());

        ctl.check_in(job_id, SECRET).await.unwrap();
        let outcome = ctl.check_out(job_id, "notes", None).await.unwrap();

        assert_eq!(outcome.payout, 105.0);
        assert!(outcome.report.summary.contains("bonus"));
    }

    #[tokio::test]
    async fn check_out_of_unknown_job_never_calls_the_provider() {
        let (store, _) = store_with_job().await;
        let provider = CountingProvider::replying(GREAT_REPLY);
        let ctl = controller(store, provider.clone(), scheduled_at());

        let missing = JobId::from_ulid(Ulid::new());
        let err = ctl.check_out(missing, "notes", None).await.unwrap_err();

        assert!(matches!(err, JobError::NotFound(id) if id == missing));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn check_out_before_check_in_is_rejected() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(GREAT_REPLY);
        let ctl = controller(store.clone(), provider.clone(), scheduled_at());

        let err = ctl.check_out(job_id, "notes", None).await.unwrap_err();

        assert!(matches!(err, JobError::NotCheckedIn(id) if id == job_id));
        assert_eq!(provider.calls(), 0);
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn repeated_check_out_is_rejected() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::replying(GREAT_REPLY);
        let ctl = controller(store.clone(), provider, scheduled_at());

        ctl.check_in(job_id, SECRET).await.unwrap();
        ctl.check_out(job_id, "notes", None).await.unwrap();
        let err = ctl.check_out(job_id, "again", None).await.unwrap_err();

        assert!(matches!(err, JobError::AlreadyCompleted(id) if id == job_id));
    }

    #[tokio::test]
    async fn provider_failure_degrades_but_completes_the_check_out() {
        let (store, job_id) = store_with_job().await;
        let provider = CountingProvider::failing();
        let ctl = controller(
            store.clone(),
            provider,
            scheduled_at() + Duration::minutes(15),
        );

        ctl.check_in(job_id, SECRET).await.unwrap();
        let outcome = ctl.check_out(job_id, "notes", None).await.unwrap();

        assert_eq!(outcome.report, QualityReport::fallback());
        assert_eq!(outcome.status, JobStatus::Completed);
        // Fallback score 70 is below the bonus threshold.
        assert_eq!(outcome.payout, 90.0);

        let row = store.snapshot(job_id).await.unwrap();
        assert_eq!(row.quality_score, Some(70));
        assert_eq!(row.final_payout, Some(90.0));
    }

    #[tokio::test]
    async fn checked_in_row_without_payout_is_reported_corrupt() {
        let (store, job_id) = store_with_job().await;

        // Simulate a row damaged outside this core: checked in, no payout.
        let mut row = store.snapshot(job_id).await.unwrap();
        row.check_in_time = Some(scheduled_at());
        row.status = JobStatus::OnSite;
        store.insert_job(row).await;

        let provider = CountingProvider::replying(GREAT_REPLY);
        let ctl = controller(store, provider.clone(), scheduled_at());
        let err = ctl.check_out(job_id, "notes", None).await.unwrap_err();

        assert!(matches!(err, JobError::Store(StoreError::Corrupt(_))));
        assert_eq!(provider.calls(), 0);
    }
}
