//! Job record and status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{JobId, LocationId};

/// Job status over the whole lifecycle.
///
/// State transitions:
/// - Scheduled -> OnSite -> Completed   (punctual check-in)
/// - Scheduled -> Late -> Completed     (delayed check-in)
///
/// Transitions are forward-only; `Completed` is terminal. The store never
/// sees a regression because the controller guards every write, but the
/// rank check below keeps the rule testable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Created, worker not yet on site.
    #[serde(rename = "scheduled")]
    Scheduled,

    /// Checked in within the punctuality window.
    #[serde(rename = "on-site")]
    OnSite,

    /// Checked in past the punctuality window.
    #[serde(rename = "late")]
    Late,

    /// Checked out; quality fields are frozen.
    #[serde(rename = "completed")]
    Completed,
}

impl JobStatus {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed)
    }

    /// Would moving to `next` go forward (or stay put)?
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return next == self;
        }
        next.rank() >= self.rank()
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Scheduled => 0,
            // OnSite and Late are the same phase, reached by the same
            // transition; neither is "ahead" of the other.
            JobStatus::OnSite | JobStatus::Late => 1,
            JobStatus::Completed => 2,
        }
    }

    /// Wire form ("scheduled", "on-site", "late", "completed").
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::OnSite => "on-site",
            JobStatus::Late => "late",
            JobStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job record: the central entity of the attendance workflow.
///
/// Design:
/// - `id`, `location_id`, `scheduled_start`, `base_pay` are immutable,
///   assigned at creation (outside this core).
/// - Check-in sets `check_in_time`, `final_payout`, and the presence
///   status, each exactly once.
/// - Check-out sets `check_out_time` and the quality fields exactly once
///   and re-writes `final_payout` so a partial update can never drop it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub location_id: LocationId,
    pub scheduled_start: DateTime<Utc>,
    pub base_pay: f64,
    pub status: JobStatus,

    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,

    /// Punctuality-adjusted pay, locked at check-in. Never cleared once
    /// set; the check-out bonus may increase it.
    #[serde(default)]
    pub final_payout: Option<f64>,

    #[serde(default)]
    pub check_out_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub quality_score: Option<u8>,

    #[serde(default)]
    pub quality_summary: Option<String>,

    #[serde(default)]
    pub needs_maintenance: Option<bool>,

    /// Optional evidence photo submitted at check-out.
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl JobRecord {
    /// A freshly scheduled job with no check-in yet.
    pub fn scheduled(
        id: JobId,
        location_id: LocationId,
        scheduled_start: DateTime<Utc>,
        base_pay: f64,
    ) -> Self {
        Self {
            id,
            location_id,
            scheduled_start,
            base_pay,
            status: JobStatus::Scheduled,
            check_in_time: None,
            final_payout: None,
            check_out_time: None,
            quality_score: None,
            quality_summary: None,
            needs_maintenance: None,
            photo_url: None,
        }
    }

    pub fn is_checked_in(&self) -> bool {
        self.check_in_time.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }
}
