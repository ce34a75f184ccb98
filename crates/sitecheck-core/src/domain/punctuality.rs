//! Punctuality policy: delay, penalty tiers, presence status.

use chrono::{DateTime, Utc};

use super::job::JobStatus;

/// Worker counts as on-site up to this many minutes after the start.
pub const PRESENCE_WINDOW_MINUTES: f64 = 3.0;

/// Past this delay the moderate penalty applies (10% off).
pub const MODERATE_DELAY_MINUTES: f64 = 10.0;

/// Past this delay the severe penalty applies (25% off).
pub const SEVERE_DELAY_MINUTES: f64 = 20.0;

const MODERATE_PENALTY_FACTOR: f64 = 0.90;
const SEVERE_PENALTY_FACTOR: f64 = 0.75;

/// Result of evaluating a check-in against the schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Punctuality {
    /// Minutes past the scheduled start. Negative for early arrival;
    /// reported as-is, but never penalized.
    pub delay_minutes: f64,

    /// Punctuality-adjusted pay, locked in at check-in.
    pub payout: f64,

    /// Presence status written at check-in (`OnSite` or `Late`). Distinct
    /// from the overall lifecycle status, which later moves to `Completed`.
    pub presence: JobStatus,
}

/// Evaluate a check-in. Pure: same inputs, same outputs, no side effects.
///
/// Penalty tiers, first match wins (boundaries are strict `>`, so delays of
/// exactly 10 or 20 minutes land on the cheaper side):
/// - delay > 20 min  -> 75% of base pay
/// - delay > 10 min  -> 90% of base pay
/// - otherwise       -> full base pay
pub fn evaluate(
    scheduled_start: DateTime<Utc>,
    check_in_time: DateTime<Utc>,
    base_pay: f64,
) -> Punctuality {
    let delay_minutes = (check_in_time - scheduled_start).num_seconds() as f64 / 60.0;

    let payout = if delay_minutes > SEVERE_DELAY_MINUTES {
        base_pay * SEVERE_PENALTY_FACTOR
    } else if delay_minutes > MODERATE_DELAY_MINUTES {
        base_pay * MODERATE_PENALTY_FACTOR
    } else {
        base_pay
    };

    let presence = if delay_minutes <= PRESENCE_WINDOW_MINUTES {
        JobStatus::OnSite
    } else {
        JobStatus::Late
    };

    Punctuality {
        delay_minutes,
        payout,
        presence,
    }
}
