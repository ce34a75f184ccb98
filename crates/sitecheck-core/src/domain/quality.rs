//! Quality assessment derived from the worker's check-out notes.

use serde::{Deserialize, Serialize};

/// Longest summary we keep; provider output is unbounded.
pub const SUMMARY_MAX_CHARS: usize = 240;

/// Fallback score when the analysis provider is unusable.
pub const FALLBACK_SCORE: u8 = 70;

/// Fallback summary flagging the report for a human.
pub const FALLBACK_SUMMARY: &str = "Manual review required.";

/// Structured quality assessment of a completion report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// 0..=100; clamped on construction.
    pub score: u8,

    /// Short display summary; truncated on construction.
    pub summary: String,

    #[serde(rename = "maintenance_needed")]
    pub needs_maintenance: bool,
}

impl QualityReport {
    /// Build a report from raw provider output, clamping the score into
    /// 0..=100 and truncating the summary to a display length. The clamp
    /// happens here so no out-of-range value can leak past construction.
    pub fn from_raw(score: f64, summary: impl Into<String>, needs_maintenance: bool) -> Self {
        let mut summary: String = summary.into();
        if summary.chars().count() > SUMMARY_MAX_CHARS {
            summary = summary.chars().take(SUMMARY_MAX_CHARS).collect();
        }
        Self {
            score: score.round().clamp(0.0, 100.0) as u8,
            summary,
            needs_maintenance,
        }
    }

    /// The fixed result used when the provider times out, errors, or
    /// returns something unparseable.
    pub fn fallback() -> Self {
        Self {
            score: FALLBACK_SCORE,
            summary: FALLBACK_SUMMARY.to_string(),
            needs_maintenance: false,
        }
    }
}
