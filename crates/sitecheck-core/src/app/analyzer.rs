//! Quality analyzer - adapter over the analysis provider.
//!
//! Contract: `analyze` always produces a report. Provider trouble
//! (timeout, transport error, unparseable output) degrades to a fixed
//! fallback instead of failing the check-out that triggered it.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::quality::QualityReport;
use crate::ports::analysis::AnalysisProvider;

/// Reference timeout for the provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

pub struct QualityAnalyzer {
    provider: Arc<dyn AnalysisProvider>,
    timeout: Duration,
}

impl QualityAnalyzer {
    pub fn new(provider: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Override the provider timeout (tests use a short one).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Assess a completion report. Never fails: any provider-side problem
    /// yields `QualityReport::fallback()`.
    pub async fn analyze(&self, notes: &str) -> QualityReport {
        let prompt = build_prompt(notes);

        let completion =
            match tokio::time::timeout(self.timeout, self.provider.generate(&prompt, true)).await {
                Ok(Ok(text)) => text,
                Ok(Err(err)) => {
                    warn!(error = %err, "analysis provider failed, using fallback report");
                    return QualityReport::fallback();
                }
                Err(_) => {
                    warn!(timeout_secs = self.timeout.as_secs(), "analysis provider timed out, using fallback report");
                    return QualityReport::fallback();
                }
            };

        match parse_report(&completion) {
            Some(report) => report,
            None => {
                warn!("analysis provider returned unparseable output, using fallback report");
                QualityReport::fallback()
            }
        }
    }
}

fn build_prompt(notes: &str) -> String {
    format!(
        "You are reviewing a field worker's completion report for an on-site service job.\n\
         Report:\n\
         \"\"\"\n\
         {notes}\n\
         \"\"\"\n\
         Respond with a single JSON object containing exactly these three fields:\n\
         \"score\": an integer from 0 to 100 rating the work quality,\n\
         \"summary\": a one-sentence summary of the report,\n\
         \"maintenance_needed\": a boolean, true if the report mentions damage or anything needing repair.\n\
         Return only the JSON object, nothing else."
    )
}

/// Raw provider output, before clamping and truncation.
#[derive(serde::Deserialize)]
struct RawAnalysis {
    score: f64,
    summary: String,
    maintenance_needed: bool,
}

/// Decode the provider's completion.
///
/// Providers wrap the JSON in decorative formatting (markdown fences,
/// leading prose), so we cut to the outermost braces before decoding
/// rather than trusting the text to be bare JSON.
fn parse_report(text: &str) -> Option<QualityReport> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let raw: RawAnalysis = serde_json::from_str(&text[start..=end]).ok()?;
    Some(QualityReport::from_raw(
        raw.score,
        raw.summary,
        raw.maintenance_needed,
    ))
}
