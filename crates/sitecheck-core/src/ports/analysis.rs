//! AnalysisProvider port - the external text-analysis service.
//!
//! Deliberately narrow: text in, text out. The provider knows nothing
//! about quality reports; prompt construction and response parsing belong
//! to the analyzer, so provider quirks (markdown fences, prose around the
//! JSON) never leak past it.

use async_trait::async_trait;

use crate::domain::errors::ProviderError;

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Run one completion. `want_structured` asks the provider to emit
    /// machine-readable output where supported; the caller still owns
    /// parsing whatever text comes back.
    async fn generate(&self, prompt: &str, want_structured: bool)
    -> Result<String, ProviderError>;
}
