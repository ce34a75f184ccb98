//! HTTP analysis provider - client for the text-analysis service.
//!
//! The service is stateless: one prompt in, one text completion out. No
//! retries here; the analyzer's fallback is the recovery path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::errors::ProviderError;
use crate::ports::analysis::AnalysisProvider;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    structured: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

pub struct HttpAnalysisProvider {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl HttpAnalysisProvider {
    pub fn new(endpoint: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl AnalysisProvider for HttpAnalysisProvider {
    async fn generate(
        &self,
        prompt: &str,
        want_structured: bool,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&GenerateRequest {
                prompt,
                structured: want_structured,
            })
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(format!("decoding completion: {e}")))?;

        if body.text.trim().is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(body.text)
    }
}
