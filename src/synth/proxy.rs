//! Review synthesis through the generation proxy. Carries no credential.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::SynthesisError;
use crate::server::api::{ErrorBody, GenerateReviewRequest, GenerateReviewResponse};

use super::{SynthesisRequest, Synthesizer};

pub struct ProxySynthesizer {
    client: reqwest::Client,
    base_url: String,
}

impl ProxySynthesizer {
    /// `base_url` is the proxy root, e.g. `http://127.0.0.1:8787`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Bound each request so a stalled proxy surfaces as a failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, SynthesisError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SynthesisError::Proxy(format!("Failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    fn generate_url(&self) -> String {
        format!("{}/api/reviews/generate", self.base_url)
    }
}

#[async_trait]
impl Synthesizer for ProxySynthesizer {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, SynthesisError> {
        if !request.preferences.can_proceed() {
            return Err(SynthesisError::NothingToDescribe);
        }

        let body = GenerateReviewRequest {
            rating: request.rating.rating.to_string(),
            tags: request.preferences.tags.clone(),
            text: request.preferences.text.clone(),
        };

        debug!(url = %self.generate_url(), "Requesting review from proxy");
        let resp = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesisError::Proxy(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let reason = resp
                .json::<ErrorBody>()
                .await
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            return Err(SynthesisError::Proxy(reason));
        }

        let parsed: GenerateReviewResponse = resp
            .json()
            .await
            .map_err(|e| SynthesisError::Proxy(format!("invalid response: {e}")))?;

        if parsed.review.trim().is_empty() {
            return Err(SynthesisError::EmptyAfterCleanup);
        }
        Ok(parsed.review)
    }
}
