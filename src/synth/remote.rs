//! Review synthesis through a remote text-generation call.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::SynthesisError;
use crate::llm::{ChatMessage, CompletionRequest, FinishReason, LlmProvider, SamplingParams};

use super::entropy::Entropy;
use super::prompts::build_review_prompt;
use super::sanitize::Sanitizer;
use super::{SynthesisRequest, Synthesizer};

pub struct RemoteSynthesizer {
    llm: Arc<dyn LlmProvider>,
    business: String,
    entropy: Entropy,
    sampling: SamplingParams,
    sanitizer: Sanitizer,
}

impl RemoteSynthesizer {
    pub fn new(llm: Arc<dyn LlmProvider>, business: impl Into<String>, entropy: Entropy) -> Self {
        Self {
            llm,
            business: business.into(),
            entropy,
            sampling: SamplingParams::default(),
            sanitizer: Sanitizer::default_rules(),
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }
}

#[async_trait]
impl Synthesizer for RemoteSynthesizer {
    fn name(&self) -> &str {
        "remote"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, SynthesisError> {
        if !request.preferences.can_proceed() {
            return Err(SynthesisError::NothingToDescribe);
        }

        let prompt = build_review_prompt(request, &self.business, &self.entropy);
        info!(
            model = self.llm.model_name(),
            rating = %request.rating.rating,
            tags = request.preferences.tags.len(),
            hints = prompt.hints.len(),
            persona = %prompt.persona,
            "Requesting generated review"
        );

        let completion = self.sampling.apply(CompletionRequest::new(vec![
            ChatMessage::system(prompt.system),
            ChatMessage::user(prompt.user),
        ]));
        let response = self.llm.complete(completion).await?;
        debug!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            "Completion received"
        );

        // A reply that hit the token cap ends mid-sentence
        if response.finish_reason == FinishReason::Length {
            warn!(
                output_tokens = response.output_tokens,
                "Generated review hit the token limit"
            );
            return Err(SynthesisError::Truncated {
                output_tokens: response.output_tokens,
            });
        }

        let cleaned = self.sanitizer.apply(&response.content);
        if cleaned.is_empty() {
            return Err(SynthesisError::EmptyAfterCleanup);
        }

        let leftover = self.sanitizer.violations(&cleaned);
        if !leftover.is_empty() {
            warn!(rules = ?leftover, "Generated review still matches sanitizer rules");
        }
        Ok(cleaned)
    }
}
