//! Text-generation integration.
//!
//! A single OpenAI-compatible chat completions backend, reached through the
//! `LlmProvider` trait so synthesis can be tested against stubs.

pub mod openai;
pub mod provider;

pub use openai::OpenAiCompatProvider;
pub use provider::*;

use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling settings for review generation. High temperature and penalties
/// keep repeated reviews from reading alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 220,
            temperature: 1.1,
            top_p: 0.95,
            frequency_penalty: 0.5,
            presence_penalty: 0.6,
        }
    }
}

impl SamplingParams {
    /// Attach these settings to `request`.
    pub fn apply(&self, request: CompletionRequest) -> CompletionRequest {
        request
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_frequency_penalty(self.frequency_penalty)
            .with_presence_penalty(self.presence_penalty)
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub timeout: Duration,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = OpenAiCompatProvider::new(
        config.endpoint.clone(),
        config.api_key.clone(),
        config.model.clone(),
    )
    .with_timeout(config.timeout)?;
    tracing::info!(model = %config.model, endpoint = %config.endpoint, "Using chat completions provider");
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_provider_constructs_without_network() {
        let config = LlmConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: secrecy::SecretString::from("sk-test"),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(20),
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn sampling_params_applied() {
        let request = SamplingParams::default().apply(CompletionRequest::new(vec![]));
        assert_eq!(request.max_tokens, Some(220));
        assert_eq!(request.top_p, Some(0.95));
        assert_eq!(request.presence_penalty, Some(0.6));
    }

    #[test]
    fn config_debug_redacts_key() {
        let config = LlmConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: secrecy::SecretString::from("sk-very-secret"),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(20),
        };
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
