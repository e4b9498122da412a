//! Review synthesis: turns a rating and preferences into review text.
//!
//! Three interchangeable strategies share the [`Synthesizer`] contract:
//! - **template**: offline sentence templates, deterministic for a fixed seed
//! - **remote**: a constrained prompt sent to a chat completions endpoint,
//!   with the reply cleaned by the [`Sanitizer`]
//! - **proxy**: the same remote generation, performed by the `serve` proxy so
//!   the client never holds the credential

pub mod entropy;
pub mod prompts;
pub mod proxy;
pub mod remote;
pub mod sanitize;
pub mod template;

pub use entropy::Entropy;
pub use proxy::ProxySynthesizer;
pub use remote::RemoteSynthesizer;
pub use sanitize::{RuleKind, SanitizeRule, Sanitizer};
pub use template::TemplateSynthesizer;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::WizardConfig;
use crate::error::{ConfigError, SynthesisError};
use crate::llm::create_provider;
use crate::wizard::{PreferenceSet, RatingSelection};

/// Inputs for one synthesis call. A copy; the controller keeps the originals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub rating: RatingSelection,
    pub preferences: PreferenceSet,
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, SynthesisError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStrategy {
    #[default]
    Template,
    Remote,
    Proxy,
}

impl std::fmt::Display for SynthesisStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Template => "template",
            Self::Remote => "remote",
            Self::Proxy => "proxy",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SynthesisStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "template" => Ok(Self::Template),
            "remote" => Ok(Self::Remote),
            "proxy" => Ok(Self::Proxy),
            other => Err(format!("unknown synthesis strategy: {other}")),
        }
    }
}

/// Build the synthesizer selected by `config.strategy`.
pub fn create_synthesizer(
    config: &WizardConfig,
    entropy: Entropy,
) -> Result<Arc<dyn Synthesizer>, ConfigError> {
    let synthesizer: Arc<dyn Synthesizer> = match config.strategy {
        SynthesisStrategy::Template => {
            Arc::new(TemplateSynthesizer::new(config.business_name.clone(), entropy))
        }
        SynthesisStrategy::Remote => {
            let llm = create_provider(&config.llm_config()?).map_err(|e| {
                ConfigError::InvalidValue {
                    key: "REVIEW_WIZARD_LLM_ENDPOINT".into(),
                    message: e.to_string(),
                }
            })?;
            Arc::new(
                RemoteSynthesizer::new(llm, config.business_name.clone(), entropy)
                    .with_sampling(config.sampling),
            )
        }
        SynthesisStrategy::Proxy => Arc::new(
            ProxySynthesizer::new(config.proxy_url.clone())
                .with_timeout(config.llm_timeout)
                .map_err(|e| ConfigError::InvalidValue {
                    key: "REVIEW_WIZARD_PROXY_URL".into(),
                    message: e.to_string(),
                })?,
        ),
    };
    tracing::info!(strategy = %config.strategy, "Review synthesizer ready");
    Ok(synthesizer)
}
