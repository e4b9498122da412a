//! Configuration types.
//!
//! Everything is read from `REVIEW_WIZARD_*` environment variables with
//! defaults for all but the generation credential, which is only required by
//! the `remote` strategy. The credential comes from `REVIEW_WIZARD_API_KEY` or
//! from the file named by `REVIEW_WIZARD_API_KEY_FILE` and is held as a
//! [`SecretString`].

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::handoff::{HandoffConfig, NavigationMode};
use crate::llm::{DEFAULT_ENDPOINT, DEFAULT_MODEL, LlmConfig, SamplingParams};
use crate::synth::SynthesisStrategy;

pub const DEFAULT_BUSINESS_NAME: &str = "TrueAim AI";
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8787";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Business the reviews are written about.
    pub business_name: String,
    pub handoff: HandoffConfig,
    pub strategy: SynthesisStrategy,
    /// Delay before a scheduled synthesis runs; superseded requests never start.
    pub synthesis_debounce: Duration,
    /// Fixed seed for reproducible template and prompt choices.
    pub seed: Option<u64>,
    /// Root URL of the generation proxy (`proxy` strategy).
    pub proxy_url: String,
    /// Listen address for `serve`.
    pub bind_addr: String,
    pub llm_endpoint: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub api_key: Option<SecretString>,
    pub sampling: SamplingParams,
    /// Directory for daily-rolling log files, if file logging is wanted.
    pub log_dir: Option<PathBuf>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            business_name: DEFAULT_BUSINESS_NAME.to_string(),
            handoff: HandoffConfig::default(),
            strategy: SynthesisStrategy::default(),
            synthesis_debounce: Duration::ZERO,
            seed: None,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            llm_endpoint: DEFAULT_ENDPOINT.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            llm_timeout: Duration::from_secs(30),
            api_key: None,
            sampling: SamplingParams::default(),
            log_dir: None,
        }
    }
}

impl WizardConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let progress_step: u8 = parse_or(&get, "REVIEW_WIZARD_PROGRESS_STEP", defaults.handoff.progress_step)?;
        if !(1..=100).contains(&progress_step) {
            return Err(ConfigError::InvalidValue {
                key: "REVIEW_WIZARD_PROGRESS_STEP".into(),
                message: "must be between 1 and 100".into(),
            });
        }

        let handoff = HandoffConfig {
            destination_url: get("REVIEW_WIZARD_DESTINATION_URL")
                .unwrap_or(defaults.handoff.destination_url),
            progress_duration: Duration::from_millis(parse_or(
                &get,
                "REVIEW_WIZARD_PROGRESS_MS",
                defaults.handoff.progress_duration.as_millis() as u64,
            )?),
            progress_step,
            navigation: get("REVIEW_WIZARD_USER_AGENT")
                .map(|ua| NavigationMode::for_user_agent(&ua))
                .unwrap_or(defaults.handoff.navigation),
        };

        let api_key = match get("REVIEW_WIZARD_API_KEY") {
            Some(key) => Some(SecretString::from(key)),
            None => match get("REVIEW_WIZARD_API_KEY_FILE") {
                Some(path) => Some(read_key_file(&path)?),
                None => None,
            },
        };

        let sampling = SamplingParams {
            max_tokens: parse_or(&get, "REVIEW_WIZARD_MAX_TOKENS", defaults.sampling.max_tokens)?,
            temperature: parse_or(&get, "REVIEW_WIZARD_TEMPERATURE", defaults.sampling.temperature)?,
            ..defaults.sampling
        };

        Ok(Self {
            business_name: get("REVIEW_WIZARD_BUSINESS").unwrap_or(defaults.business_name),
            handoff,
            strategy: parse_or(&get, "REVIEW_WIZARD_STRATEGY", defaults.strategy)?,
            synthesis_debounce: Duration::from_millis(parse_or(&get, "REVIEW_WIZARD_DEBOUNCE_MS", 0)?),
            seed: get("REVIEW_WIZARD_SEED")
                .map(|s| parse_value::<u64>("REVIEW_WIZARD_SEED", &s))
                .transpose()?,
            proxy_url: get("REVIEW_WIZARD_PROXY_URL").unwrap_or(defaults.proxy_url),
            bind_addr: get("REVIEW_WIZARD_BIND").unwrap_or(defaults.bind_addr),
            llm_endpoint: get("REVIEW_WIZARD_LLM_ENDPOINT").unwrap_or(defaults.llm_endpoint),
            llm_model: get("REVIEW_WIZARD_MODEL").unwrap_or(defaults.llm_model),
            llm_timeout: Duration::from_secs(parse_or(
                &get,
                "REVIEW_WIZARD_LLM_TIMEOUT_SECS",
                defaults.llm_timeout.as_secs(),
            )?),
            api_key,
            sampling,
            log_dir: get("REVIEW_WIZARD_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Provider settings for the `remote` strategy. Fails without a credential.
    pub fn llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let api_key = self.api_key.clone().ok_or_else(|| ConfigError::MissingRequired {
            key: "REVIEW_WIZARD_API_KEY".into(),
            hint: "Set it (or REVIEW_WIZARD_API_KEY_FILE) on the server running the remote strategy"
                .into(),
        })?;
        Ok(LlmConfig {
            endpoint: self.llm_endpoint.clone(),
            api_key,
            model: self.llm_model.clone(),
            timeout: self.llm_timeout,
        })
    }
}

fn read_key_file(path: &str) -> Result<SecretString, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let key = contents.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "REVIEW_WIZARD_API_KEY_FILE".into(),
            message: format!("{path} is empty"),
        });
    }
    Ok(SecretString::from(key.to_string()))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}
