//! Error types for the review wizard.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Handoff error: {0}")]
    Handoff(#[from] HandoffError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text-generation provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} returned HTTP {status}: {body}")]
    HttpStatus {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} returned no content")]
    EmptyResponse { provider: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Failures while turning a rating and preferences into review text.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Nothing to describe: select a preference or write some text")]
    NothingToDescribe,

    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Proxy request failed: {0}")]
    Proxy(String),

    #[error("Generated review was empty after cleanup")]
    EmptyAfterCleanup,

    #[error("Generated review was cut off after {output_tokens} tokens")]
    Truncated { output_tokens: u32 },

    #[error("No usable review templates: each one needs a {{feature}} placeholder")]
    NoTemplates,
}

/// Rejected wizard operations. State is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },

    #[error("Unknown preference tag: {0}")]
    UnknownPreference(String),

    #[error("No review is ready yet")]
    ReviewNotReady,

    #[error("Select a preference or write some text first")]
    CannotProceed,
}

/// Clipboard write failures.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("No clipboard backend available: {0}")]
    Unavailable(String),

    #[error("Clipboard command {command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Copy-and-redirect failures.
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("Could not copy the review automatically; copy it manually")]
    ManualCopyRequired { text: String },

    #[error("Navigation to {url} failed: {reason}")]
    NavigationFailed { url: String, reason: String },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
