//! Offline review synthesis from sentence templates.

use async_trait::async_trait;
use tracing::debug;

use crate::error::SynthesisError;

use super::entropy::Entropy;
use super::{SynthesisRequest, Synthesizer};

/// Placeholders: `{feature}` (required), `{rating}` (lower-case label),
/// `{Rating}` (label as displayed), `{business}`.
pub const DEFAULT_TEMPLATES: [&str; 4] = [
    "My experience with {business} was {rating}! Their {feature} really stood out and made everything so much easier. Highly recommend!",
    "{Rating} experience working with {business}! I especially appreciated their {feature}. I'll definitely be coming back.",
    "{business} exceeded my expectations! Their {feature} was impressive and delivered real value. 5 stars!",
    "Outstanding experience with {business}. The {feature} made all the difference in achieving my goals. Highly recommend their services!",
];

pub struct TemplateSynthesizer {
    business: String,
    templates: Vec<String>,
    entropy: Entropy,
}

impl TemplateSynthesizer {
    pub fn new(business: impl Into<String>, entropy: Entropy) -> Self {
        Self {
            business: business.into(),
            templates: DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect(),
            entropy,
        }
    }

    /// Replace the template list. Templates without `{feature}` are skipped;
    /// at least one must remain.
    pub fn with_templates(mut self, templates: Vec<String>) -> Result<Self, SynthesisError> {
        let usable: Vec<String> = templates
            .into_iter()
            .filter(|t| t.contains("{feature}"))
            .collect();
        if usable.is_empty() {
            return Err(SynthesisError::NoTemplates);
        }
        self.templates = usable;
        Ok(self)
    }

    /// Fill one randomly chosen template.
    pub fn render(&self, request: &SynthesisRequest) -> Result<String, SynthesisError> {
        let feature = match request.preferences.trimmed_text() {
            Some(text) => text.to_string(),
            None => self
                .entropy
                .choose(&request.preferences.tags)
                .map(|tag| tag.to_lowercase())
                .ok_or(SynthesisError::NothingToDescribe)?,
        };

        let template = self
            .entropy
            .choose(&self.templates)
            .ok_or(SynthesisError::NoTemplates)?;

        debug!(template = %template, feature = %feature, "Rendering review template");
        Ok(template
            .replace("{business}", &self.business)
            .replace("{Rating}", &request.rating.label)
            .replace("{rating}", &request.rating.label.to_lowercase())
            .replace("{feature}", &feature))
    }
}

#[async_trait]
impl Synthesizer for TemplateSynthesizer {
    fn name(&self) -> &str {
        "template"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, SynthesisError> {
        self.render(request)
    }
}
