//! Events broadcast by a wizard session to whatever renders it.

use serde::{Deserialize, Serialize};

use crate::handoff::{CopyMethod, NavigationMode};

use super::state::{GenerationToken, WizardState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    /// The active screen changed.
    StateChanged { state: WizardState },
    /// A positive rating was picked. Purely cosmetic.
    Celebrate,
    /// The previous review no longer matches the inputs.
    ReviewCleared,
    /// A synthesis request was issued.
    SynthesisStarted { token: GenerationToken },
    /// The latest synthesis request produced a review.
    ReviewReady { token: GenerationToken, text: String },
    /// The latest synthesis request failed. The user may retry.
    SynthesisFailed { token: GenerationToken, reason: String },
    /// The review text is on the clipboard.
    Copied { method: CopyMethod },
    /// Both clipboard paths failed; the user has to copy the text by hand.
    ManualCopyRequired { text: String },
    /// Redirect progress, 0 to 100.
    Progress { percent: u8 },
    /// The destination was opened.
    Navigated { url: String, mode: NavigationMode },
    /// The destination could not be opened; the user has to visit `url` by hand.
    NavigationFailed { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = WizardEvent::ReviewReady {
            token: GenerationToken(2),
            text: "Solid leads.".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "review_ready");
        assert_eq!(json["token"], 2);

        let parsed: WizardEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }
}
