//! Wizard state machine: which screen is active and how synthesis is going.

use serde::{Deserialize, Serialize};

/// The screens of the wizard.
///
/// Progresses forward only: SelectingRating → CollectingPreferences →
/// Redirecting, or SelectingRating → Negative. A reset is the only way back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardState {
    #[default]
    SelectingRating,
    CollectingPreferences,
    Negative,
    Redirecting,
}

impl WizardState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardState) -> bool {
        use WizardState::*;
        matches!(
            (self, target),
            (SelectingRating, CollectingPreferences)
                | (SelectingRating, Negative)
                | (CollectingPreferences, Redirecting)
        )
    }

    /// Whether this state has no outgoing transitions (other than reset).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Negative | Self::Redirecting)
    }
}

impl std::fmt::Display for WizardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SelectingRating => "selecting_rating",
            Self::CollectingPreferences => "collecting_preferences",
            Self::Negative => "negative",
            Self::Redirecting => "redirecting",
        };
        write!(f, "{s}")
    }
}

/// Sequence number attached to every synthesis request.
///
/// Results carrying anything but the most recently issued token are stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationToken(pub u64);

impl GenerationToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Progress of the latest synthesis request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisStatus {
    #[default]
    Idle,
    Pending { token: GenerationToken },
    Ready,
    Failed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use WizardState::*;
        for (from, to) in [
            (SelectingRating, CollectingPreferences),
            (SelectingRating, Negative),
            (CollectingPreferences, Redirecting),
        ] {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use WizardState::*;
        assert!(!SelectingRating.can_transition_to(Redirecting));
        assert!(!CollectingPreferences.can_transition_to(Negative));
        assert!(!CollectingPreferences.can_transition_to(SelectingRating));
        assert!(!Negative.can_transition_to(CollectingPreferences));
        assert!(!Redirecting.can_transition_to(CollectingPreferences));
        assert!(!CollectingPreferences.can_transition_to(CollectingPreferences));
    }

    #[test]
    fn terminal_states() {
        assert!(WizardState::Negative.is_terminal());
        assert!(WizardState::Redirecting.is_terminal());
        assert!(!WizardState::SelectingRating.is_terminal());
        assert!(!WizardState::CollectingPreferences.is_terminal());
    }

    #[test]
    fn display_matches_serde() {
        use WizardState::*;
        for state in [SelectingRating, CollectingPreferences, Negative, Redirecting] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(format!("\"{state}\""), json);
        }
    }

    #[test]
    fn tokens_increase() {
        let first = GenerationToken::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.to_string(), "#1");
    }

    #[test]
    fn status_serializes_with_tag() {
        let pending = SynthesisStatus::Pending {
            token: GenerationToken(3),
        };
        let json = serde_json::to_value(&pending).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["token"], 3);
    }
}
