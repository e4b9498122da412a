//! Rating, preference and review data models.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::GenerationToken;

/// Preference tags the user can attribute their satisfaction to, in display order.
pub const PREFERENCE_OPTIONS: [&str; 6] = [
    "Customer Support",
    "Ease of Set Up",
    "Targeting Accuracy",
    "Lead Quality",
    "Results I Got",
    "Professionalism",
];

/// Whether `tag` is one of the fixed preference options.
pub fn is_known_preference(tag: &str) -> bool {
    PREFERENCE_OPTIONS.contains(&tag)
}

/// The satisfaction rating picked on the first screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    Ok,
    Bad,
}

impl Rating {
    /// All ratings in display order.
    pub const ALL: [Rating; 4] = [Rating::Excellent, Rating::Good, Rating::Ok, Rating::Bad];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Excellent => "🤩",
            Self::Good => "😊",
            Self::Ok => "😐",
            Self::Bad => "😞",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Ok => "Okay",
            Self::Bad => "Bad",
        }
    }

    /// Positive ratings continue to the preference step; the rest end the wizard.
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Excellent | Self::Good)
    }

    pub fn selection(self) -> RatingSelection {
        RatingSelection {
            rating: self,
            label: self.label().to_string(),
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Ok => "ok",
            Self::Bad => "bad",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Rating {
    type Err = String;

    /// Accepts the snake_case name, the display label (any case) or the emoji.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Rating::ALL
            .into_iter()
            .find(|r| {
                r.to_string() == trimmed.to_lowercase()
                    || r.label().eq_ignore_ascii_case(trimmed)
                    || r.symbol() == trimmed
            })
            .ok_or_else(|| format!("unknown rating: {trimmed}"))
    }
}

/// A recorded rating choice. Immutable for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSelection {
    pub rating: Rating,
    pub label: String,
}

impl RatingSelection {
    pub fn is_positive(&self) -> bool {
        self.rating.is_positive()
    }
}

/// Selected preference tags (selection order preserved) plus optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSet {
    pub tags: Vec<String>,
    pub text: String,
}

impl PreferenceSet {
    /// Flip membership of `tag`. Returns `true` if the tag is now selected.
    pub fn toggle(&mut self, tag: &str) -> bool {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
            false
        } else {
            self.tags.push(tag.to_string());
            true
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Free text with surrounding whitespace removed, if any remains.
    pub fn trimmed_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// True iff at least one tag is selected or the free text is non-blank.
    pub fn can_proceed(&self) -> bool {
        !self.tags.is_empty() || self.trimmed_text().is_some()
    }
}

/// Review text produced by a synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReview {
    pub text: String,
    pub token: GenerationToken,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedReview {
    pub fn new(text: impl Into<String>, token: GenerationToken) -> Self {
        Self {
            text: text.into(),
            token,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_subset() {
        assert!(Rating::Excellent.is_positive());
        assert!(Rating::Good.is_positive());
        assert!(!Rating::Ok.is_positive());
        assert!(!Rating::Bad.is_positive());
    }

    #[test]
    fn rating_parses_name_label_and_symbol() {
        assert_eq!("excellent".parse::<Rating>().unwrap(), Rating::Excellent);
        assert_eq!("Okay".parse::<Rating>().unwrap(), Rating::Ok);
        assert_eq!(" BAD ".parse::<Rating>().unwrap(), Rating::Bad);
        assert_eq!("😊".parse::<Rating>().unwrap(), Rating::Good);
        assert!("superb".parse::<Rating>().is_err());
    }

    #[test]
    fn display_matches_serde() {
        for rating in Rating::ALL {
            let json = serde_json::to_string(&rating).unwrap();
            assert_eq!(format!("\"{rating}\""), json);
        }
    }

    #[test]
    fn toggle_twice_restores_tags() {
        let mut prefs = PreferenceSet::default();
        prefs.toggle("Lead Quality");
        let before = prefs.tags.clone();

        assert!(prefs.toggle("Customer Support"));
        assert!(!prefs.toggle("Customer Support"));
        assert_eq!(prefs.tags, before);
    }

    #[test]
    fn toggle_preserves_selection_order() {
        let mut prefs = PreferenceSet::default();
        prefs.toggle("Professionalism");
        prefs.toggle("Customer Support");
        assert_eq!(prefs.tags, vec!["Professionalism", "Customer Support"]);
    }

    #[test]
    fn can_proceed_requires_tag_or_text() {
        let mut prefs = PreferenceSet::default();
        assert!(!prefs.can_proceed());

        prefs.text = "   ".into();
        assert!(!prefs.can_proceed());
        assert!(prefs.trimmed_text().is_none());

        prefs.text = "  fast onboarding ".into();
        assert!(prefs.can_proceed());
        assert_eq!(prefs.trimmed_text(), Some("fast onboarding"));

        prefs.text.clear();
        prefs.toggle("Lead Quality");
        assert!(prefs.can_proceed());
    }

    #[test]
    fn known_preferences() {
        assert!(is_known_preference("Ease of Set Up"));
        assert!(!is_known_preference("ease of set up"));
        assert!(!is_known_preference("Reach"));
    }
}
