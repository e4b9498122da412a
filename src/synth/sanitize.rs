//! Post-processing rules for generated review text.
//!
//! Rules run in order over the whole text. Content rules rewrite phrasing
//! that reviews must not contain; tidy rules repair the punctuation and
//! spacing those rewrites leave behind.

use regex::Regex;
use tracing::debug;

/// Whether a rule removes forbidden content or only repairs formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Content,
    Tidy,
}

/// One `(pattern, replacement)` rewrite.
#[derive(Debug, Clone)]
pub struct SanitizeRule {
    pub name: &'static str,
    pub regex: Regex,
    /// Replacement text; `$1` style group references are expanded.
    pub replacement: String,
    pub kind: RuleKind,
}

/// Ordered rule set applied to every generated review.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    rules: Vec<SanitizeRule>,
}

impl Sanitizer {
    /// Rules for remote-generated reviews.
    pub fn default_rules() -> Self {
        use RuleKind::{Content, Tidy};

        let rule = |name, pattern: &str, replacement: &str, kind| SanitizeRule {
            name,
            regex: Regex::new(pattern).unwrap(),
            replacement: replacement.to_string(),
            kind,
        };

        let rules = vec![
            rule("em_dash", r"\s*\u{2014}\s*", ", ", Content),
            // "12%", "12 %", "12.5 percent", "1,000 per cent"
            rule(
                "percentage",
                r"(?i)\d+(?:[.,]\d+)*\s*(?:%|percent\b|per cent\b)",
                "a noticeable amount",
                Content,
            ),
            rule("percent_word", r"(?i)\bper\s?cent\b", "noticeably", Content),
            rule("one_of_the_best_start", r"\bOne of the (?:very )?best\b", "A really good", Content),
            rule("one_of_the_best", r"(?i)\bone of the (?:very )?best\b", "a really good", Content),
            rule("one_of_the_easiest_start", r"\bOne of the easiest\b", "A really easy", Content),
            rule("one_of_the_easiest", r"(?i)\bone of the easiest\b", "a really easy", Content),
            rule("one_of_the_most_start", r"\bOne of the most (\w+)", "A really ${1}", Content),
            rule("one_of_the_most", r"(?i)\bone of the most (\w+)", "a really ${1}", Content),
            rule(
                "absolutely_start",
                r"\bAbsolutely (?:amazing|incredible|fantastic)\b",
                "Really good",
                Content,
            ),
            rule(
                "absolutely",
                r"(?i)\babsolutely (?:amazing|incredible|fantastic)\b",
                "really good",
                Content,
            ),
            rule("game_changer_start", r"\b(?:A|The) game[- ]?changer\b", "A big help", Content),
            rule(
                "game_changer",
                r"(?i)\b(?:(?:a|the) )?game[- ]?changer\b",
                "a big help",
                Content,
            ),
            rule("leading_comma", r"^\s*,\s*", "", Tidy),
            rule("double_comma", r",\s*,", ",", Tidy),
            rule("comma_before_stop", r",\s*([.!?])", "${1}", Tidy),
            rule("space_before_punct", r"[ \t]+([,.!?;:])", "${1}", Tidy),
            rule("repeated_spaces", r"[ \t]{2,}", " ", Tidy),
        ];

        Self { rules }
    }

    /// A sanitizer with no rules; still trims and strips wrapping quotes.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a custom rule to the end of the list.
    pub fn add_rule(
        &mut self,
        name: &'static str,
        pattern: &str,
        replacement: &str,
    ) -> Result<(), regex::Error> {
        self.rules.push(SanitizeRule {
            name,
            regex: Regex::new(pattern)?,
            replacement: replacement.to_string(),
            kind: RuleKind::Content,
        });
        Ok(())
    }

    pub fn rules(&self) -> &[SanitizeRule] {
        &self.rules
    }

    /// Apply every rule in order, then trim whitespace and wrapping quotes.
    pub fn apply(&self, text: &str) -> String {
        let mut out = strip_wrapping_quotes(text.trim()).to_string();
        for rule in &self.rules {
            let replaced = rule.regex.replace_all(&out, rule.replacement.as_str());
            if replaced != out {
                debug!(rule = rule.name, "Sanitizer rule applied");
                out = replaced.into_owned();
            }
        }
        strip_wrapping_quotes(out.trim()).trim().to_string()
    }

    /// Names of content rules that still match `text`.
    pub fn violations(&self, text: &str) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|r| r.kind == RuleKind::Content && r.regex.is_match(text))
            .map(|r| r.name)
            .collect()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::default_rules()
    }
}

/// Remove one pair of quotes wrapping the whole text, if present.
fn strip_wrapping_quotes(text: &str) -> &str {
    const PAIRS: [(char, char); 3] = [('"', '"'), ('\u{201C}', '\u{201D}'), ('\'', '\'')];
    for (open, close) in PAIRS {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> String {
        Sanitizer::default_rules().apply(text)
    }

    fn has_digit_percent(text: &str) -> bool {
        Regex::new(r"\d\s*%").unwrap().is_match(text)
    }

    #[test]
    fn em_dash_becomes_comma() {
        assert_eq!(
            clean("The leads were solid \u{2014} better than before."),
            "The leads were solid, better than before."
        );
        assert_eq!(clean("Great\u{2014}really great."), "Great, really great.");
    }

    #[test]
    fn percentages_are_neutralised() {
        let out = clean("We saw a 40% jump and 12.5 percent more calls, about 1,000% better.");
        assert!(!has_digit_percent(&out), "{out}");
        assert!(!out.to_lowercase().contains("percent"), "{out}");
        assert!(out.contains("a noticeable amount"));
    }

    #[test]
    fn bare_percent_word_replaced() {
        assert_eq!(clean("Calls went up percent-wise."), "Calls went up noticeably-wise.");
    }

    #[test]
    fn superlatives_are_toned_down() {
        let out = clean(
            "One of the best tools we use. Absolutely amazing support and \
             one of the most reliable teams. Truly a game-changer.",
        );
        assert_eq!(
            out,
            "A really good tools we use. Really good support and \
             a really reliable teams. Truly a big help."
        );
        assert!(Sanitizer::default_rules().violations(&out).is_empty());
    }

    #[test]
    fn game_changer_variants() {
        assert_eq!(clean("The game changer was targeting."), "A big help was targeting.");
        assert_eq!(clean("It was a Game-Changer!"), "It was a big help!");
    }

    #[test]
    fn wrapping_quotes_removed() {
        assert_eq!(clean("\"Solid leads every week.\""), "Solid leads every week.");
        assert_eq!(clean("\u{201C}Solid leads.\u{201D}"), "Solid leads.");
    }

    #[test]
    fn leading_dash_leaves_no_comma() {
        assert_eq!(clean("\u{2014} great leads"), "great leads");
    }

    #[test]
    fn violations_report_forbidden_content() {
        let sanitizer = Sanitizer::default_rules();
        let found = sanitizer.violations("An absolutely incredible 20% lift \u{2014} wow");
        assert!(found.contains(&"em_dash"));
        assert!(found.contains(&"percentage"));
        assert!(found.contains(&"absolutely"));
        assert!(sanitizer.violations("Solid, steady leads.").is_empty());
    }

    #[test]
    fn output_never_contains_dash_or_digit_percent() {
        let sanitizer = Sanitizer::default_rules();
        let samples = [
            "100%",
            "5 %\u{2014}%",
            "x50% y\u{2014}\u{2014}z",
            "3%%",
            "\u{2014}\u{2014}\u{2014}",
            "Up 7.25 % \u{2014} wow, 9%!",
            "plain text",
        ];
        for sample in samples {
            let out = sanitizer.apply(sample);
            assert!(!out.contains('\u{2014}'), "{sample:?} -> {out:?}");
            assert!(!has_digit_percent(&out), "{sample:?} -> {out:?}");
        }
    }

    #[test]
    fn custom_rules_run_last() {
        let mut sanitizer = Sanitizer::empty();
        sanitizer.add_rule("reach", r"(?i)\breach\b", "targeting").unwrap();
        assert_eq!(sanitizer.apply("Great reach."), "Great targeting.");
        assert!(sanitizer.add_rule("bad", "(", "").is_err());
    }

    #[test]
    fn rule_order_is_stable() {
        let names: Vec<_> = Sanitizer::default_rules().rules().iter().map(|r| r.name).collect();
        assert_eq!(names[0], "em_dash");
        assert_eq!(names[1], "percentage");
        assert_eq!(names.last(), Some(&"repeated_spaces"));
    }
}
