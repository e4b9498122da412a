//! Prompt construction for remote review generation.

use super::SynthesisRequest;
use super::entropy::Entropy;

/// Most elaboration hints injected into a single prompt.
pub const MAX_HINTS: usize = 3;

/// Descriptive phrases per preference tag, used for lexical variety.
pub static TAG_HINTS: [(&str, [&str; 3]); 6] = [
    (
        "Customer Support",
        [
            "quick, helpful replies from the support team",
            "someone actually walked me through my questions",
            "support felt personal rather than scripted",
        ],
    ),
    (
        "Ease of Set Up",
        [
            "getting the first campaign live without a long onboarding",
            "setup steps that were clear from the start",
            "not needing a developer to get going",
        ],
    ),
    (
        "Targeting Accuracy",
        [
            "ads reaching people who actually fit our customer profile",
            "audience targeting that felt precise",
            "fewer wasted clicks from the wrong audience",
        ],
    ),
    (
        "Lead Quality",
        [
            "leads who were ready to talk",
            "better-fit inquiries coming in",
            "our sales team spending less time on dead-end leads",
        ],
    ),
    (
        "Results I Got",
        [
            "more booked calls from the same budget",
            "a steady pipeline of qualified prospects",
            "results we could see in our CRM",
        ],
    ),
    (
        "Professionalism",
        [
            "clear communication and reporting",
            "a team that kept its promises on timelines",
            "being straightforward about what to expect",
        ],
    ),
];

pub const PERSONAS: [&str; 5] = [
    "a small business owner",
    "a marketing manager at a growing company",
    "a busy agency founder",
    "a local service provider",
    "an e-commerce store owner",
];

pub const TIME_REFERENCES: [&str; 5] = [
    "over the past few weeks",
    "since we started last quarter",
    "in the first month",
    "over the last couple of months",
    "so far this year",
];

/// Hard constraints the generated review must satisfy.
pub const CONSTRAINTS: [&str; 7] = [
    "Write 2 to 4 sentences.",
    "Do not include any percentages or numeric statistics.",
    "Do not use superlatives such as \"one of the best\", \"absolutely amazing\" or \"game-changer\".",
    "Do not use the em-dash character.",
    "Write in the first person with a natural, conversational tone, like a real customer.",
    "Talk about targeting quality and lead quality only; do not mention reach, impressions or visibility.",
    "Output only the review text, without quotes or a title.",
];

pub const SYSTEM_PROMPT: &str = "You write short, believable customer reviews. \
You never invent statistics and you follow every rule you are given exactly.";

/// System and user instructions for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPrompt {
    pub system: String,
    pub user: String,
    /// Hints that were injected, in prompt order.
    pub hints: Vec<String>,
    pub persona: String,
    pub time_reference: String,
}

/// Elaboration phrases for `tag`, if it is a known preference.
pub fn hints_for(tag: &str) -> Option<&'static [&'static str; 3]> {
    TAG_HINTS.iter().find(|(t, _)| *t == tag).map(|(_, h)| h)
}

/// Pick 1–2 hints per selected tag, in tag order, at most [`MAX_HINTS`] total.
pub fn pick_hints(tags: &[String], entropy: &Entropy) -> Vec<String> {
    let mut picked: Vec<String> = Vec::new();
    for tag in tags {
        let remaining = MAX_HINTS - picked.len();
        if remaining == 0 {
            break;
        }
        let Some(hints) = hints_for(tag) else {
            continue;
        };
        let amount = entropy.between(1, 2).min(remaining);
        picked.extend(
            entropy
                .choose_multiple(hints.as_slice(), amount)
                .into_iter()
                .map(|h| h.to_string()),
        );
    }
    picked
}

/// Build the prompt for `request`.
pub fn build_review_prompt(
    request: &SynthesisRequest,
    business: &str,
    entropy: &Entropy,
) -> ReviewPrompt {
    let hints = pick_hints(&request.preferences.tags, entropy);
    let persona = entropy.choose(&PERSONAS).copied().unwrap_or(PERSONAS[0]).to_string();
    let time_reference = entropy
        .choose(&TIME_REFERENCES)
        .copied()
        .unwrap_or(TIME_REFERENCES[0])
        .to_string();

    let mut user = format!(
        "Write a Google review for {business} as {persona}.\n\
         Overall rating: {rating}.\n",
        rating = request.rating.label,
    );

    if !request.preferences.tags.is_empty() {
        user.push_str(&format!(
            "What they liked most: {}.\n",
            request.preferences.tags.join(", ")
        ));
    }
    if !hints.is_empty() {
        user.push_str(&format!("Details you can draw on: {}.\n", hints.join("; ")));
    }
    if let Some(text) = request.preferences.trimmed_text() {
        user.push_str(&format!("In their own words: \"{text}\"\n"));
    }
    user.push_str(&format!(
        "Refer to the time frame naturally, e.g. \"{time_reference}\".\n\nRules:\n"
    ));
    for (i, constraint) in CONSTRAINTS.iter().enumerate() {
        user.push_str(&format!("{}. {constraint}\n", i + 1));
    }

    ReviewPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
        hints,
        persona,
        time_reference,
    }
}
