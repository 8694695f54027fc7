//! Deterministic rule tiers
//!
//! Each rule is a pure function from text to an optional verdict. `None`
//! passes the text on to the next tier.

use crate::patterns::{contains_any, is_word_bounded};
use hinglish_core::{Method, Task, Verdict};

/// Confidence emitted by every rule tier
pub const RULE_CONFIDENCE: f32 = 0.90;

/// A rule tier
pub type RuleFn = fn(&str) -> Option<Verdict>;

/// Contrast conjunctions introducing a second clause
pub const CONTRAST_CONJUNCTIONS: &[&str] = &["par", "but", "lekin", "magar"];

/// Terms that make a contrast clause negative
pub const NEGATIVE_CLAUSE_TERMS: &[&str] = &[
    "door", "kam", "nahi", "nahin", "nhi", "problem", "tension", "mushkil", "difficult",
];

pub const ACHIEVEMENT_TERMS: &[&str] = &[
    "salary", "promotion", "job", "project", "increment", "appraisal",
];

pub const SUCCESS_TERMS: &[&str] = &[
    "mili", "mil gaya", "mil gayi", "clear", "selected", "success", "ban gaya",
];

// "nai" is left out: it also means "new" ("nai job mili")
pub const NEGATION_TERMS: &[&str] = &["nahi", "nahin", "nhi", "not", "cancel", "reject", "fail"];

pub const KINSHIP_TERMS: &[&str] = &[
    "maa", "papa", "bhai", "behen", "father", "mother", "sister", "brother", "mummy", "mom",
    "dad", "dadi", "nani", "parents", "family", "parivaar", "gharwale", "relatives", "wife",
    "husband", "beta", "beti",
];

pub const SIBLING_TERMS: &[&str] = &["bhai", "behen", "sister", "brother"];

pub const HEALTH_TERMS: &[&str] = &[
    "tabiyat", "bimar", "bimari", "health", "doctor", "hospital", "medicine", "checkup",
    "surgery", "fever", "bukhar", "operation",
];

pub const FAMILY_EVENT_TERMS: &[&str] = &["engagement", "shaadi", "wedding", "marriage"];

pub const RELATIONSHIP_TERMS: &[&str] = &[
    "baat", "fight", "gussa", "naraz", "communication", "talk", "ladai", "jhagda",
];

const SENTIMENT_RULES: &[(&str, RuleFn)] = &[
    ("compound_contrast", compound_contrast),
    ("achievement", achievement_sentiment),
];

// Family context runs first so a relative's health issue is never claimed
// by the achievement rule.
const CATEGORY_RULES: &[(&str, RuleFn)] = &[
    ("family_context", family_context),
    ("achievement", achievement_category),
];

/// Ordered rule tiers for a task
pub fn rules_for(task: Task) -> &'static [(&'static str, RuleFn)] {
    match task {
        Task::Sentiment => SENTIMENT_RULES,
        Task::Category => CATEGORY_RULES,
    }
}

/// Text following the first word-bounded occurrence of `conjunction`
fn clause_after<'a>(text: &'a str, conjunction: &str) -> Option<&'a str> {
    let lower = text.to_ascii_lowercase();
    lower
        .match_indices(conjunction)
        .map(|(start, m)| (start, start + m.len()))
        .find(|&(start, end)| is_word_bounded(&lower, start, end))
        .map(|(_, end)| &text[end..])
}

/// "X par/but Y": the negative clause dominates.
///
/// "Job achhi hai par ghar se door" is negative even though the first
/// clause is positive.
pub fn compound_contrast(text: &str) -> Option<Verdict> {
    let negative = CONTRAST_CONJUNCTIONS
        .iter()
        .filter_map(|conjunction| clause_after(text, conjunction))
        .any(|clause| contains_any(clause, NEGATIVE_CLAUSE_TERMS));

    negative.then(|| Verdict::new("negative", RULE_CONFIDENCE, Method::CompoundRule))
}

/// An explicit, un-negated achievement ("First salary mili", "Interview clear hua")
pub fn is_achievement(text: &str) -> bool {
    contains_any(text, ACHIEVEMENT_TERMS)
        && contains_any(text, SUCCESS_TERMS)
        && !contains_any(text, NEGATION_TERMS)
}

/// Achievements are positive
pub fn achievement_sentiment(text: &str) -> Option<Verdict> {
    is_achievement(text).then(|| Verdict::new("positive", RULE_CONFIDENCE, Method::AchievementRule))
}

/// Achievements are about career
pub fn achievement_category(text: &str) -> Option<Verdict> {
    is_achievement(text).then(|| Verdict::new("career", RULE_CONFIDENCE, Method::AchievementRule))
}

/// Separate a family member's health from family relationships.
///
/// - "Maa ki tabiyat" → health
/// - "Bhai ki engagement" → family
/// - "Maa se baat nahi" → family
pub fn family_context(text: &str) -> Option<Verdict> {
    if !contains_any(text, KINSHIP_TERMS) {
        return None;
    }

    let verdict = |label: &str| Verdict::new(label, RULE_CONFIDENCE, Method::FamilyContextRule);

    if contains_any(text, HEALTH_TERMS) {
        return Some(verdict("health"));
    }

    if contains_any(text, FAMILY_EVENT_TERMS) && contains_any(text, SIBLING_TERMS) {
        return Some(verdict("family"));
    }

    if contains_any(text, RELATIONSHIP_TERMS) {
        return Some(verdict("family"));
    }

    None
}

/// Run the rule tiers for `task` in order, returning the first verdict
pub fn apply_rules(task: Task, text: &str) -> Option<(&'static str, Verdict)> {
    rules_for(task)
        .iter()
        .find_map(|(name, rule)| rule(text).map(|verdict| (*name, verdict)))
}
