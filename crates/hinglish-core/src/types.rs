//! Core result types for Hinglish classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentiment labels in model output order
pub const SENTIMENT_LABELS: [&str; 3] = ["positive", "neutral", "negative"];

/// Category labels
pub const CATEGORY_LABELS: [&str; 5] = ["career", "love_life", "family", "health", "mood"];

/// What is being classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Sentiment,
    Category,
}

impl Task {
    /// Valid labels for this task
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::Sentiment => &SENTIMENT_LABELS,
            Self::Category => &CATEGORY_LABELS,
        }
    }

    /// Whether `label` belongs to this task's label set
    pub fn is_valid_label(&self, label: &str) -> bool {
        self.labels().contains(&label)
    }

    /// Label returned when every tier failed
    pub fn default_label(&self) -> &'static str {
        match self {
            Self::Sentiment => "neutral",
            Self::Category => "mood",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method tag recording which tier produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    CompoundRule,
    AchievementRule,
    FamilyContextRule,
    Keywords,
    Llama,
    Gemini,
    MlModel,
    Default,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompoundRule => "compound_rule",
            Self::AchievementRule => "achievement_rule",
            Self::FamilyContextRule => "family_context_rule",
            Self::Keywords => "keywords",
            Self::Llama => "llama",
            Self::Gemini => "gemini",
            Self::MlModel => "ml_model",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to zero
pub fn clamp_confidence(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Round a confidence to two decimals for reporting
pub fn round2(score: f32) -> f32 {
    (score * 100.0).round() / 100.0
}

/// A classification result record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Predicted label
    pub label: String,

    /// Confidence in `[0, 1]`
    pub confidence: f32,

    /// Tier that produced this verdict
    pub method: Method,

    /// Failure description, only set on the terminal default verdict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Verdict {
    /// Create a new verdict; the confidence is clamped into `[0, 1]`
    pub fn new(label: impl Into<String>, confidence: f32, method: Method) -> Self {
        Self {
            label: label.into(),
            confidence: clamp_confidence(confidence),
            method,
            error: None,
        }
    }

    /// Terminal verdict returned when every tier failed
    pub fn fallback(task: Task, error: impl Into<String>) -> Self {
        Self {
            label: task.default_label().to_string(),
            confidence: 0.5,
            method: Method::Default,
            error: Some(error.into()),
        }
    }

    /// Cap the confidence at `max`
    pub fn capped(mut self, max: f32) -> Self {
        self.confidence = self.confidence.min(clamp_confidence(max));
        self
    }
}

/// Toxicity result (no method tag, always produced locally)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToxicityVerdict {
    pub label: String,
    pub confidence: f32,
}

impl ToxicityVerdict {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Full analysis of one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub sentiment: Verdict,
    pub toxicity: ToxicityVerdict,
    pub categories: Vec<Verdict>,
}

impl AnalysisReport {
    /// Primary category, if any
    pub fn category(&self) -> Option<&Verdict> {
        self.categories.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn method_serializes_snake_case() {
        let json = serde_json::to_string(&Method::FamilyContextRule).unwrap();
        assert_eq!(json, "\"family_context_rule\"");
        assert_eq!(Method::MlModel.to_string(), "ml_model");
    }

    #[test]
    fn verdict_skips_missing_error() {
        let v = Verdict::new("negative", 0.9, Method::CompoundRule);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["method"], "compound_rule");
        assert!(json.get("error").is_none());

        let v = Verdict::fallback(Task::Category, "all tiers failed");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["label"], "mood");
        assert_eq!(json["error"], "all tiers failed");
    }

    #[test]
    fn task_labels() {
        assert!(Task::Sentiment.is_valid_label("neutral"));
        assert!(!Task::Sentiment.is_valid_label("career"));
        assert!(Task::Category.is_valid_label("love_life"));
    }

    #[test]
    fn capped_never_raises() {
        let v = Verdict::new("positive", 0.3, Method::MlModel).capped(0.55);
        assert_eq!(v.confidence, 0.3);
        let v = Verdict::new("positive", 0.97, Method::MlModel).capped(0.55);
        assert_eq!(v.confidence, 0.55);
    }

    proptest! {
        #[test]
        fn confidence_always_in_unit_interval(score in proptest::num::f32::ANY) {
            let v = Verdict::new("x", score, Method::Keywords);
            prop_assert!((0.0..=1.0).contains(&v.confidence));
            let t = ToxicityVerdict::new("safe", score);
            prop_assert!((0.0..=1.0).contains(&t.confidence));
        }
    }
}
