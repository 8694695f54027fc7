//! Toxicity detection
//!
//! [`ToxicityClassifier`] is the lexicon fallback used when no toxicity
//! model is loaded. [`ToxicityAnalyzer`] turns any toxicity classifier's
//! score into the reported `safe | offensive | spam` verdict.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier, ClassifierKind};
use crate::patterns::TermSet;
use hinglish_core::{types::round2, Result, ToxicityVerdict};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Threats, self-harm and slurs: one hit is enough
const SEVERE: &[&str] = &[
    "kill", "suicide", "violence", "maar dunga", "maar dalunga", "maarna", "marna hai",
    "khatam kar dunga", "jalaa dunga", "hurt karunga", "chutiya", "chutiye", "madarchod",
    "bhenchod", "fuck", "bitch", "asshole", "bastard",
];

/// Insults and abuse
const MILD: &[&str] = &[
    "hate", "stupid", "idiot", "dumb", "die", "sucks", "garbage", "trash", "shit", "bakwas",
    "faltu", "bekaar", "pagal", "gadha", "kamina", "kamine", "ullu", "harami", "kutta", "kutte",
];

const SEVERE_WEIGHT: f32 = 0.75;
const MILD_WEIGHT: f32 = 0.35;

/// Spam markers
pub const SPAM_KEYWORDS: &[&str] = &[
    "buy", "sale", "discount", "offer", "click here", "limited time", "deal", "promotion",
    "click karo", "paisa double", "free", "jeetne", "lottery", "register karo", "earn",
];

/// Lexicon toxicity classifier
pub struct ToxicityClassifier {
    name: String,
    severe: TermSet,
    mild: TermSet,
}

impl ToxicityClassifier {
    /// Create a new toxicity classifier.
    pub fn new() -> Result<Self> {
        Ok(Self {
            name: "toxicity-lexicon".to_string(),
            severe: TermSet::new(SEVERE.iter().copied())?,
            mild: TermSet::new(MILD.iter().copied())?,
        })
    }

    fn score(&self, text: &str) -> f32 {
        let severe = self.severe.count_distinct(text) as f32;
        let mild = self.mild.count_distinct(text) as f32;

        // Keep confidence bounded for lexicon-only approach.
        (severe * SEVERE_WEIGHT + mild * MILD_WEIGHT).clamp(0.0, 0.95)
    }
}

#[async_trait::async_trait]
impl Classifier for ToxicityClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let score = self.score(text);
        let label = if score > 0.5 { "toxic" } else { "safe" };

        Ok(ClassificationResult {
            label: label.to_string(),
            score,
            metadata: ClassificationMetadata {
                model: Some(self.name.clone()),
                all_scores: Some(vec![("toxic".to_string(), score)]),
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Lexicon
    }
}

/// Maps a toxicity score to the reported verdict
pub struct ToxicityAnalyzer {
    classifier: Arc<dyn Classifier>,
    spam: TermSet,
    offensive_threshold: f32,
    spam_min_hits: usize,
}

impl ToxicityAnalyzer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Result<Self> {
        Ok(Self {
            classifier,
            spam: TermSet::new(SPAM_KEYWORDS.iter().copied())?,
            offensive_threshold: 0.4,
            spam_min_hits: 2,
        })
    }

    /// Score above which text is offensive
    pub fn with_offensive_threshold(mut self, threshold: f32) -> Self {
        self.offensive_threshold = threshold;
        self
    }

    /// Distinct spam keywords needed to flag spam
    pub fn with_spam_min_hits(mut self, hits: usize) -> Self {
        self.spam_min_hits = hits.max(1);
        self
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    /// Whether `text` carries enough spam markers
    pub fn is_spam(&self, text: &str) -> bool {
        self.spam.count_distinct(text) >= self.spam_min_hits
    }

    /// Analyze `text`; never fails
    pub async fn analyze(&self, text: &str) -> ToxicityVerdict {
        let result = match self.classifier.classify(text).await {
            Ok(result) => result,
            Err(e) => {
                warn!(classifier = self.classifier.name(), error = %e, "Toxicity detection failed");
                metrics::counter!("hinglish_tier_failures_total", "tier" => "toxicity").increment(1);
                return ToxicityVerdict::new("safe", 0.5);
            }
        };

        let toxic_score = result.score_of("toxic").unwrap_or(if result.label == "toxic" {
            result.score
        } else {
            0.0
        });
        debug!(toxic_score, classifier = self.classifier.name(), "Toxicity score");

        if toxic_score > self.offensive_threshold {
            ToxicityVerdict::new("offensive", round2(toxic_score))
        } else if self.is_spam(text) {
            ToxicityVerdict::new("spam", 0.85)
        } else {
            ToxicityVerdict::new("safe", round2(1.0 - toxic_score))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ToxicityAnalyzer {
        ToxicityAnalyzer::new(Arc::new(ToxicityClassifier::new().unwrap())).unwrap()
    }

    #[tokio::test]
    async fn test_toxicity_classifier_safe() {
        let classifier = ToxicityClassifier::new().unwrap();

        let result = classifier.classify("Aaj mann bahut shaant hai").await.unwrap();
        assert_eq!(result.label, "safe");
        assert!(result.score < 0.5);
    }

    #[tokio::test]
    async fn test_toxicity_classifier_toxic() {
        let classifier = ToxicityClassifier::new().unwrap();

        let result = classifier.classify("Tujhe maar dunga").await.unwrap();
        assert_eq!(result.label, "toxic");
        assert!(result.score > 0.5);

        let result = classifier.classify("I hate you, you stupid idiot!").await.unwrap();
        assert_eq!(result.label, "toxic");
        assert_eq!(result.score, 0.95);
    }

    #[tokio::test]
    async fn test_analyzer_labels() {
        let analyzer = analyzer();

        let v = analyzer.analyze("Sab chutiye hain").await;
        assert_eq!(v.label, "offensive");
        assert_eq!(v.confidence, 0.75);

        let v = analyzer.analyze("Limited offer hai abhi click karo").await;
        assert_eq!(v.label, "spam");
        assert_eq!(v.confidence, 0.85);

        let v = analyzer.analyze("First salary mili aaj").await;
        assert_eq!(v.label, "safe");
        assert_eq!(v.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_single_mild_word_is_not_offensive() {
        // one mild hit scores 0.35, below the offensive threshold
        let v = analyzer().analyze("Yeh movie bakwas thi").await;
        assert_eq!(v.label, "safe");
        assert_eq!(v.confidence, 0.65);
    }
}
