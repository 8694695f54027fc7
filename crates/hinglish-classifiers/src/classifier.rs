//! Local classifier trait and common types
//!
//! Local classifiers are the last tier of the router and the only source
//! of toxicity scores. They run in-process: either a Candle model or a
//! lexicon when no model is configured.

use async_trait::async_trait;
use hinglish_core::Result;

/// Trait for all local classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// What backs this classifier
    fn kind(&self) -> ClassifierKind;
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Classification label
    pub label: String,

    /// Confidence score (0.0-1.0)
    pub score: f32,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }

    /// Score of a specific label, if the classifier reported per-label scores
    pub fn score_of(&self, label: &str) -> Option<f32> {
        self.metadata
            .all_scores
            .as_ref()?
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, s)| *s)
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,

    /// All class scores (for multi-class classifiers)
    pub all_scores: Option<Vec<(String, f32)>>,
}

/// What backs a local classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    /// Keyword lexicon, always available
    Lexicon,
    /// Pretrained transformer loaded with Candle
    Neural,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexicon => "lexicon",
            Self::Neural => "neural",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_of() {
        let mut result = ClassificationResult::new("toxic", 0.8);
        assert_eq!(result.score_of("toxic"), None);

        result.metadata.all_scores = Some(vec![
            ("toxic".to_string(), 0.8),
            ("obscene".to_string(), 0.1),
        ]);
        assert_eq!(result.score_of("obscene"), Some(0.1));
        assert_eq!(result.score_of("insult"), None);
    }
}
