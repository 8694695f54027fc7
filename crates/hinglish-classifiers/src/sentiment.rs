//! Lightweight Hinglish sentiment classifier
//!
//! This is a lexicon-based classifier used when no sentiment model is loaded.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier, ClassifierKind};
use crate::patterns::TermSet;
use hinglish_core::Result;
use std::time::Instant;

const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "love", "amazing", "wonderful", "happy", "fantastic", "awesome",
    "best", "achha", "achhi", "accha", "badiya", "badhiya", "mast", "khush", "khushi", "theek",
    "thik", "shaant", "maza", "pyaar", "umeed", "shukriya",
];

const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "hate", "horrible", "worst", "sad", "angry", "disappointed",
    "poor", "bura", "buri", "udaas", "dukhi", "pareshan", "tension", "gussa", "kharab", "bekaar",
    "akela", "dard", "rona", "darr", "nahi", "nahin", "nhi",
];

pub struct SentimentClassifier {
    name: String,
    positive: TermSet,
    negative: TermSet,
}

impl SentimentClassifier {
    pub fn new() -> Result<Self> {
        Self::with_name("sentiment-lexicon")
    }

    pub fn with_name(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            positive: TermSet::new(POSITIVE.iter().copied())?,
            negative: TermSet::new(NEGATIVE.iter().copied())?,
        })
    }
}

#[async_trait::async_trait]
impl Classifier for SentimentClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let positive_hits = self.positive.matching_indices(text).len() as f32;
        let negative_hits = self.negative.matching_indices(text).len() as f32;
        let total = positive_hits + negative_hits;

        let positive_share = if total == 0.0 {
            0.5
        } else {
            positive_hits / total
        };

        let (label, score) = if positive_share > 0.5 {
            ("positive", positive_share)
        } else if positive_share < 0.5 {
            ("negative", 1.0 - positive_share)
        } else {
            ("neutral", 0.5)
        };

        Ok(ClassificationResult {
            label: label.to_string(),
            score,
            metadata: ClassificationMetadata {
                model: Some(self.name.clone()),
                all_scores: Some(vec![
                    ("positive".to_string(), positive_share),
                    ("negative".to_string(), 1.0 - positive_share),
                ]),
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
