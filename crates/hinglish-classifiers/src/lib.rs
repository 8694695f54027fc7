//! Hinglish Classifiers
//!
//! Sentiment, category and toxicity classification for Hinglish
//! (Hindi-English code-mixed) text.
//!
//! Sentiment and category go through the [`Router`], which tries tiers from
//! cheapest and most reliable to most expensive:
//! - Rules (<1ms): compound contrast, achievement, family context
//! - Keywords (<1ms): ordered keyword tables
//! - LLMs (seconds): local Ollama, then hosted Gemini
//! - Local model: Candle transformers or lexicons, confidence capped
//!
//! Toxicity always runs locally.

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod embedding;
pub mod keywords;
pub mod llm;
pub mod loader;
#[cfg(feature = "ml-models")]
pub mod model;
pub mod patterns;
pub mod router;
pub mod rules;
pub mod sentiment;
pub mod text;
pub mod toxicity;

pub use analyzer::Analyzer;
pub use classifier::{ClassificationResult, Classifier, ClassifierKind};
pub use config::{ClassifierConfig, ModelSource, ModelSpec};
pub use embedding::{Embedder, HashingEmbedder, TemplateCategoryClassifier};
pub use keywords::{KeywordEntry, KeywordTable};
pub use llm::{GeminiClient, LlmBackend, OllamaClient};
pub use loader::build_analyzer;
pub use router::{Router, RouterBuilder};
pub use sentiment::SentimentClassifier;
pub use toxicity::{ToxicityAnalyzer, ToxicityClassifier};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analyzer::Analyzer;
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::llm::LlmBackend;
    pub use crate::router::{Router, RouterBuilder};
    pub use crate::toxicity::ToxicityAnalyzer;
    pub use hinglish_core::prelude::*;
}
