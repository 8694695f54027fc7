//! Build an [`Analyzer`] from configuration
//!
//! Every configured component must load; a model that fails to load is an
//! error, not a silent fallback. Components left unconfigured use the
//! lexicon implementations.

use crate::analyzer::Analyzer;
use crate::classifier::Classifier;
use crate::config::{ClassifierConfig, ModelsConfig};
use crate::embedding::{Embedder, HashingEmbedder, TemplateCategoryClassifier};
use crate::llm::{GeminiClient, OllamaClient};
use crate::router::Router;
use crate::sentiment::SentimentClassifier;
use crate::toxicity::{ToxicityAnalyzer, ToxicityClassifier};
use hinglish_core::{Result, Task};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Validate `config` and build the analyzer, probing the local LLM once
pub async fn build_analyzer(config: &ClassifierConfig) -> Result<Analyzer> {
    config.validate()?;

    let mut builder = Router::builder();

    let ollama = &config.llm.ollama;
    if ollama.enabled {
        let client = OllamaClient::new(
            ollama.url.clone(),
            ollama.model.clone(),
            Duration::from_secs(ollama.timeout_secs),
        )?
        .with_ping_timeout(Duration::from_secs(ollama.ping_timeout_secs));
        builder = builder.with_local_llm(Arc::new(client));
    }

    let gemini = &config.llm.gemini;
    if gemini.enabled {
        match gemini.resolved_api_key() {
            Some(key) => {
                let client = GeminiClient::new(
                    key,
                    gemini.model.clone(),
                    Duration::from_secs(gemini.timeout_secs),
                )?
                .with_base_url(gemini.base_url.clone());
                builder = builder.with_hosted_llm(Arc::new(client));
            }
            None => info!("No Gemini API key configured, hosted LLM tier disabled"),
        }
    }

    let local = LocalModels::load(&config.models).await?;

    let templates = Arc::new(
        TemplateCategoryClassifier::new(match local.embedder {
            Some(embedder) => embedder,
            None => Arc::new(HashingEmbedder::new(config.analysis.embedding_dimensions)),
        })
        .await?
        .with_threshold(config.analysis.category_threshold)
        .with_max_categories(config.analysis.max_categories),
    );

    let router = builder
        .with_local_model(Task::Sentiment, local.sentiment)
        .with_local_model(Task::Category, templates.clone())
        .build()?;
    router.refresh_availability().await;

    let toxicity = ToxicityAnalyzer::new(local.toxicity)?
        .with_offensive_threshold(config.analysis.offensive_threshold)
        .with_spam_min_hits(config.analysis.spam_min_hits);

    info!(
        local_llm = router.local_llm_available(),
        hosted_llm = router.has_hosted_llm(),
        embedder = templates.embedder().name(),
        "Analyzer ready"
    );

    Ok(Analyzer::new(Arc::new(router), Arc::new(toxicity)).with_category_templates(templates))
}

struct LocalModels {
    sentiment: Arc<dyn Classifier>,
    toxicity: Arc<dyn Classifier>,
    embedder: Option<Arc<dyn Embedder>>,
}

impl LocalModels {
    #[cfg(feature = "ml-models")]
    async fn load(config: &ModelsConfig) -> Result<Self> {
        use crate::model::{get_device, sentiment_label, Activation, BertEmbedder, SequenceClassifier};

        let device = if config.any_configured() {
            get_device(&config.device)?
        } else {
            candle_core::Device::Cpu
        };

        let sentiment: Arc<dyn Classifier> = match &config.sentiment {
            Some(spec) => Arc::new(
                SequenceClassifier::load("sentiment-model", spec, Activation::Softmax, &device)
                    .await?
                    .map_labels(sentiment_label),
            ),
            None => Arc::new(SentimentClassifier::new()?),
        };

        let toxicity: Arc<dyn Classifier> = match &config.toxicity {
            Some(spec) => Arc::new(
                SequenceClassifier::load("toxicity-model", spec, Activation::Sigmoid, &device)
                    .await?
                    .map_labels(|l| l.to_lowercase()),
            ),
            None => Arc::new(ToxicityClassifier::new()?),
        };

        let embedder: Option<Arc<dyn Embedder>> = match &config.embedding {
            Some(spec) => Some(Arc::new(
                BertEmbedder::load("sentence-embedder", spec, &device).await?,
            )),
            None => None,
        };

        Ok(Self {
            sentiment,
            toxicity,
            embedder,
        })
    }

    #[cfg(not(feature = "ml-models"))]
    async fn load(config: &ModelsConfig) -> Result<Self> {
        if config.any_configured() {
            return Err(hinglish_core::Error::config(
                "Local models are configured but this build has no ml-models support",
            ));
        }

        Ok(Self {
            sentiment: Arc::new(SentimentClassifier::new()?),
            toxicity: Arc::new(ToxicityClassifier::new()?),
            embedder: None,
        })
    }
}
