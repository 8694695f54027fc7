//! Configuration for the router backends, local models and analysis thresholds

use crate::embedding::{DEFAULT_CATEGORY_THRESHOLD, DEFAULT_MAX_CATEGORIES};
use crate::llm::gemini::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};
use crate::llm::ollama::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use hinglish_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the hosted LLM key
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Configuration for everything behind the analyzer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Local inference server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_ollama_url")]
    pub url: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_ollama_url(),
            model: default_ollama_model(),
            timeout_secs: default_llm_timeout(),
            ping_timeout_secs: default_ping_timeout(),
        }
    }
}

/// Hosted LLM
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Falls back to `GOOGLE_API_KEY` when unset
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_gemini_url(),
            model: default_gemini_model(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl GeminiConfig {
    /// Configured key, or the `GOOGLE_API_KEY` environment variable
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(GOOGLE_API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Local pretrained models; an unset model uses the lexicon fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub sentiment: Option<ModelSpec>,

    #[serde(default)]
    pub toxicity: Option<ModelSpec>,

    /// Sentence embedder for category templates
    #[serde(default)]
    pub embedding: Option<ModelSpec>,

    /// `cpu`, `cuda` or `metal`
    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            sentiment: None,
            toxicity: None,
            embedding: None,
            device: default_device(),
        }
    }
}

impl ModelsConfig {
    pub fn any_configured(&self) -> bool {
        self.sentiment.is_some() || self.toxicity.is_some() || self.embedding.is_some()
    }
}

/// One local model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub source: ModelSource,

    /// Maximum sequence length in tokens
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

/// Where model files come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Directory with `config.json`, `model.safetensors` and `tokenizer.json`
    Local { path: PathBuf },

    /// HuggingFace Hub repository, cached under the hub cache
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

impl ModelSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Local { path } => path.display().to_string(),
            Self::HuggingFace { repo, revision } => format!("{}@{}", repo, revision),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Similarity a template category must exceed
    #[serde(default = "default_category_threshold")]
    pub category_threshold: f32,

    /// Categories reported by the similarity tier
    #[serde(default = "default_max_categories")]
    pub max_categories: usize,

    /// Toxic score above which text is offensive
    #[serde(default = "default_offensive_threshold")]
    pub offensive_threshold: f32,

    /// Distinct spam keywords needed to flag spam
    #[serde(default = "default_spam_min_hits")]
    pub spam_min_hits: usize,

    /// Dimensions of the hashed-trigram embedder
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            category_threshold: default_category_threshold(),
            max_categories: default_max_categories(),
            offensive_threshold: default_offensive_threshold(),
            spam_min_hits: default_spam_min_hits(),
            embedding_dimensions: default_embedding_dimensions(),
        }
    }
}

impl ClassifierConfig {
    /// Check the configuration before anything is built
    pub fn validate(&self) -> Result<()> {
        let ollama = &self.llm.ollama;
        if ollama.enabled {
            validate_url("llm.ollama.url", &ollama.url)?;
            validate_timeout("llm.ollama.timeout_secs", ollama.timeout_secs)?;
            validate_timeout("llm.ollama.ping_timeout_secs", ollama.ping_timeout_secs)?;
        }

        let gemini = &self.llm.gemini;
        if gemini.enabled {
            validate_url("llm.gemini.base_url", &gemini.base_url)?;
            validate_timeout("llm.gemini.timeout_secs", gemini.timeout_secs)?;
        }

        validate_unit("analysis.category_threshold", self.analysis.category_threshold)?;
        validate_unit("analysis.offensive_threshold", self.analysis.offensive_threshold)?;

        if self.analysis.max_categories == 0 {
            return Err(Error::config("analysis.max_categories must be at least 1"));
        }
        if self.analysis.spam_min_hits == 0 {
            return Err(Error::config("analysis.spam_min_hits must be at least 1"));
        }
        if self.analysis.embedding_dimensions < 16 {
            return Err(Error::config("analysis.embedding_dimensions must be at least 16"));
        }

        for (name, spec) in [
            ("models.sentiment", &self.models.sentiment),
            ("models.toxicity", &self.models.toxicity),
            ("models.embedding", &self.models.embedding),
        ] {
            if let Some(spec) = spec {
                if spec.max_length == 0 {
                    return Err(Error::config(format!("{}.max_length must be positive", name)));
                }
                if let ModelSource::HuggingFace { repo, .. } = &spec.source {
                    if repo.trim().is_empty() {
                        return Err(Error::config(format!("{}.source.repo is empty", name)));
                    }
                }
            }
        }

        match self.models.device.to_lowercase().as_str() {
            "cpu" | "cuda" | "cuda:0" | "metal" | "mps" => Ok(()),
            other => Err(Error::config(format!("Unknown device '{}'", other))),
        }
    }
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| Error::config(format!("{} '{}' is not a valid URL: {}", field, value, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!("{} must be http or https", field)));
    }
    Ok(())
}

fn validate_timeout(field: &str, secs: u64) -> Result<()> {
    if secs == 0 {
        return Err(Error::config(format!("{} must be positive", field)));
    }
    Ok(())
}

fn validate_unit(field: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::config(format!("{} must be within [0, 1], got {}", field, value)));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_ollama_model() -> String {
    DEFAULT_OLLAMA_MODEL.to_string()
}

fn default_gemini_url() -> String {
    DEFAULT_GEMINI_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_ping_timeout() -> u64 {
    2
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    512
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_category_threshold() -> f32 {
    DEFAULT_CATEGORY_THRESHOLD
}

fn default_max_categories() -> usize {
    DEFAULT_MAX_CATEGORIES
}

fn default_offensive_threshold() -> f32 {
    0.4
}

fn default_spam_min_hits() -> usize {
    2
}

fn default_embedding_dimensions() -> usize {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClassifierConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.ollama.model, "llama3.2:3b");
        assert_eq!(config.llm.ollama.timeout_secs, 30);
        assert_eq!(config.llm.ollama.ping_timeout_secs, 2);
        assert!(!config.models.any_configured());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
llm:
  ollama:
    url: http://ollama:11434
  gemini:
    enabled: false
models:
  sentiment:
    source:
      type: huggingface
      repo: cardiffnlp/twitter-xlm-roberta-base-sentiment
  toxicity:
    source:
      type: local
      path: /models/toxic-bert
    max_length: 256
analysis:
  category_threshold: 0.5
"#;
        let config: ClassifierConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.ollama.url, "http://ollama:11434");
        assert!(!config.llm.gemini.enabled);

        let sentiment = config.models.sentiment.unwrap();
        assert_eq!(
            sentiment.source,
            ModelSource::HuggingFace {
                repo: "cardiffnlp/twitter-xlm-roberta-base-sentiment".to_string(),
                revision: "main".to_string(),
            }
        );
        assert_eq!(sentiment.max_length, 512);
        assert_eq!(config.models.toxicity.unwrap().max_length, 256);
        assert_eq!(config.analysis.category_threshold, 0.5);
        assert_eq!(config.analysis.max_categories, 2);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ClassifierConfig::default();
        config.analysis.category_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = ClassifierConfig::default();
        config.llm.ollama.url = "not a url".to_string();
        assert!(config.validate().is_err());

        // disabled backends are not validated
        config.llm.ollama.enabled = false;
        assert!(config.validate().is_ok());

        let mut config = ClassifierConfig::default();
        config.models.device = "tpu".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_key_wins() {
        let config = GeminiConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolved_api_key().as_deref(), Some("from-config"));
        assert!(!format!("{:?}", config).contains("from-config"));
    }
}
