//! Server configuration
//!
//! Layered from a YAML file and `HINGLISH__`-prefixed environment variables
//! (`HINGLISH__LLM__OLLAMA__URL=...`). A missing file means defaults.

use config::{Config, Environment, File, FileFormat};
use hinglish_classifiers::config::{AnalysisConfig, LlmConfig, ModelsConfig};
use hinglish_classifiers::ClassifierConfig;
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "HINGLISH";

/// Full server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Speech-to-text backend; audio uploads are rejected without it
    #[serde(default)]
    pub transcription: Option<TranscriptionConfig>,
}

impl ServerConfig {
    /// Load configuration from `path` and the environment
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::new(path, FileFormat::Yaml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn classifiers(&self) -> ClassifierConfig {
        ClassifierConfig {
            llm: self.llm.clone(),
            models: self.models.clone(),
            analysis: self.analysis.clone(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.classifiers().validate()?;

        if let Some(transcription) = &self.transcription {
            let url = reqwest::Url::parse(&transcription.url).map_err(|e| {
                anyhow::anyhow!("transcription.url '{}' is not a valid URL: {}", transcription.url, e)
            })?;
            anyhow::ensure!(
                matches!(url.scheme(), "http" | "https"),
                "transcription.url must be http or https"
            );
            anyhow::ensure!(transcription.timeout_secs > 0, "transcription.timeout_secs must be positive");
            anyhow::ensure!(!transcription.model.trim().is_empty(), "transcription.model is empty");
        }

        Ok(())
    }
}

/// OpenAI-compatible transcription endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Base URL; `/v1/audio/transcriptions` is appended
    pub url: String,

    #[serde(default = "default_transcription_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_transcription_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for TranscriptionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionConfig")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_transcription_timeout() -> u64 {
    120
}
