//! Shared application state

use crate::config::ServerConfig;
use crate::transcribe::Transcriber;
use hinglish_classifiers::{build_analyzer, Analyzer};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,

    /// `None` when no transcription backend is configured
    pub transcriber: Option<Arc<Transcriber>>,

    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>, metrics: PrometheusHandle) -> Self {
        Self {
            analyzer,
            transcriber: None,
            metrics,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Transcriber) -> Self {
        self.transcriber = Some(Arc::new(transcriber));
        self
    }

    /// Load every configured component; any failure aborts startup
    pub async fn from_config(config: &ServerConfig, metrics: PrometheusHandle) -> anyhow::Result<Self> {
        let analyzer = build_analyzer(&config.classifiers()).await?;
        let mut state = Self::new(Arc::new(analyzer), metrics);

        match &config.transcription {
            Some(transcription) => {
                info!(url = %transcription.url, model = %transcription.model, "Transcription enabled");
                state = state.with_transcriber(Transcriber::new(transcription)?);
            }
            None => info!("No transcription backend configured, audio input disabled"),
        }

        Ok(state)
    }
}
