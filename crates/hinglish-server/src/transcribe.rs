//! Speech-to-text through an OpenAI-compatible transcription endpoint

use crate::config::TranscriptionConfig;
use hinglish_core::{Error, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

const BACKEND: &str = "transcription";

/// Client for `POST {url}/v1/audio/transcriptions`
pub struct Transcriber {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl Transcriber {
    pub fn new(config: &TranscriptionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::backend(BACKEND, e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/audio/transcriptions", config.url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Transcribe one audio upload.
    ///
    /// English mode keeps code-switched speech mostly in Latin script;
    /// callers still transliterate whatever Devanagari comes back.
    pub async fn transcribe(&self, file_name: &str, audio: Vec<u8>) -> Result<String> {
        let start = Instant::now();
        let size = audio.len();

        let file = Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| Error::backend(BACKEND, e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", "en")
            .text("response_format", "json");

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::backend(BACKEND, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::backend(BACKEND, format!("HTTP {}: {}", status, body)));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(BACKEND, format!("invalid response: {}", e)))?;

        debug!(
            bytes = size,
            chars = parsed.text.len(),
            latency_us = start.elapsed().as_micros() as u64,
            "Transcribed audio"
        );
        Ok(parsed.text)
    }
}
