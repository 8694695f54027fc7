//! Ollama client (the `llama` tier)

use super::{request_error, LlmBackend};
use async_trait::async_trait;
use hinglish_core::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";

const BACKEND: &str = "ollama";

/// Sampling options sent with every generation
#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    num_predict: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
            top_k: 40,
            num_predict: 150,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Client for a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    options: GenerateOptions,
    ping_timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                hinglish_core::Error::backend(BACKEND, format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            options: GenerateOptions::default(),
            ping_timeout: Duration::from_secs(2),
        })
    }

    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LlmBackend for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: &self.options,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(BACKEND, e))?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "Ollama response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(hinglish_core::Error::backend(
                BACKEND,
                format!("API returned {}: {}", status, body),
            ));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            hinglish_core::Error::backend(BACKEND, format!("failed to parse response: {}", e))
        })?;

        Ok(body.response.trim().to_string())
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(self.ping_timeout)
            .send()
            .await
            .map_err(|e| request_error(BACKEND, e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(hinglish_core::Error::backend(
                BACKEND,
                format!("ping returned {}", response.status()),
            ))
        }
    }

    fn name(&self) -> &str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> OllamaClient {
        OllamaClient::new(base_url, DEFAULT_OLLAMA_MODEL, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn complete_sends_generate_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.2:3b",
                "stream": false,
                "options": {"top_k": 40, "num_predict": 150}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.2:3b",
                "response": "  Reasoning: work\nClassification: career \n",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = client(&server.uri()).complete("prompt").await.unwrap();
        assert_eq!(answer, "Reasoning: work\nClassification: career");
    }

    #[tokio::test]
    async fn complete_maps_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).complete("prompt").await.unwrap_err();
        assert!(err.is_backend());
        assert!(err.to_string().contains("model not loaded"));
    }

    #[tokio::test]
    async fn complete_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            OllamaClient::new(server.uri(), DEFAULT_OLLAMA_MODEL, Duration::from_millis(50)).unwrap();
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, hinglish_core::Error::Timeout));
    }

    #[tokio::test]
    async fn ping_checks_tags_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
            .mount(&server)
            .await;

        assert!(client(&server.uri()).ping().await.is_ok());
    }

    #[tokio::test]
    async fn ping_fails_when_unreachable() {
        // nothing listens on port 9 on a test machine
        let client = client("http://127.0.0.1:9").with_ping_timeout(Duration::from_millis(200));
        assert!(client.ping().await.is_err());
    }
}
