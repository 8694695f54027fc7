//! Gemini `generateContent` client (the `gemini` tier)

use super::{request_error, LlmBackend};
use async_trait::async_trait;
use hinglish_core::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

const BACKEND: &str = "gemini";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 512,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Client for the hosted Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    generation_config: GenerationConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(hinglish_core::Error::config("Gemini API key is empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                hinglish_core::Error::backend(BACKEND, format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: DEFAULT_GEMINI_URL.to_string(),
            generation_config: GenerationConfig::default(),
        })
    }

    /// Overrides the API base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmBackend for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: &self.generation_config,
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(BACKEND, e))?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "Gemini response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(hinglish_core::Error::backend(
                BACKEND,
                format!("API returned {}: {}", status, body),
            ));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            hinglish_core::Error::backend(BACKEND, format!("failed to parse response: {}", e))
        })?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(hinglish_core::Error::backend(BACKEND, "response has no text"));
        }
        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> GeminiClient {
        GeminiClient::new("test-key", DEFAULT_GEMINI_MODEL, Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn complete_joins_candidate_parts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash-exp:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"topK": 40, "maxOutputTokens": 512}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": "Reasoning: worry\n"}, {"text": "Classification: negative"}]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = client(&server.uri()).complete("prompt").await.unwrap();
        assert_eq!(answer, "Reasoning: worry\nClassification: negative");
    }

    #[tokio::test]
    async fn complete_rejects_empty_candidates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client(&server.uri()).complete("prompt").await.unwrap_err();
        assert!(err.is_backend());
    }

    #[tokio::test]
    async fn complete_maps_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).complete("prompt").await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn unreachable_error_does_not_carry_key() {
        let err = client("http://127.0.0.1:9").complete("prompt").await.unwrap_err();
        let message = err.to_string();
        assert!(!message.contains("test-key"), "key leaked: {}", message);
        assert!(err.is_backend());
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(GeminiClient::new("  ", DEFAULT_GEMINI_MODEL, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn debug_hides_key() {
        let client = client("http://localhost");
        assert!(!format!("{:?}", client).contains("test-key"));
    }
}
