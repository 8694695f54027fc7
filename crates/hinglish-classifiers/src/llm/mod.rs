//! LLM backends for the router's model tiers
//!
//! A backend only turns a prompt into raw text. Prompt construction and
//! answer parsing live in [`prompt`] so both backends share them.

pub mod gemini;
pub mod ollama;
pub mod prompt;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use prompt::{build_prompt, LabelParser};

use async_trait::async_trait;
use hinglish_core::Result;

/// A text-completion backend
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Complete `prompt`, returning the raw model answer
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Backend name used in logs and metrics
    fn name(&self) -> &str;
}

/// Map a reqwest failure to a backend error, keeping timeouts distinct.
///
/// The request URL is stripped; error strings reach logs and responses.
pub(crate) fn request_error(backend: &str, err: reqwest::Error) -> hinglish_core::Error {
    let err = err.without_url();
    if err.is_timeout() {
        hinglish_core::Error::Timeout
    } else {
        hinglish_core::Error::backend(backend, format!("request failed: {}", err))
    }
}
