//! Router fallback against real HTTP clients and mock servers

use hinglish_classifiers::{GeminiClient, OllamaClient, Router, SentimentClassifier};
use hinglish_core::{Method, Task};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OPEN_TEXT: &str = "Aaj mann bahut shaant hai";

async fn ollama_answering(answer: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": answer, "done": true})),
        )
        .mount(&server)
        .await;
    server
}

fn ollama(url: &str) -> Arc<OllamaClient> {
    Arc::new(
        OllamaClient::new(url, "llama3.2:3b", Duration::from_secs(5))
            .unwrap()
            .with_ping_timeout(Duration::from_millis(500)),
    )
}

fn gemini(url: &str) -> Arc<GeminiClient> {
    Arc::new(
        GeminiClient::new("test-key", "gemini-2.0-flash-exp", Duration::from_secs(5))
            .unwrap()
            .with_base_url(url),
    )
}

#[tokio::test]
async fn test_ollama_answer_is_used() {
    let server = ollama_answering("Reasoning: calm\nClassification: positive").await;

    let router = Router::builder().with_local_llm(ollama(&server.uri())).build().unwrap();
    assert!(router.refresh_availability().await);

    let v = router.classify(Task::Sentiment, OPEN_TEXT).await;
    assert_eq!(v.label, "positive");
    assert_eq!(v.method, Method::Llama);
}

#[tokio::test]
async fn test_unreachable_ollama_and_failing_gemini_use_local_model() {
    let gemini_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.*:generateContent$"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&gemini_server)
        .await;

    let router = Router::builder()
        .with_local_llm(ollama("http://127.0.0.1:9"))
        .with_hosted_llm(gemini(&gemini_server.uri()))
        .with_local_model(Task::Sentiment, Arc::new(SentimentClassifier::new().unwrap()))
        .build()
        .unwrap();
    assert!(!router.refresh_availability().await);

    let v = router.classify(Task::Sentiment, OPEN_TEXT).await;
    assert_eq!(v.method, Method::MlModel);
    assert_eq!(v.label, "positive");
    assert!(v.confidence <= 0.55);
}

#[tokio::test]
async fn test_gemini_answers_when_ollama_is_unparseable() {
    let ollama_server = ollama_answering("I'd rather not say").await;

    let gemini_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash-exp:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Classification: mood"}]}}]
        })))
        .mount(&gemini_server)
        .await;

    let router = Router::builder()
        .with_local_llm(ollama(&ollama_server.uri()))
        .with_hosted_llm(gemini(&gemini_server.uri()))
        .build()
        .unwrap();

    let v = router.classify(Task::Category, OPEN_TEXT).await;
    assert_eq!(v.label, "mood");
    assert_eq!(v.method, Method::Gemini);
    assert_eq!(v.confidence, 0.60);
}
