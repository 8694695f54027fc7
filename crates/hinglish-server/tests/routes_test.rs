//! HTTP-level tests for the analysis server

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use hinglish_classifiers::{
    Analyzer, HashingEmbedder, Router as ClassificationRouter, SentimentClassifier,
    TemplateCategoryClassifier, ToxicityAnalyzer, ToxicityClassifier,
};
use hinglish_core::Task;
use hinglish_server::config::TranscriptionConfig;
use hinglish_server::transcribe::Transcriber;
use hinglish_server::{create_router, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "hinglish-test-boundary";

async fn offline_state() -> AppState {
    let templates = Arc::new(
        TemplateCategoryClassifier::new(Arc::new(HashingEmbedder::default()))
            .await
            .unwrap(),
    );
    let router = ClassificationRouter::builder()
        .with_local_model(Task::Sentiment, Arc::new(SentimentClassifier::new().unwrap()))
        .with_local_model(Task::Category, templates.clone())
        .build()
        .unwrap();
    let toxicity = ToxicityAnalyzer::new(Arc::new(ToxicityClassifier::new().unwrap())).unwrap();
    let analyzer = Analyzer::new(Arc::new(router), Arc::new(toxicity)).with_category_templates(templates);

    // not installed globally; renders an empty page
    let metrics = PrometheusBuilder::new().build_recorder().handle();
    AppState::new(Arc::new(analyzer), metrics)
}

async fn app() -> Router {
    create_router(offline_state().await)
}

async fn app_with_transcription(url: &str) -> Router {
    let transcriber = Transcriber::new(&TranscriptionConfig {
        url: url.to_string(),
        model: "whisper-1".to_string(),
        api_key: None,
        timeout_secs: 5,
    })
    .unwrap();
    create_router(offline_state().await.with_transcriber(transcriber))
}

fn json_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn audio_request(field: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"clip.wav\"\r\n\
         Content-Type: audio/wav\r\n\r\nRIFF0000WAVE\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
    );
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_reports_tiers() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app().await, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models"]["llama"], false);
    assert_eq!(body["models"]["gemini"], false);
    assert!(body["models"]["transcriber"].is_null());
    assert_eq!(body["models"]["embedder"], "hashed-trigrams");
}

#[tokio::test]
async fn test_health_refresh_without_local_llm() {
    let request = Request::builder()
        .uri("/health?refresh=true")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app().await, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"]["llama"], false);
}

#[tokio::test]
async fn test_analyze_compound_sentence() {
    let (status, body) = send(
        app().await,
        json_request(r#"{"text": "Job achhi hai par ghar se door"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["transcription"], "Job achhi hai par ghar se door");
    assert_eq!(body["data"]["sentiment"]["label"], "negative");
    assert_eq!(body["data"]["sentiment"]["method"], "compound_rule");
    assert_eq!(body["data"]["toxicity"]["label"], "safe");
}

#[tokio::test]
async fn test_analyze_family_health_is_health() {
    let (status, body) = send(app().await, json_request(r#"{"text": "Maa ki tabiyat kharab hai"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    let categories = body["data"]["categories"].as_array().unwrap();
    assert_eq!(categories[0]["label"], "health");
    assert!(categories.iter().all(|c| c["label"] != "family"));
}

#[tokio::test]
async fn test_analyze_missing_text() {
    let (status, body) = send(app().await, json_request(r#"{"message": "hello"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "No input provided. Send 'audio' file or 'text' in JSON body."
    );
}

#[tokio::test]
async fn test_analyze_without_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app().await, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_analyze_blank_text() {
    let (status, body) = send(app().await, json_request(r#"{"text": "   "}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Empty input provided");
}

#[tokio::test]
async fn test_analyze_invisible_only_text() {
    let (status, body) = send(
        app().await,
        json_request(r#"{"text": "\u200B\u200C\uFEFF \u2060"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Empty input provided");
}

#[tokio::test]
async fn test_audio_without_transcriber() {
    let (status, body) = send(app().await, audio_request("audio")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_multipart_without_audio_field() {
    let (status, _) = send(app().await, audio_request("recording")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_audio_is_transcribed_and_transliterated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"text": "मैं बहुत खुश हूँ"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(app_with_transcription(&server.uri()).await, audio_request("audio")).await;

    assert_eq!(status, StatusCode::OK);
    let transcription = body["transcription"].as_str().unwrap();
    assert!(transcription.is_ascii());
    assert!(transcription.contains("khush"));
}

#[tokio::test]
async fn test_transcription_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, body) = send(app_with_transcription(&server.uri()).await, audio_request("audio")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_samples_endpoint() {
    let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
    let (status, body) = send(app().await, request).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["test_results"].as_array().unwrap();
    assert_eq!(results.len(), 5);
    assert_eq!(results[1]["output"]["sentiment"]["label"], "positive");
    assert_eq!(results[1]["output"]["sentiment"]["method"], "achievement_rule");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder().uri("/v1/chat").body(Body::empty()).unwrap();
    let (status, body) = send(app().await, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}
