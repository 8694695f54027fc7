//! HTTP routes and handlers

use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hinglish_classifiers::text::prepare;
use hinglish_core::{AnalysisReport, Task};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::state::AppState;

/// Largest accepted request body (audio uploads)
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Inputs run by `GET /test`
pub const TEST_SAMPLES: [&str; 5] = [
    "Kal interview hai, bahut tension ho rahi hai",
    "First salary mili aaj, bahut khush hun",
    "Girlfriend se breakup ho gaya, dil toot gaya",
    "Maa ki tabiyat theek nahi hai, hospital jana padega",
    "Office mein bore ho raha hun, kuch exciting chahiye",
];

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/health", get(health_check))
        .route("/test", get(run_samples))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    success: bool,
    transcription: String,
    data: AnalysisReport,
}

/// Analyze a JSON `{"text": ...}` body or a multipart `audio` upload
async fn analyze(State(state): State<AppState>, request: Request) -> Result<Response, AppError> {
    metrics::counter!("hinglish_requests_total", "endpoint" => "analyze").increment(1);

    let text = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?;
        let (file_name, audio) = read_audio_field(multipart).await?.ok_or(AppError::NoInput)?;
        transcribe(&state, &file_name, audio).await?
    } else {
        let Json(body) = Json::<AnalyzeRequest>::from_request(request, &state)
            .await
            .map_err(|e| {
                warn!(error = %e.body_text(), "Rejected analyze body");
                AppError::NoInput
            })?;
        body.text.ok_or(AppError::NoInput)?
    };

    let transcription = prepare(&text);
    if transcription.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let report = state.analyzer.analyze_prepared(&transcription).await;

    info!(
        sentiment = %report.sentiment.label,
        sentiment_method = %report.sentiment.method,
        toxicity = %report.toxicity.label,
        category = report.category().map(|c| c.label.as_str()).unwrap_or_default(),
        "Analyzed input"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        transcription,
        data: report,
    })
    .into_response())
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn read_audio_field(mut multipart: Multipart) -> Result<Option<(String, Vec<u8>)>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.body_text()))?
    {
        if field.name() != Some("audio") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("audio.wav").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?;
        return Ok(Some((file_name, bytes.to_vec())));
    }
    Ok(None)
}

async fn transcribe(state: &AppState, file_name: &str, audio: Vec<u8>) -> Result<String, AppError> {
    let transcriber = state.transcriber.as_ref().ok_or(AppError::TranscriptionUnavailable)?;

    transcriber.transcribe(file_name, audio).await.map_err(|e| {
        error!(error = %e, "Transcription failed");
        AppError::Transcription(e.to_string())
    })
}

#[derive(Debug, Default, Deserialize)]
struct HealthQuery {
    /// Re-check the local LLM before answering
    #[serde(default)]
    refresh: bool,
}

async fn health_check(State(state): State<AppState>, Query(query): Query<HealthQuery>) -> Json<serde_json::Value> {
    metrics::counter!("hinglish_requests_total", "endpoint" => "health").increment(1);

    let router = state.analyzer.router();
    if query.refresh {
        router.refresh_availability().await;
    }

    let sentiment_model = router.local_model(Task::Sentiment).map(|m| m.name().to_string());
    let embedder = state
        .analyzer
        .templates()
        .map(|t| t.embedder().name().to_string());

    Json(json!({
        "status": "healthy",
        "message": "Hinglish analysis backend is running",
        "models": {
            "llama": router.local_llm_available(),
            "gemini": router.has_hosted_llm(),
            "transcriber": state.transcriber.as_ref().map(|t| t.model().to_string()),
            "sentiment_model": sentiment_model,
            "toxicity_model": state.analyzer.toxicity().classifier().name(),
            "embedder": embedder,
        }
    }))
}

#[derive(Debug, Serialize)]
struct SampleResult {
    input: &'static str,
    output: AnalysisReport,
}

async fn run_samples(State(state): State<AppState>) -> Json<serde_json::Value> {
    metrics::counter!("hinglish_requests_total", "endpoint" => "test").increment(1);

    let mut results = Vec::with_capacity(TEST_SAMPLES.len());
    for input in TEST_SAMPLES {
        results.push(SampleResult {
            input,
            output: state.analyzer.analyze(input).await,
        });
    }

    Json(json!({
        "success": true,
        "test_results": results,
    }))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn fallback() -> AppError {
    AppError::NotFound
}

/// Handler errors, rendered as `{success: false, error}`
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No input provided. Send 'audio' file or 'text' in JSON body.")]
    NoInput,

    #[error("Empty input provided")]
    EmptyInput,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Audio input is not enabled: no transcription backend configured")]
    TranscriptionUnavailable,

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Not found")]
    NotFound,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NoInput | AppError::EmptyInput | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TranscriptionUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Transcription(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.to_string(),
        });

        (self.status(), Json(body)).into_response()
    }
}
