use crate::{
    prediction::ClassificationResult,
    utils::error::ClassifierError,
    web::{
        extractors::{RequestId, ValidatedJson, ValidationError},
        ui, AppState,
    },
    Result,
};
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

/// Query string of the page: `/?url=...`
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub url: Option<String>,
}

/// JSON request body for `/api/predict`
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub url: String,
    pub headline: String,
    #[serde(flatten)]
    pub result: ClassificationResult,
    pub processing_time: f32,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub timestamp: String,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, request_id: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id,
        }
    }

    pub fn error(error: &ClassifierError, request_id: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: error.error_code().to_string(),
                message: error.to_string(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id,
        }
    }
}

/// The single page: idle, result or error depending on `url`.
pub async fn page_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let start_time = Instant::now();
    let url = query.url.unwrap_or_default();

    let page_state = state.pipeline.page_state(&url, &request_id).await;

    tracing::info!(
        "Rendered page: request_id={}, state={}, time={:.3}s",
        request_id,
        match &page_state {
            crate::prediction::PageState::Idle => "idle",
            crate::prediction::PageState::Success(_) => "success",
            crate::prediction::PageState::Error => "error",
        },
        start_time.elapsed().as_secs_f32()
    );

    Html(ui::render_page(&page_state, &url))
}

/// JSON prediction for a URL; failures keep their specific error code.
pub async fn predict_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    body: std::result::Result<ValidatedJson<PredictRequest>, ValidationError>,
) -> Response {
    let start_time = Instant::now();

    let outcome = match body {
        Ok(ValidatedJson(request)) => predict(&state, &request_id, request).await,
        Err(rejection) => Err(ClassifierError::InvalidInput(rejection.to_string())),
    };

    match outcome {
        Ok(mut response) => {
            response.processing_time = start_time.elapsed().as_secs_f32();
            tracing::info!(
                "Predict completed: request_id={}, label={}, time={:.3}s",
                request_id,
                response.result.label.name(),
                response.processing_time
            );
            Json(ApiResponse::success(response, request_id)).into_response()
        }
        Err(e) => {
            let status = e.status_code();
            tracing::error!(
                "Predict failed: request_id={}, code={}, error={} ({})",
                request_id,
                e.error_code(),
                e,
                status
            );
            (status, Json(ApiResponse::<PredictResponse>::error(&e, request_id))).into_response()
        }
    }
}

async fn predict(state: &AppState, request_id: &str, request: PredictRequest) -> Result<PredictResponse> {
    tracing::info!(
        "Processing predict request: request_id={}, url={}",
        request_id,
        request.url
    );

    let prediction = state
        .pipeline
        .classify_url(&request.url)
        .await?
        .ok_or_else(|| ClassifierError::InvalidInput("Image URL cannot be empty".to_string()))?;

    Ok(PredictResponse {
        url: prediction.image.url,
        headline: prediction.result.headline(),
        result: prediction.result,
        processing_time: 0.0,
    })
}

pub async fn health_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let models = state.pipeline.models().clone();
    tokio::task::spawn_blocking(move || models.health_check())
        .await
        .map_err(|e| ClassifierError::Internal(format!("health check task failed: {}", e)))??;

    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    })))
}

pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": "Rock Paper Scissors Classifier",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "model": state.pipeline.models().stats(),
        "fetch": {
            "timeout_secs": state.config.fetch_config.timeout.as_secs(),
            "max_image_bytes": state.config.fetch_config.max_image_bytes,
        }
    }))
}
