pub mod chart;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod ui;

use crate::{
    image::{HttpImageSource, ImageFetcher},
    models::ModelManager,
    prediction::PredictionPipeline,
    utils::error::ClassifierError,
    Config, Result,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, timeout::TimeoutLayer,
};

/// Shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: PredictionPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: PredictionPipeline) -> Self {
        Self { config, pipeline }
    }

    /// Loads the model and builds the HTTP fetcher from the config.
    pub fn from_config(config: Config) -> Result<Self> {
        let models = ModelManager::load(&config)?;
        let source = HttpImageSource::new(&config.fetch_config)?;
        let pipeline = PredictionPipeline::new(
            ImageFetcher::new(Arc::new(source)),
            models,
            config.fetch_config.max_image_bytes,
        );
        Ok(Self::new(config, pipeline))
    }
}

pub async fn serve(config: Config) -> Result<()> {
    // a missing or incompatible model stops the process here
    let state = AppState::from_config(config.clone())?;

    let app = create_app(state);

    let addr: SocketAddr = config.bind_addr.parse().map_err(|e| {
        ClassifierError::Config(format!("Invalid bind address {}: {}", config.bind_addr, e))
    })?;

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /?url=...     - Classifier page");
    tracing::info!("  POST /api/predict  - JSON prediction");
    tracing::info!("  GET  /health       - Health check");
    tracing::info!("  GET  /api/info     - Service information");

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        ClassifierError::Internal(format!("Failed to bind to address {}: {}", addr, e))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ClassifierError::Internal(format!("Server failed: {}", e)))?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let assets_dir = state.config.assets_dir.clone();
    let server_config = state.config.server_config.clone();

    Router::new()
        .route("/", get(handlers::page_handler))
        .route("/api/predict", post(handlers::predict_handler))
        .route("/health", get(handlers::health_handler))
        .route("/api/info", get(handlers::info_handler))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(RequestBodyLimitLayer::new(server_config.max_request_size))
        .layer(TimeoutLayer::new(Duration::from_secs(server_config.request_timeout)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
