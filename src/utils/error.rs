use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Image fetch failed: {0}")]
    Fetch(String),

    #[error("Image too large: {0} bytes, max allowed: {1} bytes")]
    FileTooLarge(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Image preprocessing failed: {0}")]
    Preprocess(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ORT error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Which stage of the prediction pipeline a failure belongs to.
///
/// The page collapses all of these into one error screen; logs and the JSON
/// API keep them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Fetch,
    Decode,
    Inference,
    Other,
}

impl ClassifierError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClassifierError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ClassifierError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ClassifierError::FileTooLarge(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            ClassifierError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ClassifierError::Decode(_) | ClassifierError::Image(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ClassifierError::Preprocess(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ClassifierError::ModelLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ClassifierError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            ClassifierError::Fetch(_) => "FETCH_ERROR",
            ClassifierError::FileTooLarge(_, _) => "FILE_TOO_LARGE",
            ClassifierError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ClassifierError::Decode(_) => "IMAGE_DECODE_ERROR",
            ClassifierError::Preprocess(_) => "PREPROCESSING_ERROR",
            ClassifierError::Inference(_) => "INFERENCE_ERROR",
            ClassifierError::InvalidInput(_) => "INVALID_INPUT",
            ClassifierError::Config(_) => "CONFIG_ERROR",
            ClassifierError::Image(_) => "IMAGE_DECODE_ERROR",
            ClassifierError::Ort(_) => "ORT_ERROR",
            ClassifierError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ClassifierError::Fetch(_) | ClassifierError::FileTooLarge(_, _) => FailureKind::Fetch,
            ClassifierError::UnsupportedFormat(_)
            | ClassifierError::Decode(_)
            | ClassifierError::Preprocess(_)
            | ClassifierError::Image(_) => FailureKind::Decode,
            ClassifierError::Inference(_) | ClassifierError::Ort(_) => FailureKind::Inference,
            _ => FailureKind::Other,
        }
    }
}

impl IntoResponse for ClassifierError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = serde_json::json!({
            "success": false,
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            },
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        tracing::error!("Request failed: {} ({})", self, status);

        (status, axum::Json(error_response)).into_response()
    }
}
