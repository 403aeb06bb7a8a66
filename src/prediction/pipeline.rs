use crate::image::{FetchOutcome, ImageFetcher, ImageLoader, ImagePreprocessor, InputImage};
use crate::models::ModelManager;
use crate::prediction::{ClassificationResult, ResultSummarizer};
use crate::utils::error::ClassifierError;
use crate::Result;
use axum::body::Bytes;
use std::time::Instant;

/// A classified image together with the bytes it came from.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub image: InputImage,
    pub result: ClassificationResult,
}

/// What the page shows for one request.
#[derive(Debug, Clone)]
pub enum PageState {
    Idle,
    Success(Box<Prediction>),
    Error,
}

/// fetch -> preprocess -> infer -> summarize
#[derive(Clone)]
pub struct PredictionPipeline {
    fetcher: ImageFetcher,
    models: ModelManager,
    max_image_bytes: usize,
}

impl PredictionPipeline {
    pub fn new(fetcher: ImageFetcher, models: ModelManager, max_image_bytes: usize) -> Self {
        Self {
            fetcher,
            models,
            max_image_bytes,
        }
    }

    /// Runs the whole pipeline for the URL field. `Ok(None)` means the field
    /// was empty.
    pub async fn classify_url(&self, raw_url: &str) -> Result<Option<Prediction>> {
        let start_time = Instant::now();

        let image = match self.fetcher.fetch(raw_url).await? {
            FetchOutcome::NoInput => return Ok(None),
            FetchOutcome::Fetched(image) => image,
        };
        let fetch_time = start_time.elapsed();

        let result = self.classify_bytes(image.bytes.clone()).await?;

        tracing::info!(
            "Classified {} as {} ({:.1}%): fetch={:.3}s, total={:.3}s",
            image.url,
            result.label.name(),
            result.confidence() * 100.0,
            fetch_time.as_secs_f32(),
            start_time.elapsed().as_secs_f32()
        );

        Ok(Some(Prediction { image, result }))
    }

    /// Decode, preprocess and infer on already fetched bytes.
    pub async fn classify_bytes(&self, bytes: Bytes) -> Result<ClassificationResult> {
        let model = self.models.model();
        let max_bytes = self.max_image_bytes;

        // decode, resize and the forward pass are all CPU bound
        let probabilities = tokio::task::spawn_blocking(move || {
            let image = ImageLoader::from_bytes(&bytes, max_bytes)?;
            let batch = ImagePreprocessor::to_batch(&image)?;
            model.infer(batch.view())
        })
        .await
        .map_err(|e| ClassifierError::Internal(format!("inference task failed: {}", e)))??;

        Ok(ResultSummarizer::summarize(probabilities))
    }

    /// Same as [`classify_url`](Self::classify_url), but folded into the three
    /// page states. Failures are logged here and never reach the caller.
    pub async fn page_state(&self, raw_url: &str, request_id: &str) -> PageState {
        match self.classify_url(raw_url).await {
            Ok(None) => PageState::Idle,
            Ok(Some(prediction)) => PageState::Success(Box::new(prediction)),
            Err(e) => {
                tracing::warn!(
                    "Prediction failed: request_id={}, kind={:?}, code={}, error={}",
                    request_id,
                    e.kind(),
                    e.error_code(),
                    e
                );
                PageState::Error
            }
        }
    }

    pub fn models(&self) -> &ModelManager {
        &self.models
    }
}
