#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::{ArrayView4, Axis};
use reqwest::Url;
use rps_classifier::image::{ImageFetcher, ImageSource, INPUT_SHAPE};
use rps_classifier::models::{Inference, ModelInfo, ModelManager};
use rps_classifier::prediction::PredictionPipeline;
use rps_classifier::web::AppState;
use rps_classifier::{ClassifierError, Config, PredictionVector, Result};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

pub fn png(width: u32, height: u32, colour: [u8; 3]) -> Bytes {
    let img = RgbImage::from_pixel(width, height, Rgb(colour));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    Bytes::from(buf.into_inner())
}

/// Picks the class from whichever colour channel is brightest on average:
/// red -> rock, green -> paper, blue -> scissors.
pub struct ColourModel;

impl Inference for ColourModel {
    fn infer(&self, batch: ArrayView4<'_, f32>) -> Result<PredictionVector> {
        let mean = |c: usize| batch.index_axis(Axis(3), c).mean().unwrap_or(0.0);
        let (r, g, b) = (mean(0), mean(1), mean(2));
        let total = r + g + b;
        if total == 0.0 {
            return PredictionVector::new([1.0 / 3.0; 3]);
        }
        PredictionVector::new([g / total, r / total, b / total])
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            source: "colour".into(),
            input_name: "input_1".into(),
            output_name: "dense_2".into(),
            input_shape: INPUT_SHAPE,
        }
    }
}

/// A network whose output has the wrong arity.
pub struct BrokenModel;

impl Inference for BrokenModel {
    fn infer(&self, _batch: ArrayView4<'_, f32>) -> Result<PredictionVector> {
        PredictionVector::from_slice(&[0.5, 0.5])
    }

    fn info(&self) -> ModelInfo {
        ColourModel.info()
    }
}

/// Serves the same body for every URL, or fails every request.
pub struct FixedSource(pub Option<Bytes>);

#[async_trait]
impl ImageSource for FixedSource {
    async fn get(&self, url: &Url) -> Result<Bytes> {
        self.0
            .clone()
            .ok_or_else(|| ClassifierError::Fetch(format!("{} unreachable", url)))
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.assets_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
    config
}

pub fn state_with(source: Arc<dyn ImageSource>, model: Arc<dyn Inference>) -> AppState {
    let config = test_config();
    let pipeline = PredictionPipeline::new(
        ImageFetcher::new(source),
        ModelManager::from_model(model),
        config.fetch_config.max_image_bytes,
    );
    AppState::new(config, pipeline)
}
