use crate::config::ModelConfig;
use crate::image::INPUT_SHAPE;
use crate::prediction::PredictionVector;
use crate::utils::error::ClassifierError;
use crate::Result;
use ndarray::{Array4, ArrayView4};
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;

/// A network that maps a (1, 150, 150, 3) batch to three class probabilities.
pub trait Inference: Send + Sync {
    fn infer(&self, batch: ArrayView4<'_, f32>) -> Result<PredictionVector>;

    fn info(&self) -> ModelInfo;

    /// One forward pass on an all-zero batch.
    fn warm_up(&self) -> Result<PredictionVector> {
        let zeros = Array4::<f32>::zeros(INPUT_SHAPE);
        self.infer(zeros.view())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub source: String,
    pub input_name: String,
    pub output_name: String,
    pub input_shape: [usize; 4],
}

/// The exported classifier: frozen convolutional backbone with the trained
/// dense head, run through ONNX Runtime.
pub struct OnnxGestureModel {
    session: Mutex<Session>,
    model_path: PathBuf,
    input_name: String,
    output_name: String,
}

impl OnnxGestureModel {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let model_path = &config.model_path;

        if !model_path.exists() {
            return Err(ClassifierError::ModelLoad(format!(
                "Model weights not found: {}",
                model_path.display()
            )));
        }

        tracing::info!("Loading gesture model from: {}", model_path.display());

        let load_error = |e: &dyn std::fmt::Display| {
            ClassifierError::ModelLoad(format!("{}: {}", model_path.display(), e))
        };

        let session = Session::builder()
            .map_err(|e| load_error(&e))?
            .with_optimization_level(Self::optimization_level(config.optimization_level))
            .map_err(|e| load_error(&e))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| load_error(&e))?
            .commit_from_file(model_path)
            .map_err(|e| load_error(&e))?;

        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => {
                return Err(ClassifierError::ModelLoad(
                    "Gesture model has no inputs".to_string(),
                ))
            }
        };

        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => {
                return Err(ClassifierError::ModelLoad(
                    "Gesture model has no outputs".to_string(),
                ))
            }
        };

        tracing::info!(
            "Gesture model input: '{}', output: '{}'",
            input_name,
            output_name
        );
        for (i, output) in session.outputs.iter().enumerate() {
            tracing::debug!("Gesture model output[{}]: '{}'", i, output.name);
        }

        let model = Self {
            session: Mutex::new(session),
            model_path: model_path.clone(),
            input_name,
            output_name,
        };

        // A wrong head or input layout only shows up when the graph runs.
        model.warm_up().map_err(|e| {
            ClassifierError::ModelLoad(format!(
                "{} is not compatible with a {:?} input: {}",
                model_path.display(),
                INPUT_SHAPE,
                e
            ))
        })?;

        Ok(model)
    }

    fn optimization_level(level: i32) -> GraphOptimizationLevel {
        match level {
            i32::MIN..=0 => GraphOptimizationLevel::Disable,
            1 => GraphOptimizationLevel::Level1,
            2 => GraphOptimizationLevel::Level2,
            _ => GraphOptimizationLevel::Level3,
        }
    }
}

impl Inference for OnnxGestureModel {
    fn infer(&self, batch: ArrayView4<'_, f32>) -> Result<PredictionVector> {
        if batch.shape() != INPUT_SHAPE {
            return Err(ClassifierError::Inference(format!(
                "expected input shape {:?}, got {:?}",
                INPUT_SHAPE,
                batch.shape()
            )));
        }

        let input_tensor = Tensor::from_array(batch.to_owned())?;
        let probabilities: Vec<f32> = {
            let mut session = self.session.lock();
            let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

            match outputs.get(&self.output_name) {
                Some(output) => output.try_extract_array::<f32>()?.iter().copied().collect(),
                None => {
                    let available_outputs: Vec<String> =
                        outputs.keys().map(|s| s.to_string()).collect();
                    return Err(ClassifierError::Inference(format!(
                        "Gesture output '{}' not found. Available outputs: {:?}",
                        self.output_name, available_outputs
                    )));
                }
            }
        };

        PredictionVector::from_slice(&probabilities)
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            source: self.model_path.display().to_string(),
            input_name: self.input_name.clone(),
            output_name: self.output_name.clone(),
            input_shape: INPUT_SHAPE,
        }
    }
}
