use crate::image::PIXEL_SCALE;
use crate::models::{Inference, ModelInfo, OnnxGestureModel};
use crate::prediction::Gesture;
use crate::utils::error::ClassifierError;
use crate::{Config, Result};
use std::sync::Arc;

/// Owns the loaded network for the lifetime of the process.
///
/// Built once before the server binds; shared read-only afterwards.
#[derive(Clone)]
pub struct ModelManager {
    model: Arc<dyn Inference>,
    intra_threads: usize,
}

impl ModelManager {
    /// Loads the weights named in the config. Any failure here is fatal.
    pub fn load(config: &Config) -> Result<Self> {
        tracing::info!("Initializing model manager...");

        let model = OnnxGestureModel::load(&config.model_config)?;

        tracing::info!("Model manager initialized successfully");
        Ok(Self {
            model: Arc::new(model),
            intra_threads: config.model_config.intra_threads,
        })
    }

    /// Wraps an already constructed network.
    pub fn from_model(model: Arc<dyn Inference>) -> Self {
        Self {
            model,
            intra_threads: 1,
        }
    }

    pub fn model(&self) -> Arc<dyn Inference> {
        Arc::clone(&self.model)
    }

    /// Runs the network on an all-zero batch and checks it still answers.
    pub fn health_check(&self) -> Result<()> {
        tracing::debug!("Performing model health check...");

        let output = self.model.warm_up()?;

        let total = output.sum();
        if (total - 1.0).abs() > 1e-2 {
            return Err(ClassifierError::Inference(format!(
                "model output does not sum to 1 (got {})",
                total
            )));
        }

        tracing::debug!("Model health check passed");
        Ok(())
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            model: self.model.info(),
            classes: Gesture::ALL.iter().map(|g| g.name()).collect(),
            pixel_scale: PIXEL_SCALE,
            intra_threads: self.intra_threads,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelStats {
    pub model: ModelInfo,
    pub classes: Vec<&'static str>,
    pub pixel_scale: f64,
    pub intra_threads: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::PredictionVector;
    use crate::image::INPUT_SHAPE;
    use ndarray::ArrayView4;

    struct Fixed([f32; 3]);

    impl Inference for Fixed {
        fn infer(&self, _batch: ArrayView4<'_, f32>) -> Result<PredictionVector> {
            PredictionVector::new(self.0)
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                source: "fixed".into(),
                input_name: "input".into(),
                output_name: "probs".into(),
                input_shape: INPUT_SHAPE,
            }
        }
    }

    #[test]
    fn health_check_accepts_a_distribution() {
        let manager = ModelManager::from_model(Arc::new(Fixed([0.2, 0.3, 0.5])));
        assert!(manager.health_check().is_ok());
    }

    #[test]
    fn health_check_rejects_unnormalised_output() {
        let manager = ModelManager::from_model(Arc::new(Fixed([0.9, 0.9, 0.9])));
        assert!(manager.health_check().is_err());
    }

    #[test]
    fn stats_list_classes_in_output_order() {
        let manager = ModelManager::from_model(Arc::new(Fixed([0.2, 0.3, 0.5])));
        let stats = manager.stats();
        assert_eq!(stats.classes, vec!["Paper", "Rock", "Scissor"]);
        assert_eq!(stats.model.input_shape, [1, 150, 150, 3]);
        assert!((stats.pixel_scale - 1.0 / 225.0).abs() < 1e-12);
    }

    #[test]
    fn load_fails_without_weights() {
        let mut config = Config::default();
        config.model_config.model_path = "missing/rps.onnx".into();
        assert!(matches!(
            ModelManager::load(&config),
            Err(ClassifierError::ModelLoad(_))
        ));
    }
}
