pub mod pipeline;
pub mod summary;
pub mod types;

pub use pipeline::{PageState, Prediction, PredictionPipeline};
pub use summary::ResultSummarizer;
pub use types::{ClassProbability, ClassificationResult, Gesture, PredictionVector};
