pub mod config;
pub mod image;
pub mod models;
pub mod prediction;
pub mod utils;
pub mod web;

pub use config::Config;
pub use prediction::{ClassificationResult, Gesture, PredictionVector};
pub use utils::error::ClassifierError;

pub type Result<T> = std::result::Result<T, ClassifierError>;
