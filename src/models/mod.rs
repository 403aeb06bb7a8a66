pub mod gesture;
pub mod manager;

pub use gesture::{Inference, ModelInfo, OnnxGestureModel};
pub use manager::{ModelManager, ModelStats};
