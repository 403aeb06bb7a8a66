pub mod fetcher;
pub mod loader;
pub mod preprocessing;

pub use fetcher::{FetchOutcome, HttpImageSource, ImageFetcher, ImageSource, InputImage};
pub use loader::ImageLoader;
pub use preprocessing::{ImagePreprocessor, INPUT_SHAPE, INPUT_SIZE, PIXEL_SCALE};
