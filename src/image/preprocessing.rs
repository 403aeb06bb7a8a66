use crate::utils::error::ClassifierError;
use crate::Result;
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Edge length of the square network input.
pub const INPUT_SIZE: u32 = 150;

/// Batch tensor shape fed to the network (NHWC).
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3];

/// Per-pixel scale applied before inference.
///
/// The trained weights expect 1/225, not 1/255. Changing it would shift every
/// activation relative to what the head was fitted on.
pub const PIXEL_SCALE: f64 = 1.0 / 225.0;

pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Decoded image -> (1, 150, 150, 3) `f32` batch.
    ///
    /// The resize is direct; aspect ratio is not preserved.
    pub fn to_batch(image: &DynamicImage) -> Result<Array4<f32>> {
        Self::ensure_color(image)?;

        let resized = image.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);
        let rgb = resized.to_rgb8();

        let batch = Array4::from_shape_fn(
            (INPUT_SHAPE[0], INPUT_SHAPE[1], INPUT_SHAPE[2], INPUT_SHAPE[3]),
            |(_, y, x, c)| Self::scale(rgb.get_pixel(x as u32, y as u32)[c]),
        );

        Ok(batch)
    }

    pub fn scale(value: u8) -> f32 {
        (f64::from(value) * PIXEL_SCALE) as f32
    }

    fn ensure_color(image: &DynamicImage) -> Result<()> {
        let color = image.color();
        if color.channel_count() < 3 {
            return Err(ClassifierError::Preprocess(format!(
                "expected an RGB image, got {:?} with {} channel(s)",
                color,
                color.channel_count()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn output_shape_is_single_item_batch() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([1, 2, 3])));
        let batch = ImagePreprocessor::to_batch(&img).unwrap();
        assert_eq!(batch.shape(), &INPUT_SHAPE);
    }

    #[test]
    fn values_are_pixel_over_225() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(150, 150, Rgb([225, 90, 255])));
        let batch = ImagePreprocessor::to_batch(&img).unwrap();

        for y in [0, 75, 149] {
            for x in [0, 42, 149] {
                assert!((batch[[0, y, x, 0]] - 1.0).abs() < 1e-6);
                assert!((batch[[0, y, x, 1]] - 0.4).abs() < 1e-6);
                assert!((batch[[0, y, x, 2]] - 255.0 / 225.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn resize_ignores_aspect_ratio() {
        // left half red, right half blue on a wide canvas
        let img = RgbImage::from_fn(300, 50, |x, _| {
            if x < 150 {
                Rgb([225, 0, 0])
            } else {
                Rgb([0, 0, 225])
            }
        });
        let batch = ImagePreprocessor::to_batch(&DynamicImage::ImageRgb8(img)).unwrap();

        // both halves still fill the full height of the square
        assert!((batch[[0, 0, 10, 0]] - 1.0).abs() < 1e-3);
        assert!((batch[[0, 149, 10, 0]] - 1.0).abs() < 1e-3);
        assert!((batch[[0, 0, 140, 2]] - 1.0).abs() < 1e-3);
        assert!((batch[[0, 149, 140, 2]] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn alpha_channel_is_dropped() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 20, Rgba([45, 90, 135, 255])));
        let batch = ImagePreprocessor::to_batch(&img).unwrap();
        assert_eq!(batch.shape(), &INPUT_SHAPE);
        assert!((batch[[0, 5, 5, 2]] - 0.6).abs() < 0.01);
    }

    #[test]
    fn grayscale_is_rejected() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 20, Luma([100])));
        let err = ImagePreprocessor::to_batch(&img).unwrap_err();
        assert!(matches!(err, ClassifierError::Preprocess(_)));
    }

    #[test]
    fn same_image_gives_identical_tensor() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(97, 211, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
        }));
        let a = ImagePreprocessor::to_batch(&img).unwrap();
        let b = ImagePreprocessor::to_batch(&img).unwrap();
        assert_eq!(a, b);
    }
}
