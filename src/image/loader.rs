use crate::utils::error::ClassifierError;
use crate::Result;
use axum::body::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat};

/// Largest edge accepted before decoding into memory.
const MAX_DIMENSION: u32 = 8192;

pub struct ImageLoader;

impl ImageLoader {
    /// Decodes fetched bytes into an image.
    pub fn from_bytes(bytes: &Bytes, max_bytes: usize) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(ClassifierError::Decode("empty image body".to_string()));
        }

        if bytes.len() > max_bytes {
            return Err(ClassifierError::FileTooLarge(bytes.len(), max_bytes));
        }

        let format = Self::detect_format(bytes).ok_or_else(|| {
            ClassifierError::Decode("bytes are not a recognised image format".to_string())
        })?;

        if !Self::is_supported_format(format) {
            return Err(ClassifierError::UnsupportedFormat(format!("{:?}", format)));
        }

        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ClassifierError::Decode(e.to_string()))?;

        Self::validate_dimensions(&image)?;

        tracing::debug!(
            "Decoded {:?} image: {}x{} {:?}",
            format,
            image.width(),
            image.height(),
            image.color()
        );

        Ok(image)
    }

    pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    pub fn is_supported_format(format: ImageFormat) -> bool {
        matches!(
            format,
            ImageFormat::Png
                | ImageFormat::Jpeg
                | ImageFormat::Gif
                | ImageFormat::Bmp
                | ImageFormat::Tiff
                | ImageFormat::WebP
        )
    }

    /// MIME type for a thumbnail `data:` URI.
    pub fn mime_type(bytes: &[u8]) -> &'static str {
        Self::detect_format(bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream")
    }

    pub fn validate_dimensions(image: &DynamicImage) -> Result<()> {
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(ClassifierError::Decode(format!(
                "Image has no pixels: {}x{}",
                width, height
            )));
        }

        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ClassifierError::Decode(format!(
                "Image too large: {}x{}, maximum {}x{}",
                width, height, MAX_DIMENSION, MAX_DIMENSION
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Bytes {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        Bytes::from(buf.into_inner())
    }

    #[test]
    fn decodes_png() {
        let image = ImageLoader::from_bytes(&png_bytes(40, 30), 1 << 20).unwrap();
        assert_eq!(image.dimensions(), (40, 30));
    }

    #[test]
    fn rejects_non_image_bytes() {
        let bytes = Bytes::from_static(b"<html><body>not found</body></html>");
        let err = ImageLoader::from_bytes(&bytes, 1 << 20).unwrap_err();
        assert!(matches!(err, ClassifierError::Decode(_)));
    }

    #[test]
    fn rejects_truncated_png() {
        let bytes = png_bytes(40, 30);
        let truncated = bytes.slice(0..bytes.len() / 2);
        assert!(ImageLoader::from_bytes(&truncated, 1 << 20).is_err());
    }

    #[test]
    fn enforces_byte_limit() {
        let bytes = png_bytes(40, 30);
        let err = ImageLoader::from_bytes(&bytes, 16).unwrap_err();
        assert!(matches!(err, ClassifierError::FileTooLarge(_, 16)));
    }

    #[test]
    fn oversized_dimensions_are_a_decode_failure() {
        let err = ImageLoader::from_bytes(&png_bytes(MAX_DIMENSION + 1, 1), 1 << 20).unwrap_err();
        assert!(matches!(err, ClassifierError::Decode(_)));
        assert_eq!(err.kind(), crate::utils::error::FailureKind::Decode);
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn reports_mime_type() {
        assert_eq!(ImageLoader::mime_type(&png_bytes(2, 2)), "image/png");
        assert_eq!(ImageLoader::mime_type(b"plain"), "application/octet-stream");
    }
}
