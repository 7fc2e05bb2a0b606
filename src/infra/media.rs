//! Image transcoding for uploaded system assets.
//!
//! Decoding and encoding are CPU-bound, so they run on the blocking pool.

use std::io::Cursor;

use async_trait::async_trait;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Output format of a transcoded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// PNG, shrunk to fit inside a `max_edge` square (never enlarged)
    Png { max_edge: u32 },
    /// JPEG at the given quality, original dimensions
    Jpeg { quality: u8 },
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("transcoding task failed: {0}")]
    Task(String),
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, bytes: Vec<u8>, encoding: Encoding) -> Result<Vec<u8>, TranscodeError>;
}

/// `image`-crate backed transcoder
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageTranscoder;

#[async_trait]
impl Transcoder for ImageTranscoder {
    async fn transcode(&self, bytes: Vec<u8>, encoding: Encoding) -> Result<Vec<u8>, TranscodeError> {
        tokio::task::spawn_blocking(move || transcode_blocking(&bytes, encoding))
            .await
            .map_err(|e| TranscodeError::Task(e.to_string()))?
    }
}

/// Decode any supported format, apply EXIF orientation, then re-encode.
pub fn transcode_blocking(bytes: &[u8], encoding: Encoding) -> Result<Vec<u8>, TranscodeError> {
    let image = decode_oriented(bytes)?;
    let mut out = Vec::new();

    match encoding {
        Encoding::Png { max_edge } => {
            let image = if image.width() > max_edge || image.height() > max_edge {
                image.resize(max_edge, max_edge, FilterType::Lanczos3)
            } else {
                image
            };
            image.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        }
        Encoding::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))?;
        }
    }

    Ok(out)
}

fn decode_oriented(bytes: &[u8]) -> Result<DynamicImage, TranscodeError> {
    use image::ImageDecoder;

    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;

    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 90, 128]));
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_favicon_is_shrunk_to_fit() {
        let out = transcode_blocking(&png_fixture(512, 256), Encoding::Png { max_edge: 128 }).unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (128, 64));
    }

    #[test]
    fn test_small_favicon_is_not_enlarged() {
        let out = transcode_blocking(&png_fixture(32, 32), Encoding::Png { max_edge: 128 }).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (32, 32));
    }

    #[test]
    fn test_lossy_keeps_dimensions_and_drops_alpha() {
        let out = transcode_blocking(&png_fixture(300, 200), Encoding::Jpeg { quality: 85 }).unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (300, 200));
    }

    #[test]
    fn test_garbage_input_fails() {
        let result = transcode_blocking(b"definitely not an image", Encoding::Jpeg { quality: 85 });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_async_transcoder_runs_on_blocking_pool() {
        let out = ImageTranscoder
            .transcode(png_fixture(10, 10), Encoding::Jpeg { quality: 85 })
            .await
            .unwrap();
        assert!(!out.is_empty());
    }
}
