use super::ImageService;
use crate::models::{PipelineOptions, ResizedImage};
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;

#[derive(Clone)]
pub struct ImageResizer {
    max_width: u32,
    max_height: u32,
    quality: f32,
}

impl ImageResizer {
    pub fn new(options: &PipelineOptions) -> Self {
        Self {
            max_width: options.max_width,
            max_height: options.max_height,
            quality: options.encode_quality,
        }
    }

    /// Fit `(width, height)` into the bounding box, preserving aspect ratio.
    ///
    /// Clamps width first, then height, rounding at each step. Scale-down
    /// only: dimensions already within bounds are returned unchanged.
    fn scaled_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let mut w = width as f64;
        let mut h = height as f64;

        if w > self.max_width as f64 {
            h = (h * self.max_width as f64 / w).round();
            w = self.max_width as f64;
        }
        if h > self.max_height as f64 {
            w = (w * self.max_height as f64 / h).round();
            h = self.max_height as f64;
        }

        // A dimension must never collapse to zero for extreme aspect ratios.
        (w.max(1.0) as u32, h.max(1.0) as u32)
    }

    fn prepare_sync(&self, data: Vec<u8>) -> Result<ResizedImage> {
        let img = image::load_from_memory(&data)?;

        let (width, height) = self.scaled_dimensions(img.width(), img.height());

        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };

        // PNG is lossless, so the quality knob selects compression effort.
        let compression = if self.quality < 0.5 {
            CompressionType::Fast
        } else {
            CompressionType::Best
        };

        let mut bytes = Vec::new();
        let encoder = PngEncoder::new_with_quality(&mut bytes, compression, PngFilterType::Adaptive);
        resized.write_with_encoder(encoder)?;

        Ok(ResizedImage {
            bytes,
            width,
            height,
        })
    }
}

#[async_trait]
impl ImageService for ImageResizer {
    async fn prepare_image(&self, data: &[u8]) -> Result<ResizedImage> {
        let data = data.to_vec();
        let resizer = self.clone();

        tokio::task::spawn_blocking(move || resizer.prepare_sync(data))
            .await
            .map_err(|e| Error::Generic(format!("Image resize task join error: {}", e)))?
    }
}
