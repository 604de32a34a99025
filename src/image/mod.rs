//! Image resizing and re-encoding
//!
//! Downscales user uploads to fit the staging bounding box and re-encodes
//! them as PNG before they are handed to object storage.

pub mod mock;
pub mod resizer;

pub use mock::MockImageResizer;
pub use resizer::ImageResizer;

use crate::models::ResizedImage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn prepare_image(&self, data: &[u8]) -> Result<ResizedImage>;
}
