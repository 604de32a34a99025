use super::ImageService;
use crate::models::ResizedImage;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockImageResizer {
    prepare_count: Arc<Mutex<usize>>,
    dimensions: (u32, u32),
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageResizer {
    pub fn new() -> Self {
        Self {
            prepare_count: Arc::new(Mutex::new(0)),
            dimensions: (500, 300),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = (width, height);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_prepare_count(&self) -> usize {
        *self.prepare_count.lock().unwrap()
    }
}

impl Default for MockImageResizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageService for MockImageResizer {
    async fn prepare_image(&self, data: &[u8]) -> Result<ResizedImage> {
        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Decode(image::ImageError::IoError(
                std::io::Error::other("Mock decode failure"),
            )));
        }

        let mut count = self.prepare_count.lock().unwrap();
        *count += 1;

        Ok(ResizedImage {
            bytes: data.to_vec(),
            width: self.dimensions.0,
            height: self.dimensions.1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_resizer_passes_bytes_through() {
        let resizer = MockImageResizer::new().with_dimensions(800, 400);

        let resized = resizer.prepare_image(b"fake image data").await.unwrap();

        assert_eq!(resized.bytes, b"fake image data");
        assert_eq!((resized.width, resized.height), (800, 400));
        assert_eq!(resizer.get_prepare_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_resizer_with_failure() {
        let resizer = MockImageResizer::new().with_failure(true);

        let result = resizer.prepare_image(b"data").await;
        assert!(result.is_err());
        assert_eq!(resizer.get_prepare_count(), 0);
    }
}
