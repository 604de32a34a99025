use super::CdnService;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockCdnClient {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    base_url: String,
    upload_count: Arc<Mutex<usize>>,
    probe_count: Arc<Mutex<usize>>,
    available_after: Arc<Mutex<usize>>,
    upload_failure: Arc<Mutex<Option<String>>>,
}

impl MockCdnClient {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            base_url: "https://mock-cdn.example.com".to_string(),
            upload_count: Arc::new(Mutex::new(0)),
            probe_count: Arc::new(Mutex::new(0)),
            available_after: Arc::new(Mutex::new(0)),
            upload_failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Make probes report unavailable until `probes` of them have happened.
    pub fn with_available_after(self, probes: usize) -> Self {
        *self.available_after.lock().unwrap() = probes;
        self
    }

    pub fn with_upload_failure(self, message: &str) -> Self {
        *self.upload_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }

    pub fn get_probe_count(&self) -> usize {
        *self.probe_count.lock().unwrap()
    }

    pub fn get_files(&self) -> HashMap<String, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }
}

impl Default for MockCdnClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdnService for MockCdnClient {
    async fn upload_file(&self, key: &str, data: &[u8], _content_type: &str) -> Result<String> {
        if let Some(message) = self.upload_failure.lock().unwrap().clone() {
            return Err(crate::Error::Staging(message));
        }

        let mut count = self.upload_count.lock().unwrap();
        *count += 1;

        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
        Ok(self.public_url(key))
    }

    async fn file_exists(&self, key: &str) -> Result<bool> {
        let mut count = self.probe_count.lock().unwrap();
        *count += 1;

        if *count <= *self.available_after.lock().unwrap() {
            return Ok(false);
        }

        Ok(self.files.lock().unwrap().contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_cdn_upload_and_probe() {
        let client = MockCdnClient::new();

        let url = client
            .upload_file("uploads/test.png", b"image bytes", "image/png")
            .await
            .unwrap();

        assert_eq!(url, "https://mock-cdn.example.com/uploads/test.png");
        assert_eq!(client.get_upload_count(), 1);

        assert!(client.file_exists("uploads/test.png").await.unwrap());
        assert!(!client.file_exists("uploads/missing.png").await.unwrap());
        assert_eq!(client.get_probe_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_cdn_with_custom_base_url() {
        let client = MockCdnClient::new().with_base_url("https://custom-cdn.com".to_string());

        let url = client
            .upload_file("file.png", b"data", "image/png")
            .await
            .unwrap();

        assert_eq!(url, "https://custom-cdn.com/file.png");
        assert_eq!(client.public_url("file.png"), "https://custom-cdn.com/file.png");
    }

    #[tokio::test]
    async fn test_mock_cdn_available_after() {
        let client = MockCdnClient::new().with_available_after(2);
        client
            .upload_file("uploads/slow.png", b"data", "image/png")
            .await
            .unwrap();

        assert!(!client.file_exists("uploads/slow.png").await.unwrap());
        assert!(!client.file_exists("uploads/slow.png").await.unwrap());
        assert!(client.file_exists("uploads/slow.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_cdn_upload_failure() {
        let client = MockCdnClient::new().with_upload_failure("bucket over quota");

        let result = client.upload_file("x.png", b"data", "image/png").await;

        assert!(matches!(result, Err(crate::Error::Staging(ref m)) if m == "bucket over quota"));
        assert_eq!(client.get_upload_count(), 0);
    }
}
