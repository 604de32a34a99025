//! Staging storage integration
//!
//! Handles uploading resized images to S3-compatible object storage
//! (DigitalOcean Spaces) and probing the public URL until the staged copy
//! is servable.

pub mod client;
pub mod mock;

pub use client::CdnClient;
pub use mock::MockCdnClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CdnService: Send + Sync {
    /// Upload a blob and return its public URL.
    async fn upload_file(&self, key: &str, data: &[u8], content_type: &str) -> Result<String>;

    /// Probe whether the object at `key` is publicly fetchable yet.
    /// Transport errors count as "not yet available", never as failure.
    async fn file_exists(&self, key: &str) -> Result<bool>;

    /// Deterministic public URL for a key; no network round trip.
    fn public_url(&self, key: &str) -> String;
}
