//! Data models and structures
//!
//! Defines the core data structures for the conversion pipeline, the wire
//! types for the conversion endpoint, and application configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A user-submitted image waiting to enter the pipeline.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl UploadRequest {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A downscaled, PNG re-encoded image ready for staging.
///
/// Dimensions never exceed the configured bounding box and the source aspect
/// ratio is preserved.
#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ResizedImage {
    pub const CONTENT_TYPE: &'static str = "image/png";
}

/// An object uploaded to staging storage, addressable at a public URL.
#[derive(Debug, Clone)]
pub struct StagedObject {
    pub key: String,
    pub public_url: String,
}

/// Output of a successful conversion. `output_urls` is never empty.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub output_urls: Vec<String>,
}

impl ConversionResult {
    pub fn primary_url(&self) -> &str {
        &self.output_urls[0]
    }
}

// Conversion endpoint request/response models
#[derive(Debug, Serialize)]
pub struct ConvertRequest {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertResponse {
    pub output: Option<Vec<String>>,
    pub error: Option<String>,
}

/// Tuning knobs for the pipeline. Fixed at sensible defaults; override
/// individual fields when constructing an [`crate::app::App`] for tests.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub max_file_size_bytes: u64,
    pub poll_attempts: usize,
    pub poll_interval: Duration,
    pub rate_limit_backoff: Duration,
    pub encode_quality: f32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 400,
            max_file_size_bytes: 4 * 1024 * 1024,
            poll_attempts: 5,
            poll_interval: Duration::from_secs(1),
            rate_limit_backoff: Duration::from_secs(15),
            encode_quality: 0.9,
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub convert_api_url: String,
    pub cdn_access_key_id: Option<String>,
    pub cdn_secret_access_key: Option<String>,
    pub cdn_endpoint: String,
    pub cdn_bucket: String,
    pub cdn_base_url: String,
    pub dry_run: bool,
    pub pipeline: PipelineOptions,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let dry_run = std::env::var("DRY_RUN")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let cdn_access_key_id = std::env::var("CDN_ACCESS_KEY_ID").ok();
        let cdn_secret_access_key = std::env::var("CDN_SECRET_ACCESS_KEY").ok();

        if !dry_run {
            if cdn_access_key_id.is_none() {
                return Err(crate::Error::Generic(
                    "CDN_ACCESS_KEY_ID not set".to_string(),
                ));
            }
            if cdn_secret_access_key.is_none() {
                return Err(crate::Error::Generic(
                    "CDN_SECRET_ACCESS_KEY not set".to_string(),
                ));
            }
        }

        Ok(Self {
            convert_api_url: std::env::var("CONVERT_API_URL")
                .unwrap_or_else(|_| "https://api.ghiblify.app/convert".to_string()),
            cdn_access_key_id,
            cdn_secret_access_key,
            cdn_endpoint: std::env::var("CDN_ENDPOINT")
                .unwrap_or_else(|_| "https://nyc3.digitaloceanspaces.com".to_string()),
            cdn_bucket: std::env::var("CDN_BUCKET").unwrap_or_else(|_| "ghiblify".to_string()),
            cdn_base_url: std::env::var("CDN_BASE_URL")
                .unwrap_or_else(|_| "https://cdn.ghiblify.app".to_string()),
            dry_run,
            pipeline: PipelineOptions::default(),
        })
    }
}
