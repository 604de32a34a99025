//! Remote conversion service integration
//!
//! Sends a staged image URL to the style-conversion endpoint and interprets
//! its JSON responses, including the rate-limit signal the orchestrator
//! reacts to.

pub mod client;
pub mod mock;

pub use client::ConvertClient;
pub use mock::MockConvertClient;

use crate::models::ConversionResult;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ConversionService: Send + Sync {
    async fn convert_image(&self, image_url: &str) -> Result<ConversionResult>;
}
