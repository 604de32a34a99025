//! Application orchestration for the photo conversion pipeline.

use crate::cdn::{CdnClient, CdnService, MockCdnClient};
use crate::convert::{ConversionService, ConvertClient, MockConvertClient};
use crate::image::{ImageResizer, ImageService};
use crate::models::{
    Config, ConversionResult, PipelineOptions, ResizedImage, StagedObject, UploadRequest,
};
use crate::progress::{LogProgress, ProgressCallback, ProgressStage};
use crate::{Error, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tokio_retry::{strategy::FixedInterval, Retry};
use tracing::{info, warn};
use uuid::Uuid;

/// Coordinates validation, resizing, staging, availability polling, and the
/// remote conversion request for a single upload.
pub struct App {
    cdn: Box<dyn CdnService>,
    image: Box<dyn ImageService>,
    converter: Box<dyn ConversionService>,
    progress: Box<dyn ProgressCallback>,
    options: PipelineOptions,
    in_flight: AtomicBool,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub cdn: Box<dyn CdnService>,
    pub image: Box<dyn ImageService>,
    pub converter: Box<dyn ConversionService>,
    pub progress: Box<dyn ProgressCallback>,
}

/// Releases the single-flight slot when a conversion run ends, on every
/// exit path, so a failed attempt leaves nothing behind.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_services(services: AppServices, options: PipelineOptions) -> Self {
        Self {
            cdn: services.cdn,
            image: services.image,
            converter: services.converter,
            progress: services.progress,
            options,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub async fn new() -> Result<Self> {
        Self::from_config(Config::from_env()?).await
    }

    pub async fn from_config(config: Config) -> Result<Self> {
        // Reuse one HTTP connection pool for the conversion endpoint and the
        // availability probes; 30s bounds both calls.
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        let (cdn, converter): (Box<dyn CdnService>, Box<dyn ConversionService>) = if config.dry_run
        {
            info!("DRY_RUN enabled — staging and conversion use in-memory mocks");
            (
                Box::new(MockCdnClient::new().with_base_url(config.cdn_base_url.clone())),
                Box::new(MockConvertClient::new()),
            )
        } else {
            info!("Conversion endpoint: {}", config.convert_api_url);
            (
                Box::new(
                    CdnClient::new(
                        config
                            .cdn_access_key_id
                            .clone()
                            .expect("CDN_ACCESS_KEY_ID validated in Config::from_env"),
                        config
                            .cdn_secret_access_key
                            .clone()
                            .expect("CDN_SECRET_ACCESS_KEY validated in Config::from_env"),
                        config.cdn_endpoint.clone(),
                        config.cdn_bucket.clone(),
                        config.cdn_base_url.clone(),
                        http_client.clone(),
                    )
                    .await?,
                ),
                Box::new(ConvertClient::new_with_client(
                    config.convert_api_url.clone(),
                    http_client,
                )),
            )
        };

        let image = Box::new(ImageResizer::new(&config.pipeline));

        Ok(Self::with_services(
            AppServices {
                cdn,
                image,
                converter,
                progress: Box::new(LogProgress),
            },
            config.pipeline,
        ))
    }

    /// Run the full pipeline for one upload.
    ///
    /// Steps are strictly ordered and each failure is terminal; the matching
    /// [`ProgressStage`] is emitted before each step starts. Only one
    /// conversion may be in flight per `App` at a time.
    pub async fn convert(&self, upload: UploadRequest) -> Result<ConversionResult> {
        let _flight = self.begin_flight()?;

        self.progress.on_stage(ProgressStage::Starting);
        info!(
            "Starting conversion ({} bytes, {})",
            upload.size_bytes(),
            upload.mime_type
        );

        let size = upload.size_bytes();
        if size > self.options.max_file_size_bytes {
            return Err(Error::TooLarge {
                size,
                limit: self.options.max_file_size_bytes,
            });
        }

        self.progress.on_stage(ProgressStage::Preparing);
        let resized = self.image.prepare_image(&upload.bytes).await?;
        info!(
            "Resized image to {}x{} ({} bytes)",
            resized.width,
            resized.height,
            resized.bytes.len()
        );

        self.progress.on_stage(ProgressStage::Uploading);
        let staged = self.stage(&resized).await?;
        info!("Staged image at {}", staged.public_url);

        self.progress.on_stage(ProgressStage::WaitingForAvailability);
        self.wait_until_available(&staged.key).await?;

        self.progress.on_stage(ProgressStage::Converting);
        let result = self.request_conversion(&staged.public_url).await?;
        info!("Conversion complete: {}", result.primary_url());

        Ok(result)
    }

    fn begin_flight(&self) -> Result<FlightGuard<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy);
        }
        Ok(FlightGuard {
            flag: &self.in_flight,
        })
    }

    async fn stage(&self, resized: &ResizedImage) -> Result<StagedObject> {
        // Time plus a random component keeps staging keys collision-free
        // across requests.
        let key = format!(
            "uploads/{}-{}.png",
            Utc::now().timestamp_millis(),
            Uuid::new_v4()
        );
        let public_url = self
            .cdn
            .upload_file(&key, &resized.bytes, ResizedImage::CONTENT_TYPE)
            .await?;
        Ok(StagedObject { key, public_url })
    }

    /// Probe the staged object until it is servable, bounded by attempt
    /// count rather than wall-clock time.
    async fn wait_until_available(&self, key: &str) -> Result<()> {
        let attempts = self.options.poll_attempts;
        let retry_strategy =
            FixedInterval::new(self.options.poll_interval).take(attempts.saturating_sub(1));

        Retry::spawn(retry_strategy, move || async move {
            match self.cdn.file_exists(key).await {
                Ok(true) => Ok(()),
                // A miss and a transport hiccup both consume one attempt.
                _ => Err(()),
            }
        })
        .await
        .map_err(|_| Error::AvailabilityTimeout { attempts })
    }

    /// Call the conversion endpoint, retrying exactly once after a
    /// rate-limit signal. A second rate limit is terminal.
    async fn request_conversion(&self, public_url: &str) -> Result<ConversionResult> {
        match self.converter.convert_image(public_url).await {
            Err(Error::RateLimited(message)) => {
                self.progress.on_stage(ProgressStage::RateLimitBackoff);
                warn!(
                    "Conversion endpoint rate limited ({}), retrying in {:?}",
                    message, self.options.rate_limit_backoff
                );
                sleep(self.options.rate_limit_backoff).await;

                match self.converter.convert_image(public_url).await {
                    Err(Error::RateLimited(message)) => Err(Error::Conversion(message)),
                    other => other,
                }
            }
            other => other,
        }
    }
}
