use super::ConversionService;
use crate::models::{ConversionResult, ConvertRequest, ConvertResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub struct ConvertClient {
    client: Client,
    endpoint: String,
}

impl ConvertClient {
    pub fn new(endpoint: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30)) // 30 second timeout
            .build()
            .expect("Failed to build HTTP client");

        Self::new_with_client(endpoint, client)
    }

    pub fn new_with_client(endpoint: String, client: Client) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl ConversionService for ConvertClient {
    async fn convert_image(&self, image_url: &str) -> Result<ConversionResult> {
        tracing::debug!("Requesting conversion for {}", image_url);

        let request = ConvertRequest {
            image_url: image_url.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach conversion endpoint: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;
        // Error bodies are not guaranteed to be JSON; fall back to an empty
        // payload rather than masking the status code.
        let payload: ConvertResponse = serde_json::from_str(&body).unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let message = payload
                .error
                .unwrap_or_else(|| "Rate limit exceeded".to_string());
            tracing::warn!("Conversion endpoint rate limited: {}", message);
            return Err(Error::RateLimited(message));
        }

        if !status.is_success() {
            let message = payload
                .error
                .unwrap_or_else(|| "Failed to convert image".to_string());
            tracing::error!("Conversion API error (status {}): {}", status, message);
            return Err(Error::Conversion(message));
        }

        let output = payload.output.unwrap_or_default();
        if output.is_empty() {
            return Err(Error::InvalidResponse(
                "response carries no output URLs".to_string(),
            ));
        }

        Ok(ConversionResult {
            output_urls: output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const IMAGE_URL: &str = "https://cdn.test/uploads/photo.png";

    fn client_for(server: &MockServer) -> ConvertClient {
        ConvertClient::new(format!("{}/api/convert", server.uri()))
    }

    #[tokio::test]
    async fn test_convert_image_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .and(body_json(serde_json::json!({ "imageUrl": IMAGE_URL })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "output": ["https://host/result.png", "https://host/alt.png"]
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).convert_image(IMAGE_URL).await.unwrap();

        assert_eq!(result.primary_url(), "https://host/result.png");
        assert_eq!(result.output_urls.len(), 2);
    }

    #[tokio::test]
    async fn test_convert_image_empty_output_is_invalid() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "output": [] })),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).convert_image(IMAGE_URL).await;

        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_convert_image_malformed_payload_is_invalid() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let result = client_for(&server).convert_image(IMAGE_URL).await;

        assert!(matches!(result, Err(Error::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_convert_image_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(serde_json::json!({ "error": "Too many requests" })),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).convert_image(IMAGE_URL).await;

        assert!(matches!(result, Err(Error::RateLimited(ref m)) if m == "Too many requests"));
    }

    #[tokio::test]
    async fn test_convert_image_failure_surfaces_endpoint_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "error": "model exploded" })),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).convert_image(IMAGE_URL).await;

        assert!(matches!(result, Err(Error::Conversion(ref m)) if m == "model exploded"));
    }

    #[tokio::test]
    async fn test_convert_image_failure_without_body_uses_generic_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let result = client_for(&server).convert_image(IMAGE_URL).await;

        assert!(matches!(result, Err(Error::Conversion(ref m)) if m == "Failed to convert image"));
    }
}
