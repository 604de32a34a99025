use super::ConversionService;
use crate::models::ConversionResult;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum ScriptedResponse {
    Success(Vec<String>),
    RateLimited(String),
    Failure(String),
    Invalid,
}

/// Scripted stand-in for the conversion endpoint.
///
/// Responses queue up in call order; once the script is exhausted every
/// further call succeeds with a default result URL.
#[derive(Clone)]
pub struct MockConvertClient {
    script: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    call_count: Arc<Mutex<usize>>,
    requested_urls: Arc<Mutex<Vec<String>>>,
}

impl MockConvertClient {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            requested_urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_success(self, urls: &[&str]) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::Success(
                urls.iter().map(|u| u.to_string()).collect(),
            ));
        self
    }

    pub fn with_rate_limit(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::RateLimited(message.to_string()));
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::Failure(message.to_string()));
        self
    }

    pub fn with_invalid_response(self) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedResponse::Invalid);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_requested_urls(&self) -> Vec<String> {
        self.requested_urls.lock().unwrap().clone()
    }
}

impl Default for MockConvertClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversionService for MockConvertClient {
    async fn convert_image(&self, image_url: &str) -> Result<ConversionResult> {
        *self.call_count.lock().unwrap() += 1;
        self.requested_urls
            .lock()
            .unwrap()
            .push(image_url.to_string());

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            None => Ok(ConversionResult {
                output_urls: vec!["https://mock-converter.example.com/result.png".to_string()],
            }),
            Some(ScriptedResponse::Success(urls)) => Ok(ConversionResult { output_urls: urls }),
            Some(ScriptedResponse::RateLimited(message)) => Err(Error::RateLimited(message)),
            Some(ScriptedResponse::Failure(message)) => Err(Error::Conversion(message)),
            Some(ScriptedResponse::Invalid) => Err(Error::InvalidResponse(
                "response carries no output URLs".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_convert_default_success() {
        let client = MockConvertClient::new();

        let result = client
            .convert_image("https://cdn.test/uploads/a.png")
            .await
            .unwrap();

        assert_eq!(
            result.primary_url(),
            "https://mock-converter.example.com/result.png"
        );
        assert_eq!(client.get_call_count(), 1);
        assert_eq!(
            client.get_requested_urls(),
            vec!["https://cdn.test/uploads/a.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_mock_convert_scripted_sequence() {
        let client = MockConvertClient::new()
            .with_rate_limit("slow down")
            .with_success(&["https://host/result.png"]);

        let first = client.convert_image("https://cdn.test/a.png").await;
        assert!(matches!(first, Err(Error::RateLimited(ref m)) if m == "slow down"));

        let second = client
            .convert_image("https://cdn.test/a.png")
            .await
            .unwrap();
        assert_eq!(second.primary_url(), "https://host/result.png");
        assert_eq!(client.get_call_count(), 2);
    }
}
