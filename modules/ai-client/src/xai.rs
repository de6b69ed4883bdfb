use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ProviderError, Result};
use crate::traits::{ChatProvider, ProviderId, RawReply};
use crate::wire::{ChatRequest, ChatResponse};

const XAI_API_URL: &str = "https://api.x.ai/v1";

/// Client for the xAI chat completions API (Grok model family).
pub struct XaiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
}

impl XaiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: XAI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, "xAI chat request");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthFailure(status.as_u16()));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "xAI API error ({status}): {message}"
            )));
        }

        let chat: ChatResponse = resp.json().await?;
        chat.into_content()
            .ok_or_else(|| ProviderError::Unavailable("no choices in xAI response".to_string()))
    }
}

#[async_trait]
impl ChatProvider for XaiClient {
    async fn invoke(&self, prompt: &str) -> Result<RawReply> {
        let request = ChatRequest::user(&self.model, prompt);
        let text = self.chat(&request).await?;
        Ok(RawReply::new(ProviderId::Xai, text))
    }

    fn id(&self) -> ProviderId {
        ProviderId::Xai
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xai_new() {
        let client = XaiClient::new("xai-test", "grok-4-fast");
        assert_eq!(client.model(), "grok-4-fast");
        assert_eq!(client.base_url, XAI_API_URL);
    }

    #[test]
    fn test_xai_with_base_url() {
        let client = XaiClient::new("xai-test", "grok-4-fast").with_base_url("http://localhost:9/");
        assert_eq!(client.base_url, "http://localhost:9");
    }
}
