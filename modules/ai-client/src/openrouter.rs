use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use tracing::debug;

use crate::error::{ProviderError, Result};
use crate::traits::{ChatProvider, ProviderId, RawReply};
use crate::wire::{ChatRequest, ChatResponse};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// Client for the OpenRouter chat completions API. One instance is bound to
/// one model id (e.g. a Gemini model for video analysis, a Claude model for
/// articles); construct one per routing role.
pub struct OpenRouterClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
    app_name: Option<String>,
    site_url: Option<String>,
}

impl OpenRouterClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: OPENROUTER_API_URL.to_string(),
            app_name: None,
            site_url: None,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    pub fn with_site_url(mut self, url: &str) -> Self {
        self.site_url = Some(url.to_string());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, "OpenRouter chat request");

        let mut builder = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request);

        // Optional attribution headers OpenRouter uses for ranking.
        if let Some(ref site) = self.site_url {
            if let Ok(val) = HeaderValue::from_str(site) {
                builder = builder.header("HTTP-Referer", val);
            }
        }
        if let Some(ref name) = self.app_name {
            if let Ok(val) = HeaderValue::from_str(name) {
                builder = builder.header("X-Title", val);
            }
        }

        let resp = builder.send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthFailure(status.as_u16()));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "OpenRouter API error ({status}): {message}"
            )));
        }

        let chat: ChatResponse = resp.json().await?;
        chat.into_content().ok_or_else(|| {
            ProviderError::Unavailable("no choices in OpenRouter response".to_string())
        })
    }
}

#[async_trait]
impl ChatProvider for OpenRouterClient {
    async fn invoke(&self, prompt: &str) -> Result<RawReply> {
        let request = ChatRequest::user(&self.model, prompt);
        let text = self.chat(&request).await?;
        Ok(RawReply::new(ProviderId::OpenRouter, text))
    }

    fn id(&self) -> ProviderId {
        ProviderId::OpenRouter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openrouter_new() {
        let client = OpenRouterClient::new("sk-or-test", "anthropic/claude-sonnet-4.5");
        assert_eq!(client.model(), "anthropic/claude-sonnet-4.5");
        assert_eq!(client.base_url, OPENROUTER_API_URL);
    }

    #[test]
    fn test_openrouter_attribution() {
        let client = OpenRouterClient::new("sk-or-test", "google/gemini-3-flash-preview")
            .with_app_name("clipnote")
            .with_site_url("https://example.com");
        assert_eq!(client.app_name.as_deref(), Some("clipnote"));
        assert_eq!(client.site_url.as_deref(), Some("https://example.com"));
    }
}
