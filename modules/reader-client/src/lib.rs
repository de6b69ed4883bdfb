pub mod error;

pub use error::{ReaderError, Result};

use std::time::Duration;

use tracing::debug;

/// Client for a Jina-Reader-style extraction service: `GET {base}/{url}`
/// returns the page's main content as plain text/markdown.
pub struct ReaderClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ReaderClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(String::from),
        }
    }

    /// Fetch extracted main content for a URL.
    pub async fn content(&self, url: &str) -> Result<String> {
        let endpoint = format!("{}/{}", self.base_url, url);

        let mut req = self.client.get(&endpoint);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ReaderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        debug!(url, bytes = text.len(), "Reader content fetched");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ReaderClient::new("https://r.jina.ai/", None);
        assert_eq!(client.base_url, "https://r.jina.ai");
    }
}
