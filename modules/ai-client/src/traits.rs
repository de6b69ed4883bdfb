use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderId {
    Xai,
    OpenRouter,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Xai => "xai",
            ProviderId::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw reply from a chat provider. The text stays opaque until parsed
/// downstream; providers are not contractually bound to return valid JSON.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub provider: ProviderId,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl RawReply {
    pub fn new(provider: ProviderId, text: impl Into<String>) -> Self {
        Self {
            provider,
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// A chat-completion provider that turns one prompt into one raw reply.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<RawReply>;
    fn id(&self) -> ProviderId;
}
