use std::env;

/// Application configuration loaded from environment variables.
/// Loaded once at process start; never refreshed mid-request.
#[derive(Debug, Clone)]
pub struct Config {
    // AI providers
    pub xai_api_key: String,
    pub openrouter_api_key: String,

    // Content extraction
    pub reader_base_url: String,
    pub reader_api_key: Option<String>,

    // Model routing (per content type)
    pub thread_model: String,
    pub video_model: String,
    pub article_model: String,

    /// Overall deadline for a single provider call, in seconds.
    pub provider_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            xai_api_key: required_env("XAI_API_KEY"),
            openrouter_api_key: required_env("OPENROUTER_API_KEY"),
            reader_base_url: env::var("READER_BASE_URL")
                .unwrap_or_else(|_| "https://r.jina.ai".to_string()),
            reader_api_key: env::var("READER_API_KEY").ok(),
            thread_model: env::var("THREAD_MODEL").unwrap_or_else(|_| "grok-4-fast".to_string()),
            video_model: env::var("VIDEO_MODEL")
                .unwrap_or_else(|_| "google/gemini-3-flash-preview".to_string()),
            article_model: env::var("ARTICLE_MODEL")
                .unwrap_or_else(|_| "anthropic/claude-sonnet-4.5".to_string()),
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("PROVIDER_TIMEOUT_SECS must be a number"),
        }
    }

    /// Log which credentials are present without exposing their values.
    pub fn log_redacted(&self) {
        tracing::info!(
            xai_key = !self.xai_api_key.is_empty(),
            openrouter_key = !self.openrouter_api_key.is_empty(),
            reader_key = self.reader_api_key.is_some(),
            reader_base_url = %self.reader_base_url,
            thread_model = %self.thread_model,
            video_model = %self.video_model,
            article_model = %self.article_model,
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
