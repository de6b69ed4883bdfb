//! Content fetching with bounded retry, over a reader-style extraction
//! service. Used for article bodies and (best-effort) thread text.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use ai_client::util::truncate_to_char_boundary;
use clipnote_common::{Content, FetchError};
use reader_client::{ReaderClient, ReaderError};

/// Max attempts per fetch, counting the first.
const MAX_ATTEMPTS: u32 = 3;

/// Backoff before retry N is BASE * 2^(N-1): 1s then 2s. Jitter-free.
const RETRY_BASE: Duration = Duration::from_secs(1);

/// Per-kind character caps bound downstream prompt size.
const ARTICLE_MAX_CHARS: usize = 30_000;
const THREAD_MAX_CHARS: usize = 8_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Article,
    Thread,
}

impl ContentKind {
    fn max_len(self) -> usize {
        match self {
            ContentKind::Article => ARTICLE_MAX_CHARS,
            ContentKind::Thread => THREAD_MAX_CHARS,
        }
    }
}

/// Seam over the content-extraction service so tests can script responses.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn content(&self, url: &str) -> reader_client::Result<String>;
}

#[async_trait]
impl ContentSource for ReaderClient {
    async fn content(&self, url: &str) -> reader_client::Result<String> {
        ReaderClient::content(self, url).await
    }
}

pub struct Fetcher<S> {
    source: S,
}

impl<S: ContentSource> Fetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch content with up to three attempts. Only transient failures
    /// (rate limiting, timeouts, network errors) are retried; a well-formed
    /// error response such as a 404 surfaces immediately.
    pub async fn fetch(&self, url: &str, kind: ContentKind) -> Result<Content, FetchError> {
        let mut last: Option<FetchError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let backoff = RETRY_BASE * 2u32.pow(attempt - 1);
                warn!(
                    url,
                    attempt = attempt + 1,
                    backoff_secs = backoff.as_secs(),
                    "Retrying content fetch after backoff"
                );
                tokio::time::sleep(backoff).await;
            }

            match self.source.content(url).await {
                Ok(text) => {
                    let max = kind.max_len();
                    let truncated = text.len() > max;
                    let text = truncate_to_char_boundary(&text, max).to_string();
                    debug!(url, bytes = text.len(), truncated, "Content fetched");
                    return Ok(Content { text, truncated });
                }
                Err(err) if is_transient(&err) => {
                    last = Some(to_fetch_error(err));
                }
                Err(err) => return Err(to_fetch_error(err)),
            }
        }

        let last = last.map(|e| e.to_string()).unwrap_or_default();
        Err(FetchError::Exhausted(last))
    }
}

fn is_transient(err: &ReaderError) -> bool {
    match err {
        ReaderError::Timeout | ReaderError::Network(_) => true,
        ReaderError::Api { status, .. } => *status == 429,
    }
}

fn to_fetch_error(err: ReaderError) -> FetchError {
    match err {
        ReaderError::Timeout => FetchError::Timeout,
        ReaderError::Network(msg) => FetchError::Upstream(msg),
        ReaderError::Api { status: 404, .. } => FetchError::NotFound,
        ReaderError::Api { status: 429, .. } => FetchError::RateLimited,
        ReaderError::Api { status, message } => {
            FetchError::Upstream(format!("status {status}: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Scripted source: pops one canned response per attempt.
    struct ScriptedSource {
        responses: Mutex<VecDeque<reader_client::Result<String>>>,
        attempts: AtomicU32,
    }

    impl ScriptedSource {
        fn new(responses: Vec<reader_client::Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                attempts: AtomicU32::new(0),
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentSource for ScriptedSource {
        async fn content(&self, _url: &str) -> reader_client::Result<String> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn rate_limited() -> ReaderError {
        ReaderError::Api {
            status: 429,
            message: "slow down".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_then_success_after_two_backoffs() {
        let source = ScriptedSource::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Ok("hello".to_string()),
        ]);
        let fetcher = Fetcher::new(source);

        let started = tokio::time::Instant::now();
        let content = fetcher
            .fetch("https://example.com/a", ContentKind::Article)
            .await
            .unwrap();

        assert_eq!(content.text, "hello");
        assert!(!content.truncated);
        assert_eq!(fetcher.source.attempts(), 3);
        // Waits were exactly 1s then 2s.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_after_three_transient_failures() {
        let source = ScriptedSource::new(vec![
            Err(rate_limited()),
            Err(ReaderError::Timeout),
            Err(rate_limited()),
        ]);
        let fetcher = Fetcher::new(source);

        let err = fetcher
            .fetch("https://example.com/a", ContentKind::Article)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Exhausted(_)));
        assert_eq!(fetcher.source.attempts(), 3);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let source = ScriptedSource::new(vec![Err(ReaderError::Api {
            status: 404,
            message: "gone".to_string(),
        })]);
        let fetcher = Fetcher::new(source);

        let err = fetcher
            .fetch("https://example.com/missing", ContentKind::Article)
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::NotFound);
        assert_eq!(fetcher.source.attempts(), 1);
    }

    #[tokio::test]
    async fn thread_content_is_truncated_at_cap() {
        let long = "x".repeat(THREAD_MAX_CHARS + 100);
        let source = ScriptedSource::new(vec![Ok(long)]);
        let fetcher = Fetcher::new(source);

        let content = fetcher
            .fetch("https://x.com/a/status/1", ContentKind::Thread)
            .await
            .unwrap();

        assert!(content.truncated);
        assert_eq!(content.text.len(), THREAD_MAX_CHARS);
    }
}
