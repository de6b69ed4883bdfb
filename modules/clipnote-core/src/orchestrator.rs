//! Top-level analysis pipeline: classify, fetch, route, invoke providers,
//! parse, merge, linkify. One `analyze` call per user request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use ai_client::{ChatProvider, OpenRouterClient, ProviderError, XaiClient};
use clipnote_common::{
    AttrValue, ClassifiedRequest, Config, ContentType, Summary, ATTR_VIDEO_URL,
};
use reader_client::ReaderClient;

use crate::classify::{classify, extract_url_from_text, find_embedded_refs};
use crate::error::OrchestratorError;
use crate::fetch::{ContentKind, ContentSource, Fetcher};
use crate::linkify::linkify_summary;
use crate::merge::merge;
use crate::parse::{parse, AnalysisFailure, ParseOutcome};
use crate::prompt;
use crate::route::{route, ExecutionPlan, ProviderRole};

pub struct Orchestrator<S> {
    thread_provider: Arc<dyn ChatProvider>,
    video_provider: Arc<dyn ChatProvider>,
    article_provider: Arc<dyn ChatProvider>,
    fetcher: Fetcher<S>,
    /// Hard deadline per provider call, enforced locally on top of the
    /// clients' own HTTP timeouts.
    call_deadline: Duration,
}

impl Orchestrator<ReaderClient> {
    pub fn from_config(config: &Config) -> Self {
        let reader = ReaderClient::new(&config.reader_base_url, config.reader_api_key.as_deref());
        Self::new(
            Arc::new(XaiClient::new(&config.xai_api_key, &config.thread_model)),
            Arc::new(
                OpenRouterClient::new(&config.openrouter_api_key, &config.video_model)
                    .with_app_name("clipnote"),
            ),
            Arc::new(
                OpenRouterClient::new(&config.openrouter_api_key, &config.article_model)
                    .with_app_name("clipnote"),
            ),
            Fetcher::new(reader),
            Duration::from_secs(config.provider_timeout_secs),
        )
    }
}

impl<S: ContentSource> Orchestrator<S> {
    pub fn new(
        thread_provider: Arc<dyn ChatProvider>,
        video_provider: Arc<dyn ChatProvider>,
        article_provider: Arc<dyn ChatProvider>,
        fetcher: Fetcher<S>,
        call_deadline: Duration,
    ) -> Self {
        Self {
            thread_provider,
            video_provider,
            article_provider,
            fetcher,
            call_deadline,
        }
    }

    /// Run a full analysis of a URL or freeform text.
    pub async fn analyze(&self, input: &str) -> Result<Summary, OrchestratorError> {
        // Text like "summarize https://..." classifies by its first URL.
        let subject = extract_url_from_text(input).unwrap_or(input);
        let mut req = classify(subject);

        info!(
            content_type = %req.content_type,
            url = %req.normalized_url,
            "Analyzing request"
        );

        // Thread bodies are fetched up front: they feed the prompt and
        // reveal embedded links that upgrade the plan to a dual analysis.
        // Fetch failure here only narrows the plan, never fails the run.
        let mut thread_body = None;
        if req.content_type == ContentType::ThreadPost {
            match self
                .fetcher
                .fetch(&req.normalized_url, ContentKind::Thread)
                .await
            {
                Ok(content) => {
                    req.embedded_refs = find_embedded_refs(&content.text, req.content_type);
                    thread_body = Some(content.text);
                }
                Err(err) => {
                    warn!(%err, url = %req.normalized_url, "Thread body fetch failed; continuing without it");
                }
            }
        }

        match route(&req) {
            ExecutionPlan::Single(role) => self.run_single(&req, role, thread_body).await,
            ExecutionPlan::Dual {
                primary,
                secondary,
                video_url,
                priority,
            } => {
                let primary_prompt = prompt::thread_prompt(&req.normalized_url, thread_body.as_deref());
                let secondary_prompt = prompt::video_prompt(&video_url);

                let (primary_outcome, secondary_outcome) = tokio::join!(
                    self.invoke_outcome(primary, &primary_prompt),
                    self.invoke_outcome(secondary, &secondary_prompt),
                );

                let mut summary = merge(primary_outcome, secondary_outcome, priority)?;
                summary.extra_attributes.insert(
                    ATTR_VIDEO_URL.to_string(),
                    AttrValue::Text(video_url.clone()),
                );
                linkify_summary(&mut summary, &video_url);
                Ok(summary)
            }
        }
    }

    async fn run_single(
        &self,
        req: &ClassifiedRequest,
        role: ProviderRole,
        thread_body: Option<String>,
    ) -> Result<Summary, OrchestratorError> {
        let prompt = match role {
            ProviderRole::Thread => {
                prompt::thread_prompt(&req.normalized_url, thread_body.as_deref())
            }
            ProviderRole::Video => prompt::video_prompt(&req.normalized_url),
            ProviderRole::Article => {
                let content = self
                    .fetcher
                    .fetch(&req.normalized_url, ContentKind::Article)
                    .await?;
                prompt::article_prompt(&req.normalized_url, &content)
            }
            // For freeform text the "URL" is the topic itself.
            ProviderRole::Topic => prompt::topic_prompt(&req.normalized_url),
        };

        let outcome = self.invoke_outcome(role, &prompt).await;
        let mut fragment = match outcome.into_result() {
            Ok(fragment) => fragment,
            Err(AnalysisFailure::Timeout) => {
                return Err(OrchestratorError::Provider(ProviderError::Timeout))
            }
            Err(AnalysisFailure::Provider(msg)) => {
                return Err(OrchestratorError::Provider(ProviderError::Unavailable(msg)))
            }
            Err(failure) => return Err(OrchestratorError::Parse(failure)),
        };

        // A topic brief without its own title falls back to the topic text.
        if role == ProviderRole::Topic && fragment.title.is_none() {
            fragment.title = Some(req.normalized_url.clone());
        }

        let mut summary = fragment.finish();
        if role == ProviderRole::Video {
            summary.extra_attributes.insert(
                ATTR_VIDEO_URL.to_string(),
                AttrValue::Text(req.normalized_url.clone()),
            );
            linkify_summary(&mut summary, &req.normalized_url);
        }
        Ok(summary)
    }

    /// One provider call, deadline-bounded, reduced to a ParseOutcome so the
    /// merge layer sees a uniform shape for successes and failures alike.
    async fn invoke_outcome(&self, role: ProviderRole, prompt: &str) -> ParseOutcome {
        let provider = self.provider(role);
        match tokio::time::timeout(self.call_deadline, provider.invoke(prompt)).await {
            Ok(Ok(reply)) => parse(&reply, prompt::expected_fields(role)),
            Ok(Err(ProviderError::Timeout)) => ParseOutcome::Failed(AnalysisFailure::Timeout),
            Ok(Err(err)) => {
                warn!(provider = %provider.id(), %err, "Provider call failed");
                ParseOutcome::Failed(AnalysisFailure::Provider(err.to_string()))
            }
            Err(_) => {
                warn!(provider = %provider.id(), "Provider call exceeded deadline");
                ParseOutcome::Failed(AnalysisFailure::Timeout)
            }
        }
    }

    fn provider(&self, role: ProviderRole) -> &Arc<dyn ChatProvider> {
        match role {
            ProviderRole::Thread => &self.thread_provider,
            ProviderRole::Video => &self.video_provider,
            // Topic research rides the article model.
            ProviderRole::Article | ProviderRole::Topic => &self.article_provider,
        }
    }
}
