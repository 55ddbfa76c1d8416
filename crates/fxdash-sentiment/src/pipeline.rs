//! News pipeline orchestration.

use chrono::Utc;
use fxdash_core::{AppConfig, NewsReport};
use fxdash_feed::{parse_feed, FeedClient};

use crate::annotator::Annotator;
use crate::error::PipelineError;
use crate::llm::{LlmClient, LlmSettings};
use crate::retry::retry_with_backoff;

/// Fetch → parse → annotate, producing a [`NewsReport`].
pub struct NewsPipeline {
    feed: FeedClient,
    annotator: Annotator,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl NewsPipeline {
    /// Builds a pipeline with retries disabled. See [`NewsPipeline::with_retry`].
    #[must_use]
    pub fn new(feed: FeedClient, annotator: Annotator) -> Self {
        Self {
            feed,
            annotator,
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    /// Sets the retry policy used by [`NewsPipeline::run_with_retry`].
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Builds the feed client, LLM client and retry policy from [`AppConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Setup`] if either HTTP client cannot be built
    /// or the feed URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let feed = FeedClient::from_config(config)
            .map_err(|e| PipelineError::Setup(format!("feed client: {e}")))?;
        let llm = LlmClient::new(LlmSettings::from_config(config))
            .map_err(|e| PipelineError::Setup(format!("LLM client: {e}")))?;
        let annotator = Annotator::new(llm, config.annotate_limit);

        Ok(Self::new(feed, annotator)
            .with_retry(config.refresh_max_retries, config.refresh_backoff_base_ms))
    }

    /// Run the full pipeline once.
    ///
    /// 1. Fetch the raw feed.
    /// 2. Parse it into articles (feed order).
    /// 3. Annotate the leading articles concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Fetch`] or [`PipelineError::Parse`]; no
    /// articles are produced in either case. Annotation failures never fail
    /// the run.
    pub async fn run(&self) -> Result<NewsReport, PipelineError> {
        let body = self.feed.fetch().await.map_err(|e| {
            tracing::error!(url = %self.feed.url(), error = %e, "news feed fetch failed");
            PipelineError::Fetch(e)
        })?;

        let articles = parse_feed(&body).map_err(|e| {
            tracing::error!(url = %self.feed.url(), error = %e, "news feed parse failed");
            PipelineError::Parse(e)
        })?;
        tracing::info!(
            count = articles.len(),
            limit = self.annotator.limit(),
            "news feed parsed"
        );

        let items = self.annotator.annotate(articles).await;
        Ok(NewsReport::new(items, Utc::now()))
    }

    /// Run the pipeline, retrying transient fetch failures with back-off.
    ///
    /// # Errors
    ///
    /// Returns the last [`PipelineError`] once retries are exhausted, or the
    /// first non-transient one.
    pub async fn run_with_retry(&self) -> Result<NewsReport, PipelineError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || self.run()).await
    }
}
