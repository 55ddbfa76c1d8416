//! Concurrent per-article sentiment annotation.

use futures::future::join_all;
use fxdash_core::{AnalyzedArticle, Article, Sentiment};

use crate::llm::LlmClient;

/// Scores the leading articles of a feed concurrently.
pub struct Annotator {
    llm: LlmClient,
    limit: usize,
}

impl Annotator {
    /// `limit` is clamped to at least 1.
    #[must_use]
    pub fn new(llm: LlmClient, limit: usize) -> Self {
        Self {
            llm,
            limit: limit.max(1),
        }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Annotate the first `limit` articles; any further articles are dropped.
    ///
    /// All requests are issued at once and joined. Each article that cannot
    /// be scored gets [`Sentiment::fallback`], so the output always has
    /// `min(articles.len(), limit)` entries, in input order, every one of
    /// them carrying a sentiment.
    pub async fn annotate(&self, articles: Vec<Article>) -> Vec<AnalyzedArticle> {
        let total = articles.len();
        if total > self.limit {
            tracing::debug!(
                total,
                limit = self.limit,
                dropped = total - self.limit,
                "truncating feed before annotation"
            );
        }

        let tasks = articles
            .into_iter()
            .take(self.limit)
            .map(|article| self.annotate_one(article));
        let annotated = join_all(tasks).await;

        let fallbacks = annotated
            .iter()
            .filter(|a| a.sentiment.as_ref().is_some_and(Sentiment::is_fallback))
            .count();
        tracing::info!(
            annotated = annotated.len(),
            fallbacks,
            "sentiment annotation finished"
        );

        annotated
    }

    async fn annotate_one(&self, article: Article) -> AnalyzedArticle {
        let sentiment = match self.llm.score(&article).await {
            Ok(sentiment) => sentiment,
            Err(e) => {
                tracing::warn!(
                    link = %article.link,
                    error = %e,
                    "sentiment analysis failed; using neutral fallback"
                );
                Sentiment::fallback()
            }
        };

        AnalyzedArticle {
            article,
            sentiment: Some(sentiment),
        }
    }
}
