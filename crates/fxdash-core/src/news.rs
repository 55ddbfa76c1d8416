//! Article and sentiment types shared by the pipeline and its consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Analysis text attached to the neutral fallback sentiment.
pub const FALLBACK_ANALYSIS: &str = "unavailable";

/// One `<item>` from the news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Raw `pubDate` text as it appeared in the feed.
    pub pub_date: String,
    /// `pub_date` parsed as RFC 2822 (or RFC 3339). `None` if unparseable.
    pub published_at: Option<DateTime<Utc>>,
    /// `content:encoded` if present, otherwise `description`.
    pub content: String,
}

impl Article {
    /// Build an article, deriving `published_at` from the raw date text.
    #[must_use]
    pub fn new(title: String, link: String, pub_date: String, content: String) -> Self {
        let published_at = parse_pub_date(&pub_date);
        Self {
            title,
            link,
            pub_date,
            published_at,
            content,
        }
    }
}

/// Parse an RSS `pubDate`. Feeds mostly use RFC 2822; a few emit RFC 3339.
#[must_use]
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentOrigin {
    Model,
    Fallback,
}

/// Polarity score in `[-1.0, 1.0]` plus a short explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub score: f64,
    pub analysis: String,
    pub origin: SentimentOrigin,
}

impl Sentiment {
    /// A model-produced sentiment. The score is clamped to `[-1.0, 1.0]`;
    /// a non-finite score collapses to `0.0`.
    #[must_use]
    pub fn from_model(score: f64, analysis: String) -> Self {
        let score = if score.is_finite() {
            score.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        Self {
            score,
            analysis,
            origin: SentimentOrigin::Model,
        }
    }

    /// The neutral placeholder used when annotation fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            score: 0.0,
            analysis: FALLBACK_ANALYSIS.to_string(),
            origin: SentimentOrigin::Fallback,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin == SentimentOrigin::Fallback
    }

    /// Positive is bullish, negative is bearish, and exactly `0.0` (which
    /// includes every fallback) is neutral rather than bearish.
    #[must_use]
    pub fn direction(&self) -> Direction {
        if self.score > 0.0 {
            Direction::Bullish
        } else if self.score < 0.0 {
            Direction::Bearish
        } else {
            Direction::Neutral
        }
    }

    /// Score as a whole percentage, e.g. `0.456` -> `46`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn percent(&self) -> i32 {
        // score is clamped, so the product fits comfortably in i32
        (self.score * 100.0).round() as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Bullish => write!(f, "bullish"),
            Direction::Bearish => write!(f, "bearish"),
            Direction::Neutral => write!(f, "neutral"),
        }
    }
}

/// An article paired with its (optional) sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub sentiment: Option<Sentiment>,
}

impl AnalyzedArticle {
    /// Neutral when no sentiment is attached yet.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.sentiment
            .as_ref()
            .map_or(Direction::Neutral, Sentiment::direction)
    }
}

/// Fraction of `items` that carry a sentiment. `0.0` for an empty slice.
#[must_use]
pub fn completion_ratio(items: &[AnalyzedArticle]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let done = items.iter().filter(|i| i.sentiment.is_some()).count();
    #[allow(clippy::cast_precision_loss)]
    let (done, total) = (done as f64, items.len() as f64);
    done / total
}

/// Result of one pipeline run, ready for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsReport {
    pub items: Vec<AnalyzedArticle>,
    pub completion: f64,
    pub fetched_at: DateTime<Utc>,
}

impl NewsReport {
    #[must_use]
    pub fn new(items: Vec<AnalyzedArticle>, fetched_at: DateTime<Utc>) -> Self {
        let completion = completion_ratio(&items);
        Self {
            items,
            completion,
            fetched_at,
        }
    }

    /// Number of items that fell back to the neutral placeholder.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.sentiment.as_ref().is_some_and(Sentiment::is_fallback))
            .count()
    }
}
