//! Plain-text rendering of a news report.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use fxdash_core::{AnalyzedArticle, NewsReport};
use fxdash_feed::strip_html;

const EXCERPT_CHARS: usize = 240;

pub(crate) fn render_report(report: &NewsReport, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for item in &report.items {
        out.push_str(&render_card(item, now));
        out.push('\n');
    }

    let fallbacks = report.fallback_count();
    let _ = write!(
        out,
        "Sentiment analysis: {:.0}% complete",
        report.completion * 100.0
    );
    if fallbacks > 0 {
        let _ = write!(out, " ({fallbacks} unavailable)");
    }
    out.push('\n');
    out
}

pub(crate) fn render_card(item: &AnalyzedArticle, now: DateTime<Utc>) -> String {
    let article = &item.article;
    let mut out = String::new();

    let badge = match &item.sentiment {
        Some(s) => format!("[{} {:+}%]", s.direction(), s.percent()),
        None => "[pending]".to_string(),
    };
    let _ = writeln!(out, "{badge} {}", article.title);

    let age = article.published_at.map_or_else(
        || {
            if article.pub_date.is_empty() {
                "unknown date".to_string()
            } else {
                article.pub_date.clone()
            }
        },
        |published| relative_age(published, now),
    );
    let _ = writeln!(out, "  {age} | {}", article.link);

    let excerpt = excerpt(&strip_html(&article.content), EXCERPT_CHARS);
    if !excerpt.is_empty() {
        let _ = writeln!(out, "  {excerpt}");
    }

    if let Some(s) = &item.sentiment {
        let _ = writeln!(out, "  > {}", s.analysis);
    }
    out
}

/// Human-readable distance from `published` to `now`, e.g. "3 hours ago".
pub(crate) fn relative_age(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(published);
    if elapsed.num_seconds() < 60 {
        return "less than a minute ago".to_string();
    }
    let (value, unit) = if elapsed.num_minutes() < 60 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_hours() < 24 {
        (elapsed.num_hours(), "hour")
    } else {
        (elapsed.num_days(), "day")
    };
    let plural = if value == 1 { "" } else { "s" };
    format!("{value} {unit}{plural} ago")
}

/// First `max_chars` characters of `text`, cut at a word boundary when possible.
pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let head = &text[..cut];
    let head = head.rfind(' ').map_or(head, |space| &head[..space]);
    format!("{}...", head.trim_end())
}
