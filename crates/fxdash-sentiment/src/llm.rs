//! Chat-completion client used to score article sentiment.

use std::time::Duration;

use fxdash_core::{AppConfig, Article, Sentiment};
use fxdash_feed::strip_html;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Language the model writes its analysis in.
    pub analysis_language: String,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("analysis_language", &self.analysis_language)
            .finish()
    }
}

impl LlmSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.llm_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout_secs: config.llm_timeout_secs,
            analysis_language: config.analysis_language.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// The JSON object the model is instructed to return.
#[derive(Debug, Deserialize)]
struct SentimentReply {
    score: f64,
    analysis: String,
}

/// HTTP client for the chat-completions API.
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl LlmClient {
    /// Create a new `LlmClient`.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: LlmSettings) -> Result<Self, AnnotationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                settings.base_url.trim_end_matches('/')
            ),
            system_prompt: system_prompt(&settings.analysis_language),
            api_key: settings.api_key,
            model: settings.model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    /// Ask the model for the sentiment of one article.
    ///
    /// # Errors
    ///
    /// - [`AnnotationError::Http`] on network failure or timeout.
    /// - [`AnnotationError::UnexpectedStatus`] for a non-2xx response.
    /// - [`AnnotationError::Decode`] if the response envelope is not valid JSON.
    /// - [`AnnotationError::EmptyResponse`] if the model returned no text.
    /// - [`AnnotationError::MalformedReply`] if the text is not the expected JSON object.
    pub async fn score(&self, article: &Article) -> Result<Sentiment, AnnotationError> {
        let user_message = user_message(article);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_message,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AnnotationError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let envelope: ChatResponse = serde_json::from_str(&body).map_err(AnnotationError::Decode)?;
        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AnnotationError::EmptyResponse)?;

        parse_reply(&content)
    }
}

fn system_prompt(language: &str) -> String {
    format!(
        "Analyze the following forex news. Return only a JSON object with two fields: \
         \"score\", a number between -1 and 1 where -1 is very bearish and 1 is very bullish, \
         and \"analysis\", a brief analysis in {language}."
    )
}

/// Title on the first line, HTML-stripped content after it.
fn user_message(article: &Article) -> String {
    format!("{}\n{}", article.title, strip_html(&article.content))
}

/// Parse the model's text reply into a [`Sentiment`].
///
/// A surrounding Markdown code fence (```` ```json ... ``` ````) is tolerated.
fn parse_reply(content: &str) -> Result<Sentiment, AnnotationError> {
    let json = strip_code_fence(content.trim());
    let reply: SentimentReply =
        serde_json::from_str(json).map_err(|source| AnnotationError::MalformedReply {
            reply: truncate(content, 200),
            source,
        })?;
    Ok(Sentiment::from_model(reply.score, reply.analysis.trim().to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // drop the info string, e.g. "json"
    match inner.split_once('\n') {
        Some((info, rest)) if !info.trim_start().starts_with('{') => rest.trim(),
        _ => inner.trim(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use fxdash_core::SentimentOrigin;

    use super::*;

    #[test]
    fn parses_plain_json_reply() {
        let s = parse_reply(r#"{"score": 0.6, "analysis": "Le dollar se renforce."}"#)
            .expect("reply should parse");
        assert!((s.score - 0.6).abs() < f64::EPSILON);
        assert_eq!(s.analysis, "Le dollar se renforce.");
        assert_eq!(s.origin, SentimentOrigin::Model);
    }

    #[test]
    fn parses_fenced_json_reply() {
        let reply = "```json\n{\"score\": -0.4, \"analysis\": \"Baissier\"}\n```";
        let s = parse_reply(reply).expect("fenced reply should parse");
        assert!((s.score + 0.4).abs() < f64::EPSILON);
        assert_eq!(s.analysis, "Baissier");
    }

    #[test]
    fn clamps_out_of_range_score() {
        let s = parse_reply(r#"{"score": 2.5, "analysis": "Très haussier"}"#).unwrap();
        assert!((s.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_json_reply() {
        let err = parse_reply("The news is bullish.").unwrap_err();
        assert!(matches!(err, AnnotationError::MalformedReply { .. }));
    }

    #[test]
    fn rejects_reply_missing_fields() {
        let err = parse_reply(r#"{"score": 0.1}"#).unwrap_err();
        assert!(matches!(err, AnnotationError::MalformedReply { .. }));
    }

    #[test]
    fn user_message_has_title_then_plain_content() {
        let article = Article::new(
            "GBP slips".to_string(),
            "https://example.com/gbp".to_string(),
            String::new(),
            "<p>Sterling <b>falls</b> after CPI.</p>".to_string(),
        );
        assert_eq!(user_message(&article), "GBP slips\nSterling falls after CPI.");
    }

    #[test]
    fn system_prompt_names_language() {
        let prompt = system_prompt("French");
        assert!(prompt.contains("brief analysis in French"));
        assert!(prompt.contains("\"score\""));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééééé", 3), "ééé...");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn settings_debug_redacts_api_key() {
        let settings = LlmSettings {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: "sk-secret".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 150,
            timeout_secs: 30,
            analysis_language: "French".to_string(),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("sk-secret"));
    }
}
