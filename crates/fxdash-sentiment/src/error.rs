use fxdash_feed::{FetchError, ParseError};
use thiserror::Error;

/// Failure scoring a single article. Never escapes the annotator: every
/// variant is logged and replaced by the fallback sentiment.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("LLM response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("empty response from LLM")]
    EmptyResponse,

    #[error("malformed sentiment reply {reply:?}: {source}")]
    MalformedReply {
        reply: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Terminal failure of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch news: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to parse news feed: {0}")]
    Parse(#[from] ParseError),

    #[error("pipeline setup failed: {0}")]
    Setup(String),
}
