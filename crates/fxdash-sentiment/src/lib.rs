//! Sentiment annotation pipeline for fxdash.
//!
//! Fetches the news feed, parses it into articles, and asks an
//! OpenAI-compatible chat model to score each of the first few articles
//! concurrently. Per-article scoring failures are absorbed as a neutral
//! fallback; only feed fetch or parse failures fail a run.

pub mod annotator;
pub mod error;
pub mod llm;
pub mod pipeline;

mod retry;

pub use annotator::Annotator;
pub use error::{AnnotationError, PipelineError};
pub use llm::{LlmClient, LlmSettings};
pub use pipeline::NewsPipeline;
