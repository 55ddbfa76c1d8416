//! Shared domain types and configuration for fxdash.

pub mod app_config;
pub mod config;
pub mod news;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use news::{
    completion_ratio, AnalyzedArticle, Article, Direction, NewsReport, Sentiment, SentimentOrigin,
    FALLBACK_ANALYSIS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
