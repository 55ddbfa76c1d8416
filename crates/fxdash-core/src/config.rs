use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the process environment so tests
/// can drive this with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    // Blank values fall back to the default, same as unset ones.
    let or_default = |var: &str, default: &str| -> String {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => v,
            _ => default.to_string(),
        }
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let openai_api_key = require("OPENAI_API_KEY")?;

    let env = parse_environment(&or_default("FXDASH_ENV", "development"))?;
    let bind_addr = parse_addr("FXDASH_BIND_ADDR", "127.0.0.1:3000")?;
    let log_level = or_default("FXDASH_LOG_LEVEL", "info");

    let feed_url = or_default("FXDASH_FEED_URL", "https://www.forexlive.com/feed/news/");
    // An explicitly empty relay means "request the feed directly".
    let cors_relay = Some(
        lookup("FXDASH_CORS_RELAY").unwrap_or_else(|_| "https://corsproxy.io/?".to_string()),
    )
    .filter(|relay| !relay.trim().is_empty());
    let feed_timeout_secs = ensure_nonzero(
        "FXDASH_FEED_TIMEOUT_SECS",
        parse_u64("FXDASH_FEED_TIMEOUT_SECS", "10")?,
    )?;
    let feed_user_agent = or_default(
        "FXDASH_FEED_USER_AGENT",
        "Mozilla/5.0 (compatible; ForexDashboard/1.0)",
    );

    let llm_base_url = or_default("FXDASH_LLM_BASE_URL", "https://api.openai.com/v1");
    let llm_model = or_default("FXDASH_LLM_MODEL", "gpt-3.5-turbo");
    let llm_temperature = parse_temperature(&or_default("FXDASH_LLM_TEMPERATURE", "0.7"))?;
    let llm_max_tokens = ensure_nonzero(
        "FXDASH_LLM_MAX_TOKENS",
        parse_u32("FXDASH_LLM_MAX_TOKENS", "150")?,
    )?;
    let llm_timeout_secs = ensure_nonzero(
        "FXDASH_LLM_TIMEOUT_SECS",
        parse_u64("FXDASH_LLM_TIMEOUT_SECS", "30")?,
    )?;
    let analysis_language = or_default("FXDASH_ANALYSIS_LANGUAGE", "French");

    let annotate_limit = ensure_nonzero(
        "FXDASH_ANNOTATE_LIMIT",
        parse_usize("FXDASH_ANNOTATE_LIMIT", "10")?,
    )?;

    let refresh_max_retries = parse_u32("FXDASH_REFRESH_MAX_RETRIES", "2")?;
    let refresh_backoff_base_ms = parse_u64("FXDASH_REFRESH_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        openai_api_key,
        feed_url,
        cors_relay,
        feed_timeout_secs,
        feed_user_agent,
        llm_base_url,
        llm_model,
        llm_temperature,
        llm_max_tokens,
        llm_timeout_secs,
        analysis_language,
        annotate_limit,
        refresh_max_retries,
        refresh_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FXDASH_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn ensure_nonzero<T: Default + PartialEq>(var: &str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

/// Sampling temperature must be a finite value in `[0.0, 2.0]`.
fn parse_temperature(raw: &str) -> Result<f32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "FXDASH_LLM_TEMPERATURE".to_string(),
        reason,
    };
    let value = raw.parse::<f32>().map_err(|e| invalid(e.to_string()))?;
    if !value.is_finite() || !(0.0..=2.0).contains(&value) {
        return Err(invalid(format!("{value} is outside 0.0..=2.0")));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
