use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("OPENAI_API_KEY", "sk-test");
    m
}

#[test]
fn parse_environment_accepts_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "FXDASH_ENV"));
}

#[test]
fn build_app_config_fails_without_api_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "OPENAI_API_KEY"),
        "expected MissingEnvVar(OPENAI_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_api_key_as_missing() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "OPENAI_API_KEY"),
        "expected MissingEnvVar(OPENAI_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.openai_api_key, "sk-test");
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.feed_url, "https://www.forexlive.com/feed/news/");
    assert_eq!(cfg.cors_relay.as_deref(), Some("https://corsproxy.io/?"));
    assert_eq!(cfg.feed_timeout_secs, 10);
    assert_eq!(
        cfg.feed_user_agent,
        "Mozilla/5.0 (compatible; ForexDashboard/1.0)"
    );
    assert_eq!(cfg.llm_base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.llm_model, "gpt-3.5-turbo");
    assert!((cfg.llm_temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(cfg.llm_max_tokens, 150);
    assert_eq!(cfg.llm_timeout_secs, 30);
    assert_eq!(cfg.analysis_language, "French");
    assert_eq!(cfg.annotate_limit, 10);
    assert_eq!(cfg.refresh_max_retries, 2);
    assert_eq!(cfg.refresh_backoff_base_ms, 1000);
}

#[test]
fn empty_cors_relay_disables_relay() {
    let mut map = full_env();
    map.insert("FXDASH_CORS_RELAY", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.cors_relay.is_none());
}

#[test]
fn cors_relay_override() {
    let mut map = full_env();
    map.insert("FXDASH_CORS_RELAY", "https://relay.example.com/?url=");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.cors_relay.as_deref(),
        Some("https://relay.example.com/?url=")
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("FXDASH_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FXDASH_BIND_ADDR"),
        "expected InvalidEnvVar(FXDASH_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn feed_timeout_override() {
    let mut map = full_env();
    map.insert("FXDASH_FEED_TIMEOUT_SECS", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.feed_timeout_secs, 3);
}

#[test]
fn feed_timeout_invalid() {
    let mut map = full_env();
    map.insert("FXDASH_FEED_TIMEOUT_SECS", "ten");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FXDASH_FEED_TIMEOUT_SECS"),
        "expected InvalidEnvVar(FXDASH_FEED_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn feed_timeout_zero_is_rejected() {
    let mut map = full_env();
    map.insert("FXDASH_FEED_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FXDASH_FEED_TIMEOUT_SECS"),
        "expected InvalidEnvVar(FXDASH_FEED_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn llm_temperature_out_of_range_is_rejected() {
    let mut map = full_env();
    map.insert("FXDASH_LLM_TEMPERATURE", "3.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FXDASH_LLM_TEMPERATURE"),
        "expected InvalidEnvVar(FXDASH_LLM_TEMPERATURE), got: {result:?}"
    );
}

#[test]
fn llm_overrides() {
    let mut map = full_env();
    map.insert("FXDASH_LLM_BASE_URL", "http://localhost:11434/v1");
    map.insert("FXDASH_LLM_MODEL", "llama3");
    map.insert("FXDASH_LLM_TEMPERATURE", "0");
    map.insert("FXDASH_LLM_MAX_TOKENS", "300");
    map.insert("FXDASH_ANALYSIS_LANGUAGE", "English");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.llm_base_url, "http://localhost:11434/v1");
    assert_eq!(cfg.llm_model, "llama3");
    assert!(cfg.llm_temperature.abs() < f32::EPSILON);
    assert_eq!(cfg.llm_max_tokens, 300);
    assert_eq!(cfg.analysis_language, "English");
}

#[test]
fn annotate_limit_zero_is_rejected() {
    let mut map = full_env();
    map.insert("FXDASH_ANNOTATE_LIMIT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FXDASH_ANNOTATE_LIMIT"),
        "expected InvalidEnvVar(FXDASH_ANNOTATE_LIMIT), got: {result:?}"
    );
}

#[test]
fn llm_timeout_zero_is_rejected() {
    let mut map = full_env();
    map.insert("FXDASH_LLM_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FXDASH_LLM_TIMEOUT_SECS"),
        "expected InvalidEnvVar(FXDASH_LLM_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn llm_max_tokens_zero_is_rejected() {
    let mut map = full_env();
    map.insert("FXDASH_LLM_MAX_TOKENS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FXDASH_LLM_MAX_TOKENS"),
        "expected InvalidEnvVar(FXDASH_LLM_MAX_TOKENS), got: {result:?}"
    );
}

#[test]
fn blank_optional_values_fall_back_to_defaults() {
    let mut map = full_env();
    map.insert("FXDASH_FEED_URL", "");
    map.insert("FXDASH_LLM_MODEL", "   ");
    map.insert("FXDASH_FEED_TIMEOUT_SECS", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.feed_url, "https://www.forexlive.com/feed/news/");
    assert_eq!(cfg.llm_model, "gpt-3.5-turbo");
    assert_eq!(cfg.feed_timeout_secs, 10);
}

#[test]
fn refresh_retry_overrides() {
    let mut map = full_env();
    map.insert("FXDASH_REFRESH_MAX_RETRIES", "0");
    map.insert("FXDASH_REFRESH_BACKOFF_BASE_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.refresh_max_retries, 0);
    assert_eq!(cfg.refresh_backoff_base_ms, 250);
}

#[test]
fn refresh_max_retries_invalid() {
    let mut map = full_env();
    map.insert("FXDASH_REFRESH_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FXDASH_REFRESH_MAX_RETRIES"),
        "expected InvalidEnvVar(FXDASH_REFRESH_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_api_key() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-test"), "api key leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}
