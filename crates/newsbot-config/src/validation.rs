// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: non-empty paths, positive
//! intervals and limits, parseable socket addresses.

use std::net::SocketAddr;

use crate::diagnostic::ConfigError;
use crate::model::NewsbotConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing on the first one.
pub fn validate_config(config: &NewsbotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let positive = [
        ("scheduler.tick_interval_secs", config.scheduler.tick_interval_secs),
        (
            "scheduler.max_concurrent_users",
            config.scheduler.max_concurrent_users as u64,
        ),
        (
            "delivery.default_interval_minutes",
            u64::from(config.delivery.default_interval_minutes),
        ),
        (
            "delivery.default_news_limit",
            u64::from(config.delivery.default_news_limit),
        ),
        ("delivery.staleness_days", u64::from(config.delivery.staleness_days)),
        ("delivery.fetch_timeout_secs", config.delivery.fetch_timeout_secs),
        ("delivery.send_timeout_secs", config.delivery.send_timeout_secs),
        (
            "delivery.on_demand_timeout_secs",
            config.delivery.on_demand_timeout_secs,
        ),
        (
            "delivery.fallback_cache_per_user",
            config.delivery.fallback_cache_per_user as u64,
        ),
        ("news.request_timeout_secs", config.news.request_timeout_secs),
        ("news.gnews_max_results", u64::from(config.news.gnews_max_results)),
        ("news.newsapi_page_size", u64::from(config.news.newsapi_page_size)),
    ];
    for (key, value) in positive {
        if value == 0 {
            errors.push(ConfigError::validation(format!(
                "{key} must be at least 1, got 0"
            )));
        }
    }

    if config.prometheus.enabled
        && config.prometheus.bind_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ConfigError::validation(format!(
            "prometheus.bind_address `{}` is not a valid socket address",
            config.prometheus.bind_address
        )));
    }

    for (topic, query) in &config.news.query_aliases {
        if query.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "news.query_aliases.{topic} must not be empty"
            )));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Additional checks required before the bot can serve users.
pub fn validate_for_serve(config: &NewsbotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config
        .telegram
        .bot_token
        .as_deref()
        .is_none_or(|t| t.trim().is_empty())
    {
        errors.push(ConfigError::MissingKey {
            key: "telegram.bot_token".to_string(),
        });
    }

    if !config.news.has_any_api_key() {
        errors.push(ConfigError::validation(
            "at least one of news.gnews_api_key or news.newsapi_api_key must be set",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&NewsbotConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = NewsbotConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn all_zero_values_are_reported_together() {
        let mut config = NewsbotConfig::default();
        config.scheduler.tick_interval_secs = 0;
        config.scheduler.max_concurrent_users = 0;
        config.delivery.staleness_days = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_message(&errors, "tick_interval_secs"));
        assert!(has_message(&errors, "max_concurrent_users"));
        assert!(has_message(&errors, "staleness_days"));
    }

    #[test]
    fn bad_prometheus_address_only_checked_when_enabled() {
        let mut config = NewsbotConfig::default();
        config.prometheus.bind_address = "not an address".to_string();
        assert!(validate_config(&config).is_ok());

        config.prometheus.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "prometheus.bind_address"));
    }

    #[test]
    fn serve_requires_token_and_a_news_key() {
        let config = NewsbotConfig::default();
        let errors = validate_for_serve(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::MissingKey { key } if key == "telegram.bot_token"))
        );

        let mut config = NewsbotConfig::default();
        config.telegram.bot_token = Some("123:ABC".into());
        config.news.newsapi_api_key = Some("key".into());
        assert!(validate_for_serve(&config).is_ok());
    }
}
