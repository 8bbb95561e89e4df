// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for newsbot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level newsbot configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NewsbotConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// News provider settings.
    #[serde(default)]
    pub news: NewsConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fleet scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Per-user delivery engine settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `newsbot serve`.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// News provider configuration.
///
/// GNews is queried first; NewsAPI is the fallback. Either key may be
/// omitted, but `serve` refuses to start without at least one.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NewsConfig {
    #[serde(default)]
    pub gnews_api_key: Option<String>,

    #[serde(default)]
    pub newsapi_api_key: Option<String>,

    /// Article language filter sent to both providers.
    #[serde(default = "default_language")]
    pub language: String,

    /// Country filter sent to GNews.
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_gnews_max_results")]
    pub gnews_max_results: u32,

    #[serde(default = "default_newsapi_page_size")]
    pub newsapi_page_size: u32,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Topic to provider query substitutions, e.g. `"ai" = "artificial intelligence"`.
    #[serde(default)]
    pub query_aliases: BTreeMap<String, String>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            gnews_api_key: None,
            newsapi_api_key: None,
            language: default_language(),
            country: default_country(),
            gnews_max_results: default_gnews_max_results(),
            newsapi_page_size: default_newsapi_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            query_aliases: BTreeMap::new(),
        }
    }
}

impl NewsConfig {
    /// Whether at least one provider key is set.
    pub fn has_any_api_key(&self) -> bool {
        let set = |k: &Option<String>| k.as_deref().is_some_and(|v| !v.trim().is_empty());
        set(&self.gnews_api_key) || set(&self.newsapi_api_key)
    }
}

fn default_language() -> String {
    "ru".to_string()
}

fn default_country() -> String {
    "ru".to_string()
}

fn default_gnews_max_results() -> u32 {
    20
}

fn default_newsapi_page_size() -> u32 {
    10
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("newsbot").join("newsbot.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("newsbot.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Fleet scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Seconds between batch passes.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Upper bound on users processed concurrently within one batch.
    #[serde(default = "default_max_concurrent_users")]
    pub max_concurrent_users: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            max_concurrent_users: default_max_concurrent_users(),
        }
    }
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_max_concurrent_users() -> usize {
    16
}

/// Per-user delivery engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Interval applied when a user's stored interval is zero.
    #[serde(default = "default_interval_minutes")]
    pub default_interval_minutes: u32,

    /// Limit applied when a user's stored limit is zero.
    #[serde(default = "default_news_limit")]
    pub default_news_limit: u32,

    /// Articles published longer ago than this are never delivered.
    #[serde(default = "default_staleness_days")]
    pub staleness_days: u32,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Budget for a user-requested `/news` cycle.
    #[serde(default = "default_on_demand_timeout_secs")]
    pub on_demand_timeout_secs: u64,

    /// Per-user capacity of the in-memory fallback used while the ledger is unavailable.
    #[serde(default = "default_fallback_cache_per_user")]
    pub fallback_cache_per_user: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            default_interval_minutes: default_interval_minutes(),
            default_news_limit: default_news_limit(),
            staleness_days: default_staleness_days(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            send_timeout_secs: default_send_timeout_secs(),
            on_demand_timeout_secs: default_on_demand_timeout_secs(),
            fallback_cache_per_user: default_fallback_cache_per_user(),
        }
    }
}

fn default_interval_minutes() -> u32 {
    60
}

fn default_news_limit() -> u32 {
    5
}

fn default_staleness_days() -> u32 {
    183
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_send_timeout_secs() -> u64 {
    10
}

fn default_on_demand_timeout_secs() -> u64 {
    120
}

fn default_fallback_cache_per_user() -> usize {
    100
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Socket address the scrape endpoint listens on.
    #[serde(default = "default_prometheus_bind_address")]
    pub bind_address: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: default_prometheus_bind_address(),
        }
    }
}

fn default_prometheus_bind_address() -> String {
    "127.0.0.1:9464".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_defaults() {
        let d = DeliveryConfig::default();
        assert_eq!(d.default_interval_minutes, 60);
        assert_eq!(d.default_news_limit, 5);
        assert_eq!(d.staleness_days, 183);
        assert_eq!(d.on_demand_timeout_secs, 120);
        assert_eq!(d.fallback_cache_per_user, 100);
    }

    #[test]
    fn blank_api_keys_do_not_count() {
        let mut news = NewsConfig::default();
        assert!(!news.has_any_api_key());
        news.gnews_api_key = Some("  ".into());
        assert!(!news.has_any_api_key());
        news.newsapi_api_key = Some("key".into());
        assert!(news.has_any_api_key());
    }

    #[test]
    fn query_aliases_deserialize_as_map() {
        let config: NewsbotConfig = toml::from_str(
            r#"
[news.query_aliases]
ai = "artificial intelligence"
"#,
        )
        .expect("should parse");
        assert_eq!(
            config.news.query_aliases.get("ai").map(String::as_str),
            Some("artificial intelligence")
        );
    }
}
