// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./newsbot.toml` > `~/.config/newsbot/newsbot.toml` > `/etc/newsbot/newsbot.toml`
//! with environment variable overrides via `NEWSBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::NewsbotConfig;

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/newsbot/newsbot.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "newsbot.toml";

/// Top-level sections an environment variable may address.
const SECTIONS: &[&str] = &[
    "bot",
    "telegram",
    "news",
    "storage",
    "scheduler",
    "delivery",
    "prometheus",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("newsbot/newsbot.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/newsbot/newsbot.toml` (system-wide)
/// 3. `~/.config/newsbot/newsbot.toml` (user XDG config)
/// 4. `./newsbot.toml` (local directory)
/// 5. `NEWSBOT_*` environment variables
pub fn load_config() -> Result<NewsbotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<NewsbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NewsbotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NewsbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NewsbotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(NewsbotConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Maps a prefix-stripped, lowercased env var name to a dotted config key.
///
/// Only the first `_` after a known section name is a separator, so
/// `telegram_bot_token` becomes `telegram.bot_token` and
/// `delivery_default_news_limit` becomes `delivery.default_news_limit`.
pub fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
            .filter(|r| !r.is_empty())
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("NEWSBOT_").map(|key| env_key_to_path(key.as_str()).into())
}
