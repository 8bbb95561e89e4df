// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for newsbot.
//!
//! [`TelegramSink`] delivers articles as HTML messages with a favorites
//! button. [`handler::run_bot`] runs the long-polling command dispatcher.

pub mod commands;
pub mod format;
pub mod handler;
pub mod recent;

use std::sync::Arc;

use async_trait::async_trait;
use newsbot_config::model::TelegramConfig;
use newsbot_core::NewsbotError;
use newsbot_core::traits::{DeliverySink, PluginAdapter};
use newsbot_core::types::{AdapterType, Article, ChatId, HealthStatus};
use teloxide::prelude::*;
use tracing::debug;

pub use commands::{BotContext, Command, Reply};
pub use handler::run_bot;
pub use recent::RecentArticles;

/// Delivers articles to Telegram chats.
pub struct TelegramSink {
    bot: Bot,
    recent: Arc<RecentArticles>,
}

impl TelegramSink {
    /// Creates a sink from `[telegram]` config.
    ///
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: &TelegramConfig, recent: Arc<RecentArticles>) -> Result<Self, NewsbotError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            NewsbotError::Config("telegram.bot_token is required for Telegram delivery".into())
        })?;

        if token.trim().is_empty() {
            return Err(NewsbotError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            bot: Bot::new(token),
            recent,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn recent(&self) -> &Arc<RecentArticles> {
        &self.recent
    }
}

#[async_trait]
impl DeliverySink for TelegramSink {
    async fn deliver(&self, chat_id: ChatId, article: &Article) -> Result<(), NewsbotError> {
        handler::send_article(
            &self.bot,
            &self.recent,
            teloxide::types::ChatId(chat_id.0),
            article,
        )
        .await
        .map_err(|e| NewsbotError::Channel {
            message: format!("failed to send article to {chat_id}: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(chat_id = %chat_id, url = %article.url, "article delivered");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, NewsbotError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), NewsbotError> {
        debug!("Telegram sink shutting down");
        Ok(())
    }
}
