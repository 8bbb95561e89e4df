// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording delivery sink for deterministic testing.
//!
//! `RecordingSink` captures every successful delivery for assertion and can
//! be told to fail for specific URLs, for every delivery, or to stall.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use newsbot_core::traits::{DeliverySink, PluginAdapter};
use newsbot_core::types::{AdapterType, Article, ChatId, HealthStatus};
use newsbot_core::NewsbotError;

#[derive(Default)]
struct SinkState {
    delivered: Vec<(ChatId, Article)>,
    failing_urls: HashSet<String>,
    fail_all: bool,
    delay: Option<Duration>,
    attempts: usize,
}

/// A [`DeliverySink`] that records deliveries instead of sending them.
#[derive(Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<SinkState>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries of `url` fail with a channel error.
    pub async fn fail_url(&self, url: &str) {
        self.state.lock().await.failing_urls.insert(url.to_string());
    }

    /// Every delivery fails with a channel error.
    pub async fn fail_all(&self, fail: bool) {
        self.state.lock().await.fail_all = fail;
    }

    /// Every delivery sleeps for `delay` first.
    pub async fn set_delay(&self, delay: Duration) {
        self.state.lock().await.delay = Some(delay);
    }

    /// Successful deliveries in order.
    pub async fn delivered(&self) -> Vec<(ChatId, Article)> {
        self.state.lock().await.delivered.clone()
    }

    /// URLs successfully delivered to `chat_id`, in order.
    pub async fn urls_for(&self, chat_id: ChatId) -> Vec<String> {
        self.state
            .lock()
            .await
            .delivered
            .iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, a)| a.url.clone())
            .collect()
    }

    /// Deliveries attempted, including failed ones.
    pub async fn attempts(&self) -> usize {
        self.state.lock().await.attempts
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn deliver(&self, chat_id: ChatId, article: &Article) -> Result<(), NewsbotError> {
        let delay = {
            let mut state = self.state.lock().await;
            state.attempts += 1;
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        if state.fail_all || state.failing_urls.contains(&article.url) {
            return Err(NewsbotError::channel_msg(format!(
                "mock delivery of {} failed",
                article.url
            )));
        }
        state.delivered.push((chat_id, article.clone()));
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for RecordingSink {
    fn name(&self) -> &str {
        "recording-sink"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, NewsbotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), NewsbotError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::article;

    #[tokio::test]
    async fn records_successes_and_counts_failures() {
        let sink = RecordingSink::new();
        sink.fail_url("https://a/bad").await;

        sink.deliver(ChatId(1), &article("https://a/ok")).await.unwrap();
        assert!(sink.deliver(ChatId(1), &article("https://a/bad")).await.is_err());

        assert_eq!(sink.urls_for(ChatId(1)).await, vec!["https://a/ok"]);
        assert_eq!(sink.attempts().await, 2);
    }
}
