// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted article source for deterministic testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use newsbot_core::traits::ArticleSource;
use newsbot_core::types::Article;
use newsbot_core::NewsbotError;

/// What [`MockSource`] does when asked for a topic.
#[derive(Debug, Clone)]
pub enum SourceBehavior {
    /// Return these articles.
    Articles(Vec<Article>),
    /// Return a [`NewsbotError::Source`] with this message.
    Fail(String),
    /// Panic inside the fetch, as a buggy supplier would.
    Panic,
    /// Sleep, then return the articles.
    Delayed(Duration, Vec<Article>),
}

/// An [`ArticleSource`] answering from a per-topic script.
///
/// Topics without a script return an empty list. Every call is logged.
#[derive(Clone, Default)]
pub struct MockSource {
    script: Arc<Mutex<HashMap<String, SourceBehavior>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `topic` to return `articles`.
    pub async fn set_articles(&self, topic: &str, articles: Vec<Article>) {
        self.set_behavior(topic, SourceBehavior::Articles(articles)).await;
    }

    pub async fn set_behavior(&self, topic: &str, behavior: SourceBehavior) {
        self.script.lock().await.insert(topic.to_string(), behavior);
    }

    /// Topics requested so far, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl ArticleSource for MockSource {
    async fn fetch_articles(&self, topic: &str) -> Result<Vec<Article>, NewsbotError> {
        self.calls.lock().await.push(topic.to_string());
        let behavior = self.script.lock().await.get(topic).cloned();
        match behavior {
            None => Ok(Vec::new()),
            Some(SourceBehavior::Articles(articles)) => Ok(articles),
            Some(SourceBehavior::Fail(message)) => Err(NewsbotError::source_msg(message)),
            Some(SourceBehavior::Panic) => panic!("mock source panicked for topic `{topic}`"),
            Some(SourceBehavior::Delayed(delay, articles)) => {
                tokio::time::sleep(delay).await;
                Ok(articles)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::article;

    #[tokio::test]
    async fn scripted_topics_answer_and_are_logged() {
        let source = MockSource::new();
        source.set_articles("rust", vec![article("https://a/1")]).await;
        source
            .set_behavior("go", SourceBehavior::Fail("boom".into()))
            .await;

        assert_eq!(source.fetch_articles("rust").await.unwrap().len(), 1);
        assert!(source.fetch_articles("go").await.is_err());
        assert!(source.fetch_articles("zig").await.unwrap().is_empty());
        assert_eq!(source.calls().await, vec!["rust", "go", "zig"]);
    }
}
