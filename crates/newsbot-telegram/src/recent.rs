// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded lookup from callback short ids back to delivered articles.

use dashmap::DashMap;
use newsbot_core::types::Article;
use tracing::debug;

use crate::format::short_id;

/// Recently delivered articles keyed by [`short_id`] of their URL.
///
/// Once `capacity` entries are held the map is cleared before the next insert,
/// so buttons on old messages may stop resolving.
#[derive(Debug)]
pub struct RecentArticles {
    entries: DashMap<String, Article>,
    capacity: usize,
}

impl RecentArticles {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Stores `article` and returns its short id.
    pub fn remember(&self, article: &Article) -> String {
        let id = short_id(&article.url);
        if !self.entries.contains_key(&id) && self.entries.len() >= self.capacity {
            debug!(dropped = self.entries.len(), "recent article map full, clearing");
            self.entries.clear();
        }
        self.entries.insert(id.clone(), article.clone());
        id
    }

    pub fn resolve(&self, id: &str) -> Option<Article> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RecentArticles {
    fn default() -> Self {
        Self::new(1000)
    }
}
