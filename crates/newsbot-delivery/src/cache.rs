// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory fallback for the seen-article ledger.
//!
//! [`SeenCache`] is consulted only when a ledger read fails and written only
//! when a ledger write fails. It is not authoritative: its contents are lost
//! on restart, and a user's segment is dropped wholesale once it reaches
//! capacity.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use newsbot_core::types::UserId;
use tracing::debug;

/// Per-user bounded sets of article URLs.
#[derive(Debug)]
pub struct SeenCache {
    entries: DashMap<UserId, HashSet<String>>,
    per_user_capacity: usize,
    fallback_writes: AtomicU64,
}

impl SeenCache {
    /// Creates a cache holding at most `per_user_capacity` URLs per user.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(per_user_capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            per_user_capacity: per_user_capacity.max(1),
            fallback_writes: AtomicU64::new(0),
        }
    }

    pub fn contains(&self, user_id: UserId, url: &str) -> bool {
        self.entries
            .get(&user_id)
            .is_some_and(|urls| urls.contains(url))
    }

    /// Records `url` for `user_id`. Returns `true` if it was not present.
    ///
    /// When the user's segment is full it is cleared before inserting.
    pub fn insert(&self, user_id: UserId, url: &str) -> bool {
        self.fallback_writes.fetch_add(1, Ordering::Relaxed);
        let mut urls = self.entries.entry(user_id).or_default();
        if urls.contains(url) {
            return false;
        }
        if urls.len() >= self.per_user_capacity {
            debug!(user_id = %user_id, dropped = urls.len(), "seen cache segment full, clearing");
            urls.clear();
        }
        urls.insert(url.to_string())
    }

    pub fn clear_user(&self, user_id: UserId) {
        self.entries.remove(&user_id);
    }

    /// Number of URLs cached for `user_id`.
    pub fn len_for(&self, user_id: UserId) -> usize {
        self.entries.get(&user_id).map_or(0, |urls| urls.len())
    }

    /// Total writes absorbed since startup.
    pub fn fallback_writes(&self) -> u64 {
        self.fallback_writes.load(Ordering::Relaxed)
    }
}

impl Default for SeenCache {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_contains() {
        let cache = SeenCache::new(10);
        assert!(!cache.contains(UserId(1), "https://a/1"));
        assert!(cache.insert(UserId(1), "https://a/1"));
        assert!(!cache.insert(UserId(1), "https://a/1"));
        assert!(cache.contains(UserId(1), "https://a/1"));
        assert!(!cache.contains(UserId(2), "https://a/1"));
        assert_eq!(cache.fallback_writes(), 2);
    }

    #[test]
    fn overflow_clears_only_that_user() {
        let cache = SeenCache::new(2);
        cache.insert(UserId(1), "a");
        cache.insert(UserId(1), "b");
        cache.insert(UserId(2), "z");

        cache.insert(UserId(1), "c");

        assert_eq!(cache.len_for(UserId(1)), 1);
        assert!(cache.contains(UserId(1), "c"));
        assert!(!cache.contains(UserId(1), "a"));
        assert!(cache.contains(UserId(2), "z"));
    }

    #[test]
    fn clear_user_drops_segment() {
        let cache = SeenCache::default();
        cache.insert(UserId(7), "x");
        cache.clear_user(UserId(7));
        assert!(!cache.contains(UserId(7), "x"));
        assert_eq!(cache.len_for(UserId(7)), 0);
    }

    #[test]
    fn zero_capacity_still_holds_one() {
        let cache = SeenCache::new(0);
        cache.insert(UserId(1), "a");
        assert!(cache.contains(UserId(1), "a"));
        cache.insert(UserId(1), "b");
        assert!(!cache.contains(UserId(1), "a"));
        assert!(cache.contains(UserId(1), "b"));
    }
}
