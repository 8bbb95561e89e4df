// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics. Without an installed recorder every call is a no-op.

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Register all newsbot metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "newsbot_articles_delivered_total",
        "Articles handed to the delivery sink"
    );
    describe_counter!(
        "newsbot_delivery_failures_total",
        "Articles the delivery sink failed to send"
    );
    describe_counter!(
        "newsbot_source_failures_total",
        "Article source calls that failed or timed out"
    );
    describe_counter!(
        "newsbot_fallback_cache_writes_total",
        "Seen-article writes served by the in-memory cache after a ledger failure"
    );
    describe_gauge!("newsbot_batch_users", "Users visited by the last batch pass");
    describe_histogram!(
        "newsbot_batch_duration_seconds",
        "Wall-clock duration of a scheduler batch pass"
    );
}

/// Record articles delivered in one cycle.
pub fn record_delivered(count: u64) {
    metrics::counter!("newsbot_articles_delivered_total").increment(count);
}

/// Record a failed delivery.
pub fn record_delivery_failure() {
    metrics::counter!("newsbot_delivery_failures_total").increment(1);
}

/// Record a failed or timed-out source call, labelled by reason.
pub fn record_source_failure(reason: &'static str) {
    metrics::counter!("newsbot_source_failures_total", "reason" => reason).increment(1);
}

/// Record a seen-article write absorbed by the fallback cache.
pub fn record_fallback_write() {
    metrics::counter!("newsbot_fallback_cache_writes_total").increment(1);
}

/// Record a completed batch pass.
pub fn record_batch(users: usize, seconds: f64) {
    metrics::gauge!("newsbot_batch_users").set(users as f64);
    metrics::histogram!("newsbot_batch_duration_seconds").record(seconds);
}
