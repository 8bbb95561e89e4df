// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `newsbot check` command implementation.
//!
//! Validates the loaded configuration and runs adapter health checks so an
//! operator can see what `serve` would trip over before starting the bot.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::{Duration, Instant};

use newsbot_config::model::NewsbotConfig;
use newsbot_core::{HealthStatus, NewsbotError, PluginAdapter};
use newsbot_fetcher::NewsFetcher;
use newsbot_telegram::{RecentArticles, TelegramSink};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }

    fn from_health(name: &str, health: Result<HealthStatus, NewsbotError>, start: Instant) -> Self {
        match health {
            Ok(HealthStatus::Healthy) => Self::new(name, CheckStatus::Pass, "healthy", start),
            Ok(HealthStatus::Degraded(reason)) => Self::new(name, CheckStatus::Warn, reason, start),
            Ok(HealthStatus::Unhealthy(reason)) => Self::new(name, CheckStatus::Fail, reason, start),
            Err(e) => Self::new(name, CheckStatus::Fail, e.to_string(), start),
        }
    }
}

/// Run the `newsbot check` command.
///
/// Returns an error when at least one check failed so the process exits
/// non-zero. With `--deep`, contacts the Telegram API and reports allocator
/// statistics. With `--plain`, disables colored output.
pub async fn run_check(config: &NewsbotConfig, deep: bool, plain: bool) -> Result<(), NewsbotError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let mut results = vec![
        check_config(config),
        check_database(&config.storage.database_path).await,
        check_news_source(config).await,
    ];
    if deep {
        results.push(check_telegram(config).await);
        results.push(check_memory_baseline());
    }

    println!();
    println!("  newsbot check");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();

    let failures = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let warnings = results
        .iter()
        .filter(|r| r.status == CheckStatus::Warn)
        .count();

    if failures + warnings == 0 {
        println!("  All checks passed.");
    } else {
        let issues = failures + warnings;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !deep {
            println!("  Run with --deep to contact Telegram.");
        }
    }
    println!();

    if failures > 0 {
        return Err(NewsbotError::Internal(format!("{failures} check(s) failed")));
    }
    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Checks the settings `serve` requires on top of structural validation.
fn check_config(config: &NewsbotConfig) -> CheckResult {
    let start = Instant::now();
    match newsbot_config::validate_for_serve(config) {
        Ok(()) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => {
            let detail = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            CheckResult::new("Configuration", CheckStatus::Fail, detail, start)
        }
    }
}

/// Check the database file exists and answers queries.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !std::path::Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };

    let verdict = conn
        .call(|conn| conn.query_row("PRAGMA quick_check", [], |row| row.get::<_, String>(0)))
        .await;
    match verdict {
        Ok(v) if v == "ok" => CheckResult::new("Database", CheckStatus::Pass, "connected", start),
        Ok(v) => CheckResult::new("Database", CheckStatus::Fail, format!("integrity: {v}"), start),
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start),
    }
}

async fn check_news_source(config: &NewsbotConfig) -> CheckResult {
    let start = Instant::now();
    match NewsFetcher::from_config(&config.news) {
        Ok(fetcher) => CheckResult::from_health("News API", fetcher.health_check().await, start),
        Err(e) => CheckResult::new("News API", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Calls `getMe` with the configured token.
async fn check_telegram(config: &NewsbotConfig) -> CheckResult {
    let start = Instant::now();
    match TelegramSink::new(&config.telegram, Arc::new(RecentArticles::default())) {
        Ok(sink) => CheckResult::from_health("Telegram", sink.health_check().await, start),
        Err(e) => CheckResult::new("Telegram", CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_memory_baseline() -> CheckResult {
    let start = Instant::now();

    #[cfg(not(target_env = "msvc"))]
    {
        let _ = tikv_jemalloc_ctl::epoch::advance();
        let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
        let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
        let allocated_mb = allocated as f64 / (1024.0 * 1024.0);
        let resident_mb = resident as f64 / (1024.0 * 1024.0);
        CheckResult::new(
            "Memory baseline",
            CheckStatus::Pass,
            format!("heap: {allocated_mb:.1} MB, resident: {resident_mb:.1} MB"),
            start,
        )
    }

    #[cfg(target_env = "msvc")]
    {
        CheckResult::new(
            "Memory baseline",
            CheckStatus::Warn,
            "jemalloc not available on MSVC",
            start,
        )
    }
}
