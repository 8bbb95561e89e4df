// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `newsbot serve` command implementation.
//!
//! Wires storage, the news fetcher and the Telegram sink into a delivery
//! engine, starts the fleet scheduler and runs the Telegram dispatcher until
//! a shutdown signal arrives.

use std::sync::Arc;

use newsbot_config::model::NewsbotConfig;
use newsbot_core::{NewsbotError, PluginAdapter};
use newsbot_delivery::{
    DeliveryEngine, DeliverySettings, FleetScheduler, NewsDesk, SeenCache, Suppliers,
    install_signal_handler,
};
use newsbot_fetcher::NewsFetcher;
use newsbot_storage::SqliteStorage;
use newsbot_telegram::{BotContext, RecentArticles, TelegramSink, run_bot};
use tracing::{info, warn};

/// Runs the bot until SIGINT/SIGTERM.
pub async fn run_serve(config: NewsbotConfig) -> Result<(), NewsbotError> {
    init_tracing(&config.bot.log_level);

    newsbot_config::validate_for_serve(&config).map_err(|errors| {
        newsbot_config::render_errors(&errors);
        NewsbotError::Config(format!("{} configuration error(s)", errors.len()))
    })?;

    info!("starting newsbot serve");

    let storage = Arc::new(SqliteStorage::open(&config.storage).await?);
    let fetcher = Arc::new(NewsFetcher::from_config(&config.news)?);
    let recent = Arc::new(RecentArticles::default());
    let sink = Arc::new(TelegramSink::new(&config.telegram, recent.clone())?);

    #[cfg(feature = "prometheus")]
    let _prometheus = if config.prometheus.enabled {
        Some(newsbot_prometheus::PrometheusAdapter::install(
            &config.prometheus.bind_address,
        )?)
    } else {
        None
    };

    let suppliers = Suppliers {
        source: fetcher.clone(),
        ledger: storage.clone(),
        subscriptions: storage.clone(),
        users: storage.clone(),
        favorites: storage.clone(),
        sink: sink.clone(),
    };
    let cache = Arc::new(SeenCache::new(config.delivery.fallback_cache_per_user));
    let engine = Arc::new(DeliveryEngine::new(
        suppliers,
        cache,
        DeliverySettings::from_config(&config.delivery),
    ));
    let scheduler = FleetScheduler::from_config(engine.clone(), &config.scheduler);

    let ctx = Arc::new(BotContext {
        service: Arc::new(NewsDesk::new(engine)),
        users: storage.clone(),
        subscriptions: storage.clone(),
        recent,
        default_news_limit: config.delivery.default_news_limit,
    });

    let cancel = install_signal_handler();
    scheduler.start()?;

    run_bot(sink.bot().clone(), ctx, cancel.clone()).await;

    cancel.cancel();
    scheduler.stop().await;

    if let Err(e) = storage.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }
    if let Err(e) = fetcher.shutdown().await {
        warn!(error = %e, "news fetcher shutdown failed");
    }

    info!("newsbot serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("newsbot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
