// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring batch driver for the whole user population.
//!
//! The [`FleetScheduler`] moves through `NotStarted -> Running -> Stopped`.
//! While running it wakes on a fixed tick and runs one batch pass, fanning
//! users out to their own tasks behind a semaphore.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use newsbot_config::model::SchedulerConfig;
use newsbot_core::NewsbotError;
use newsbot_core::types::UserId;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::DeliveryEngine;

const NOT_STARTED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle state of a [`FleetScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    NotStarted,
    Running,
    Stopped,
}

impl SchedulerState {
    fn from_u8(value: u8) -> Self {
        match value {
            RUNNING => Self::Running,
            STOPPED => Self::Stopped,
            _ => Self::NotStarted,
        }
    }
}

/// Outcome of one batch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Users visited.
    pub users: usize,
    /// Fresh articles found across all users, before each user's cap.
    pub fresh: usize,
    /// Users whose cycle panicked or was aborted.
    pub failed_users: usize,
}

/// Drives delivery cycles for every user on a fixed interval.
pub struct FleetScheduler {
    engine: Arc<DeliveryEngine>,
    tick: Duration,
    max_concurrent_users: usize,
    state: AtomicU8,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl FleetScheduler {
    pub fn new(engine: Arc<DeliveryEngine>, tick: Duration, max_concurrent_users: usize) -> Self {
        Self {
            engine,
            tick: tick.max(Duration::from_millis(1)),
            max_concurrent_users: max_concurrent_users.max(1),
            state: AtomicU8::new(NOT_STARTED),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    pub fn from_config(engine: Arc<DeliveryEngine>, config: &SchedulerConfig) -> Self {
        Self::new(
            engine,
            Duration::from_secs(config.tick_interval_secs),
            config.max_concurrent_users,
        )
    }

    pub fn state(&self) -> SchedulerState {
        SchedulerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Starts the periodic loop on the current tokio runtime.
    ///
    /// The first pass runs one full tick after start. Fails with
    /// [`NewsbotError::Lifecycle`] unless the scheduler was never started.
    pub fn start(&self) -> Result<(), NewsbotError> {
        if let Err(current) =
            self.state
                .compare_exchange(NOT_STARTED, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
        {
            return Err(NewsbotError::Lifecycle(format!(
                "scheduler cannot start from state {:?}",
                SchedulerState::from_u8(current)
            )));
        }

        let engine = Arc::clone(&self.engine);
        let cancel = self.cancel.clone();
        let tick = self.tick;
        let max_concurrent = self.max_concurrent_users;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the first immediate tick.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let report = run_pass(&engine, max_concurrent).await;
                        debug!(
                            users = report.users,
                            fresh = report.fresh,
                            failed = report.failed_users,
                            "batch pass finished"
                        );
                    }
                    _ = cancel.cancelled() => {
                        info!("scheduler loop shutting down");
                        break;
                    }
                }
            }
        });

        *self.task.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        info!(
            tick_secs = self.tick.as_secs(),
            max_concurrent_users = self.max_concurrent_users,
            "scheduler started"
        );
        Ok(())
    }

    /// Stops the loop and waits for an in-flight batch to finish.
    ///
    /// Returns `false` without doing anything when the scheduler is not running.
    pub async fn stop(&self) -> bool {
        if let Err(current) =
            self.state
                .compare_exchange(RUNNING, STOPPED, Ordering::SeqCst, Ordering::SeqCst)
        {
            info!(
                state = ?SchedulerState::from_u8(current),
                "scheduler stop ignored, not running"
            );
            return false;
        }

        self.cancel.cancel();
        let handle = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            error!(error = %e, "scheduler loop ended abnormally");
        }
        info!("scheduler stopped");
        true
    }

    /// Runs a single batch pass immediately, independent of the loop.
    pub async fn run_batch(&self) -> BatchReport {
        run_pass(&self.engine, self.max_concurrent_users).await
    }
}

/// One pass over every user, at most `max_concurrent` cycles at a time.
async fn run_pass(engine: &Arc<DeliveryEngine>, max_concurrent: usize) -> BatchReport {
    let started = Instant::now();
    let users = match engine.suppliers().users.list_users().await {
        Ok(users) => users,
        Err(e) => {
            warn!(error = %e, "failed to list users, skipping batch");
            return BatchReport::default();
        }
    };

    let mut report = BatchReport {
        users: users.len(),
        ..BatchReport::default()
    };
    let semaphore = Arc::new(Semaphore::new(max_concurrent));
    let mut tasks = JoinSet::new();
    let mut owners: HashMap<tokio::task::Id, UserId> = HashMap::new();

    for user in users {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let engine = Arc::clone(engine);
        let user_id = user.id;
        let handle = tasks.spawn(async move {
            let _permit = permit;
            engine.process_user(&user, false).await
        });
        owners.insert(handle.id(), user_id);
    }

    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, fresh)) => report.fresh += fresh,
            Err(e) => {
                report.failed_users += 1;
                let user_id = owners.get(&e.id()).copied();
                if e.is_panic() {
                    error!(user_id = ?user_id, "delivery cycle panicked");
                } else {
                    warn!(user_id = ?user_id, error = %e, "delivery cycle aborted");
                }
            }
        }
    }

    let elapsed = started.elapsed();
    #[cfg(feature = "prometheus")]
    newsbot_prometheus::record_batch(report.users, elapsed.as_secs_f64());
    info!(
        users = report.users,
        fresh = report.fresh,
        failed = report.failed_users,
        elapsed_ms = elapsed.as_millis() as u64,
        "batch pass complete"
    );
    report
}
