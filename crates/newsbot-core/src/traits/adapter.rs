// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by concrete supplier implementations.

use async_trait::async_trait;

use crate::error::NewsbotError;
use crate::types::{AdapterType, HealthStatus};

/// Identity, health and lifecycle for a concrete supplier.
///
/// The SQLite storage, the news fetcher, the Telegram sink and the
/// Prometheus exporter implement this trait so the binary can run health
/// checks and shut them down uniformly.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the role this adapter plays.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, NewsbotError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), NewsbotError>;
}
