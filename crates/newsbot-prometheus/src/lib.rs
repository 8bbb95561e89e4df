// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics adapter for newsbot.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The exporter
//! serves the text format over HTTP on the configured bind address.

pub mod recording;

use std::net::SocketAddr;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use newsbot_core::traits::PluginAdapter;
use newsbot_core::types::{AdapterType, HealthStatus};
use newsbot_core::NewsbotError;

pub use recording::{
    record_batch, record_delivered, record_delivery_failure, record_fallback_write,
    record_source_failure, register_metrics,
};

/// Prometheus metrics adapter.
///
/// Installs the Prometheus recorder globally and spawns its HTTP listener on
/// the current tokio runtime.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
    bind_address: SocketAddr,
}

impl PrometheusAdapter {
    /// Installs the recorder and starts serving `/metrics` on `bind_address`.
    ///
    /// Only one recorder can be installed per process. Must be called from
    /// inside a tokio runtime.
    pub fn install(bind_address: &str) -> Result<Self, NewsbotError> {
        let addr: SocketAddr = bind_address.parse().map_err(|e| {
            NewsbotError::Config(format!("invalid prometheus bind_address `{bind_address}`: {e}"))
        })?;

        let (recorder, exporter) = PrometheusBuilder::new()
            .with_http_listener(addr)
            .build()
            .map_err(|e| {
                NewsbotError::Internal(format!("failed to build Prometheus exporter: {e}"))
            })?;
        let handle = recorder.handle();
        metrics::set_global_recorder(recorder).map_err(|e| {
            NewsbotError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        tokio::spawn(async move {
            if let Err(e) = exporter.await {
                tracing::error!(error = ?e, "prometheus exporter stopped");
            }
        });

        recording::register_metrics();
        tracing::info!(addr = %addr, "prometheus metrics exporter listening");

        Ok(Self {
            handle,
            bind_address: addr,
        })
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
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

    #[tokio::test]
    async fn invalid_bind_address_is_config_error() {
        // Fails before any recorder is installed.
        let err = PrometheusAdapter::install("not an address")
            .err()
            .expect("parse must fail");
        assert!(matches!(err, NewsbotError::Config(_)));
    }
}
