// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the operator and the in-process exporter.
//!
//! All metrics carry the namespace prefix `opsupport` and are registered in
//! [`METRICS_REGISTRY`], which the exporter serves at `/metrics`.
//!
//! # Metrics Categories
//!
//! - **Resource Lifecycle Metrics** - Objects created or updated by the bootstrap
//! - **Condition Metrics** - Condition writes and skips decided by the update policy
//! - **Bootstrap Metrics** - Metrics bootstrap failures by reason
//!
//! # Example
//!
//! ```rust,no_run
//! use opsupport::metrics::start_metrics_server;
//!
//! # async fn example() {
//! let handle = start_metrics_server("0.0.0.0:8080".parse().unwrap());
//! # }
//! ```

use crate::constants::{HEALTHZ_PATH, METRICS_PATH};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::LazyLock;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "opsupport";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Resource Lifecycle Metrics
// ============================================================================

/// Total number of resources created
///
/// Labels:
/// - `resource_type`: Kind of resource created
pub static RESOURCES_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_created_total"),
        "Total number of resources created by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of resources updated after an `AlreadyExists` conflict
///
/// Labels:
/// - `resource_type`: Kind of resource updated
pub static RESOURCES_UPDATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_updated_total"),
        "Total number of resources updated by type",
    );
    let counter = CounterVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Condition Metrics
// ============================================================================

/// Total number of condition set attempts by outcome
///
/// Labels:
/// - `condition_type`: Condition type (e.g., `Ready`)
/// - `outcome`: `updated` or `skipped`
pub static CONDITION_UPDATES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_condition_updates_total"),
        "Total number of condition set attempts by condition type and outcome",
    );
    let counter = CounterVec::new(opts, &["condition_type", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Bootstrap Metrics
// ============================================================================

/// Total number of metrics bootstrap failures
///
/// Labels:
/// - `reason`: Failure reason (e.g., `FailedCreateService`)
pub static BOOTSTRAP_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_bootstrap_errors_total"),
        "Total number of metrics bootstrap failures by reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record resource creation
pub fn record_resource_created(resource_type: &str) {
    RESOURCES_CREATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record resource update
pub fn record_resource_updated(resource_type: &str) {
    RESOURCES_UPDATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record a condition that was written
pub fn record_condition_updated(condition_type: &str) {
    CONDITION_UPDATES_TOTAL
        .with_label_values(&[condition_type, "updated"])
        .inc();
}

/// Record a condition write skipped by the update policy
pub fn record_condition_skipped(condition_type: &str) {
    CONDITION_UPDATES_TOTAL
        .with_label_values(&[condition_type, "skipped"])
        .inc();
}

/// Record a metrics bootstrap failure
///
/// # Arguments
/// * `reason` - `CamelCase` reason code of the failure
pub fn record_bootstrap_error(reason: &str) {
    BOOTSTRAP_ERRORS_TOTAL.with_label_values(&[reason]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

// ============================================================================
// Exporter
// ============================================================================

/// Router serving `/metrics` and `/healthz`.
pub fn metrics_router() -> Router {
    Router::new()
        .route(METRICS_PATH, get(metrics_handler))
        .route(HEALTHZ_PATH, get(|| async { "ok" }))
}

async fn metrics_handler() -> Response {
    match gather_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve the metrics router on an already-bound listener until the server stops.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve_metrics(listener: TcpListener) -> std::io::Result<()> {
    axum::serve(listener, metrics_router()).await
}

/// Start the metrics exporter on a background task.
///
/// Fire-and-forget: bind and serve failures are logged from the task and never
/// reach the caller.
pub fn start_metrics_server(addr: SocketAddr) -> JoinHandle<()> {
    tokio::spawn(async move {
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind metrics server on {}: {}", addr, e);
                return;
            }
        };
        info!("Metrics server listening on {}", addr);

        if let Err(e) = serve_metrics(listener).await {
            error!("Metrics server on {} stopped: {}", addr, e);
        }
    })
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
