// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use kube::Client;
use opsupport::bootstrap::configure_metrics;
use opsupport::config::{MetricsConfig, OperatorIdentity};
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("opsupport")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Initialize logging with custom format
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Respects RUST_LOG_FORMAT environment variable for output format (json or text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting operator metrics bootstrap");

    let identity = OperatorIdentity::from_env().context("Failed to resolve operator identity")?;
    let config = MetricsConfig::from_env().context("Failed to read metrics configuration")?;
    debug!(
        operator = %identity.name,
        namespace = %identity.namespace,
        "Resolved operator identity"
    );

    let kube_config = kube::Config::infer()
        .await
        .context("Failed to infer Kubernetes client configuration")?;
    info!(
        cluster = %kube_config.cluster_url,
        default_namespace = %kube_config.default_namespace,
        "Connecting to Kubernetes API"
    );
    let client = Client::try_from(kube_config).context("Failed to create Kubernetes client")?;

    let report = match configure_metrics(client, identity, config).await {
        Ok(report) => report,
        Err(e) => {
            if e.is_retryable() {
                warn!("Metrics bootstrap failed with a transient error, restart to retry");
            }
            return Err(e).context("Metrics bootstrap failed");
        }
    };
    info!(
        service = %report.service,
        service_monitor = %report.service_monitor,
        "Metrics bootstrap complete"
    );

    let exporter = report.exporter;
    let stop_exporter = exporter.abort_handle();
    tokio::select! {
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received, stopping metrics exporter");
            stop_exporter.abort();
        }
        result = exporter => {
            error!("CRITICAL: metrics exporter exited unexpectedly: {:?}", result);
            anyhow::bail!("Metrics exporter exited unexpectedly")
        }
    }

    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
