// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Metrics Service and `ServiceMonitor` bootstrap.
//!
//! Runs once at operator startup:
//!
//! 1. Build a Service exposing the metrics port, selecting the operator's own pods
//! 2. Build a `ServiceMonitor` from that Service
//! 3. Check that the prometheus-operator monitoring types are served
//! 4. Create the Service, updating it if it already exists
//! 5. Create the `ServiceMonitor`, updating it if it already exists
//! 6. Start the in-process metrics exporter
//!
//! Every step is fatal to the caller. Nothing is retried here; the caller
//! decides whether a failure aborts startup.
//!
//! # Example
//!
//! ```rust,no_run
//! use opsupport::bootstrap::configure_metrics;
//! use opsupport::config::{MetricsConfig, OperatorIdentity};
//! use kube::Client;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = Client::try_default().await?;
//! let identity = OperatorIdentity::from_env()?;
//! let report = configure_metrics(client, identity, MetricsConfig::default()).await?;
//! println!("service {}, servicemonitor {}", report.service, report.service_monitor);
//! # Ok(())
//! # }
//! ```

use crate::config::{MetricsConfig, OperatorIdentity};
use crate::constants::{
    KIND_SERVICE_MONITOR, LABEL_NAME, MONITORING_API_GROUP, MONITORING_API_GROUP_VERSION,
    MONITORING_API_VERSION, SERVICE_PORT_PROTOCOL,
};
use crate::crd::{Endpoint, ServiceMonitor, ServiceMonitorSpec};
use crate::errors::MetricsError;
use crate::metrics::{record_bootstrap_error, start_metrics_server};
use crate::store::{create_or_update, ApplyOutcome, KubeStore, ObjectStore};
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::core::GroupVersionKind;
use kube::{Client, ResourceExt};
use std::collections::BTreeMap;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Builds the Service exposing the operator's metrics port.
///
/// The Service is named after the operator, lives in the operator namespace and
/// selects pods labelled `name: <operator name>`.
///
/// # Errors
///
/// Returns [`MetricsError::ServiceGeneration`] if the operator name, namespace or
/// port name is empty, or the port is zero.
///
/// # Example
///
/// ```rust
/// use opsupport::bootstrap::generate_service;
/// use opsupport::config::OperatorIdentity;
///
/// let identity = OperatorIdentity::new("foo-operator", "foo-ns");
/// let service = generate_service(&identity, 8080, "metrics").unwrap();
/// assert_eq!(service.metadata.name.as_deref(), Some("foo-operator"));
/// ```
pub fn generate_service(
    identity: &OperatorIdentity,
    port: u16,
    port_name: &str,
) -> Result<Service, MetricsError> {
    let invalid = |reason: &str| MetricsError::ServiceGeneration {
        reason: reason.to_string(),
    };

    if identity.name.is_empty() {
        return Err(invalid("operator name is empty"));
    }
    if identity.namespace.is_empty() {
        return Err(invalid("operator namespace is empty"));
    }
    if port_name.is_empty() {
        return Err(invalid("metrics port name is empty"));
    }
    if port == 0 {
        return Err(invalid("metrics port must be non-zero"));
    }

    let mut labels = BTreeMap::new();
    labels.insert(LABEL_NAME.to_string(), identity.name.clone());

    let port = i32::from(port);

    Ok(Service {
        metadata: ObjectMeta {
            name: Some(identity.name.clone()),
            namespace: Some(identity.namespace.clone()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(port_name.to_string()),
                port,
                protocol: Some(SERVICE_PORT_PROTOCOL.to_string()),
                target_port: Some(IntOrString::Int(port)),
                ..Default::default()
            }]),
            selector: Some(labels),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Builds a `ServiceMonitor` scraping the first port of `service`.
///
/// The monitor shares the Service's name and namespace. Its labels and label
/// selector are copies of the Service's labels, and it has exactly one endpoint
/// referencing the Service's first port by name.
///
/// # Errors
///
/// Returns [`MetricsError::ServiceGeneration`] if the Service has no name, no
/// namespace, or no named first port.
pub fn generate_service_monitor(service: &Service) -> Result<ServiceMonitor, MetricsError> {
    let invalid = |reason: &str| MetricsError::ServiceGeneration {
        reason: reason.to_string(),
    };

    let name = service
        .metadata
        .name
        .clone()
        .ok_or_else(|| invalid("service has no name"))?;
    let namespace = service
        .metadata
        .namespace
        .clone()
        .ok_or_else(|| invalid("service has no namespace"))?;
    let port_name = service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .and_then(|ports| ports.first())
        .and_then(|port| port.name.clone())
        .ok_or_else(|| invalid("service has no named port to scrape"))?;

    let labels = service.metadata.labels.clone().unwrap_or_default();

    let mut monitor = ServiceMonitor::new(
        &name,
        ServiceMonitorSpec {
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            endpoints: vec![Endpoint {
                port: Some(port_name),
            }],
        },
    );
    monitor.metadata.namespace = Some(namespace);
    monitor.metadata.labels = Some(labels);

    Ok(monitor)
}

/// What the bootstrap did to each object, plus the running exporter.
#[derive(Debug)]
pub struct BootstrapReport {
    /// Whether the Service was created or updated
    pub service: ApplyOutcome,
    /// Whether the `ServiceMonitor` was created or updated
    pub service_monitor: ApplyOutcome,
    /// Task running the metrics exporter
    pub exporter: JoinHandle<()>,
}

/// Ensures the metrics Service and `ServiceMonitor` exist and starts the exporter.
pub struct MetricsBootstrap<S> {
    store: S,
    identity: OperatorIdentity,
    config: MetricsConfig,
}

impl<S: ObjectStore> MetricsBootstrap<S> {
    pub fn new(store: S, identity: OperatorIdentity, config: MetricsConfig) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }

    /// Run the bootstrap sequence once.
    ///
    /// # Errors
    ///
    /// Returns the [`MetricsError`] of the first failing step. A Service created
    /// before a `ServiceMonitor` failure is not rolled back.
    pub async fn configure_metrics(&self) -> Result<BootstrapReport, MetricsError> {
        info!(
            operator = %self.identity.name,
            namespace = %self.identity.namespace,
            port = self.config.port,
            "Configuring prometheus metrics"
        );

        let service = generate_service(&self.identity, self.config.port, &self.config.port_name)
            .map_err(|e| fail("Error generating metrics service object", e))?;
        debug!("Generated metrics service object");

        let service_monitor = generate_service_monitor(&service)
            .map_err(|e| fail("Error generating metrics servicemonitor object", e))?;
        debug!("Generated metrics servicemonitor object");

        self.register_monitoring_types()
            .await
            .map_err(|e| fail("Error registering prometheus monitoring objects", e))?;

        let namespace = &self.identity.namespace;

        let service_outcome = create_or_update(&self.store, namespace, &service)
            .await
            .map_err(|source| {
                fail(
                    "Error creating metrics service",
                    MetricsError::ServiceCreation {
                        name: service.name_any(),
                        namespace: namespace.clone(),
                        source,
                    },
                )
            })?;
        info!("Metrics service {}", service_outcome);

        let monitor_outcome = create_or_update(&self.store, namespace, &service_monitor)
            .await
            .map_err(|source| {
                fail(
                    "Error creating metrics servicemonitor",
                    MetricsError::ServiceMonitorCreation {
                        name: service_monitor.name_any(),
                        namespace: namespace.clone(),
                        source,
                    },
                )
            })?;
        info!("Metrics servicemonitor {}", monitor_outcome);

        info!("Starting prometheus metrics on {}", self.config.listen_addr());
        let exporter = start_metrics_server(self.config.listen_addr());

        Ok(BootstrapReport {
            service: service_outcome,
            service_monitor: monitor_outcome,
            exporter,
        })
    }

    /// Checks that the API server serves `monitoring.coreos.com/v1` `ServiceMonitor`.
    async fn register_monitoring_types(&self) -> Result<(), MetricsError> {
        let gvk = GroupVersionKind::gvk(
            MONITORING_API_GROUP,
            MONITORING_API_VERSION,
            KIND_SERVICE_MONITOR,
        );
        let unavailable = |reason: String| MetricsError::RegisterMonitoringTypes {
            api_version: MONITORING_API_GROUP_VERSION.to_string(),
            reason,
        };

        match self.store.is_kind_served(&gvk).await {
            Ok(true) => {
                debug!("Monitoring types {} are served", MONITORING_API_GROUP_VERSION);
                Ok(())
            }
            Ok(false) => Err(unavailable(format!(
                "{KIND_SERVICE_MONITOR} is not served by the API server, \
                 are the prometheus-operator CRDs installed?"
            ))),
            Err(e) => Err(unavailable(format!("API discovery failed: {e}"))),
        }
    }
}

/// Run the metrics bootstrap against the cluster `client` points at.
///
/// # Errors
///
/// See [`MetricsBootstrap::configure_metrics`].
pub async fn configure_metrics(
    client: Client,
    identity: OperatorIdentity,
    config: MetricsConfig,
) -> Result<BootstrapReport, MetricsError> {
    MetricsBootstrap::new(KubeStore::new(client), identity, config)
        .configure_metrics()
        .await
}

fn fail(context: &str, err: MetricsError) -> MetricsError {
    error!(reason = err.status_reason(), "{}: {}", context, err);
    record_bootstrap_error(err.status_reason());
    err
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod bootstrap_tests;
