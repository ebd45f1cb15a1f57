// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the operator support library.
//!
//! - [`MetricsError`] - the four failure kinds of the metrics bootstrap
//! - [`ConfigError`] - operator identity and metrics configuration failures
//!
//! Bootstrap errors do not distinguish partial success: a Service that was
//! created before the `ServiceMonitor` failed is reported the same way as a
//! run where neither object was written.

use thiserror::Error;

/// Errors returned by the metrics bootstrap.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// The metrics Service (or the `ServiceMonitor` derived from it) could not be built
    ///
    /// Returned before any API call is made, when the operator identity or port
    /// configuration cannot produce a valid object.
    #[error("Failed to generate metrics service: {reason}")]
    ServiceGeneration {
        /// What was wrong with the inputs
        reason: String,
    },

    /// Creating or updating the metrics Service failed
    #[error("Failed to create metrics service {namespace}/{name}: {source}")]
    ServiceCreation {
        /// Service name
        name: String,
        /// Service namespace
        namespace: String,
        /// Underlying API error
        #[source]
        source: kube::Error,
    },

    /// Creating or updating the metrics `ServiceMonitor` failed
    #[error("Failed to create metrics servicemonitor {namespace}/{name}: {source}")]
    ServiceMonitorCreation {
        /// `ServiceMonitor` name
        name: String,
        /// `ServiceMonitor` namespace
        namespace: String,
        /// Underlying API error
        #[source]
        source: kube::Error,
    },

    /// The prometheus-operator monitoring types are not available
    ///
    /// Usually means the monitoring CRDs are not installed in the cluster.
    /// Retrying will not help until they are.
    #[error("Failed to register monitoring types {api_version}: {reason}")]
    RegisterMonitoringTypes {
        /// API group/version that was looked up
        api_version: String,
        /// Why the lookup failed
        reason: String,
    },
}

impl MetricsError {
    /// Returns true if retrying the bootstrap could succeed without operator intervention.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ServiceCreation { source, .. } | Self::ServiceMonitorCreation { source, .. } => {
                crate::store::is_transient(source)
            }
            Self::ServiceGeneration { .. } | Self::RegisterMonitoringTypes { .. } => false,
        }
    }

    /// Returns the `CamelCase` reason code for this error.
    ///
    /// Suitable for status conditions and event reasons.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::ServiceGeneration { .. } => "FailedGeneratingService",
            Self::ServiceCreation { .. } => "FailedCreateService",
            Self::ServiceMonitorCreation { .. } => "FailedCreateServiceMonitor",
            Self::RegisterMonitoringTypes { .. } => "FailedRegisterMonitoringTypes",
        }
    }
}

/// Errors resolving operator identity or metrics configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("Environment variable {name} must be set to a non-empty value")]
    MissingVar {
        /// Variable name
        name: String,
    },

    /// The service-account namespace file could not be read
    ///
    /// Happens when running outside a cluster without an explicit namespace override.
    #[error("Failed to read operator namespace from {path}: {source}")]
    NamespaceFile {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An environment variable holds a value that cannot be used
    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        /// Variable name
        name: String,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
