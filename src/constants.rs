// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the operator support library.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Metrics Service Constants
// ============================================================================

/// Default port the metrics exporter listens on and the Service exposes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default name of the metrics port on the Service (referenced by the `ServiceMonitor`)
pub const DEFAULT_METRICS_PORT_NAME: &str = "metrics";

/// Default address the metrics exporter binds to
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0";

/// HTTP path serving Prometheus text-format metrics
pub const METRICS_PATH: &str = "/metrics";

/// HTTP path serving the exporter liveness check
pub const HEALTHZ_PATH: &str = "/healthz";

/// Protocol of the metrics Service port
pub const SERVICE_PORT_PROTOCOL: &str = "TCP";

// ============================================================================
// Kubernetes API Constants
// ============================================================================

/// API group of the prometheus-operator monitoring CRDs
pub const MONITORING_API_GROUP: &str = "monitoring.coreos.com";

/// API version of the prometheus-operator monitoring CRDs
pub const MONITORING_API_VERSION: &str = "v1";

/// Fully qualified API version (group/version) of the monitoring CRDs
pub const MONITORING_API_GROUP_VERSION: &str = "monitoring.coreos.com/v1";

/// Kind of the prometheus-operator `ServiceMonitor` resource
pub const KIND_SERVICE_MONITOR: &str = "ServiceMonitor";

/// HTTP status code returned by the API server for conflicting creates
pub const HTTP_CONFLICT: u16 = 409;

/// Reason string returned by the API server when an object already exists
pub const REASON_ALREADY_EXISTS: &str = "AlreadyExists";

// ============================================================================
// Label Constants
// ============================================================================

/// Label key carrying the operator name on the metrics Service and its pods
pub const LABEL_NAME: &str = "name";

// ============================================================================
// Environment Constants
// ============================================================================

/// Environment variable holding the operator name
pub const ENV_OPERATOR_NAME: &str = "OPERATOR_NAME";

/// Environment variable overriding the operator namespace
pub const ENV_OPERATOR_NAMESPACE: &str = "OPERATOR_NAMESPACE";

/// Environment variable overriding the metrics port
pub const ENV_METRICS_PORT: &str = "METRICS_PORT";

/// Environment variable overriding the metrics port name
pub const ENV_METRICS_PORT_NAME: &str = "METRICS_PORT_NAME";

/// Environment variable overriding the metrics bind address
pub const ENV_METRICS_BIND_ADDRESS: &str = "METRICS_BIND_ADDRESS";

/// Namespace file mounted into every pod with a service account token
pub const SERVICE_ACCOUNT_NAMESPACE_PATH: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

// ============================================================================
// Condition Constants
// ============================================================================

/// Condition status value for a condition that holds
pub const CONDITION_STATUS_TRUE: &str = "True";

/// Condition status value for a condition that does not hold
pub const CONDITION_STATUS_FALSE: &str = "False";

/// Condition status value when the state cannot be determined
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";
