// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource types shared by the operator support library.
//!
//! # Resource Types
//!
//! - [`ServiceMonitor`] - prometheus-operator `monitoring.coreos.com/v1` resource
//!   telling Prometheus which Service to scrape
//! - [`Condition`] - status condition embedded in the status of custom resources
//!
//! The `ServiceMonitor` type only models the fields this library writes. It is
//! owned by prometheus-operator; its CRD is never installed from here.
//!
//! # Example: Building a `ServiceMonitor`
//!
//! ```rust,no_run
//! use opsupport::crd::{Endpoint, ServiceMonitor, ServiceMonitorSpec};
//! use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
//!
//! let monitor = ServiceMonitor::new(
//!     "my-operator",
//!     ServiceMonitorSpec {
//!         selector: LabelSelector::default(),
//!         endpoints: vec![Endpoint {
//!             port: Some("metrics".to_string()),
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     },
//! );
//! ```

use crate::constants::{CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_STATUS_UNKNOWN};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tri-state status of a [`Condition`].
///
/// Serialized as the Kubernetes convention strings `"True"`, `"False"` and `"Unknown"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    /// Returns the Kubernetes string form of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::True => CONDITION_STATUS_TRUE,
            Self::False => CONDITION_STATUS_FALSE,
            Self::Unknown => CONDITION_STATUS_UNKNOWN,
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a string that is not a valid condition status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid condition status '{0}', expected True, False or Unknown")]
pub struct ParseConditionStatusError(pub String);

impl FromStr for ConditionStatus {
    type Err = ParseConditionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CONDITION_STATUS_TRUE => Ok(Self::True),
            CONDITION_STATUS_FALSE => Ok(Self::False),
            CONDITION_STATUS_UNKNOWN => Ok(Self::Unknown),
            other => Err(ParseConditionStatusError(other.to_string())),
        }
    }
}

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers. A condition is identified by its
/// `type` within the list owned by the parent resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. Common types include: Ready, Available, Progressing, Degraded, Failed.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: ConditionStatus,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition was written (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_probe_time: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// `ServiceMonitor` declares how Prometheus scrapes a set of Services.
///
/// Only the subset of the prometheus-operator schema used by the metrics
/// bootstrap is modelled here.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[kube(
    group = "monitoring.coreos.com",
    version = "v1",
    kind = "ServiceMonitor",
    plural = "servicemonitors",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMonitorSpec {
    /// Selects the Services to scrape by label
    pub selector: LabelSelector,

    /// Scrape endpoints on the selected Services
    pub endpoints: Vec<Endpoint>,
}

/// A single scrape endpoint of a `ServiceMonitor`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Name of the Service port to scrape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
