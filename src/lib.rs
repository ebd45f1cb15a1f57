// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # opsupport - condition and metrics helpers for Kubernetes operators
//!
//! Small building blocks shared by operator reconcilers:
//!
//! - deciding whether a status condition should be rewritten, and applying
//!   that decision to a condition list
//! - publishing the operator's own metrics: a Service and prometheus-operator
//!   `ServiceMonitor` pointing at the operator pods, plus the in-process exporter
//!
//! ## Modules
//!
//! - [`conditions`] - Condition update policy and in-memory condition updates
//! - [`bootstrap`] - Metrics Service / `ServiceMonitor` bootstrap
//! - [`store`] - Object store seam and create-or-update helper
//! - [`config`] - Operator identity and metrics configuration
//! - [`crd`] - `ServiceMonitor` and `Condition` types
//! - [`metrics`] - Prometheus registry and exporter
//! - [`errors`] - Error types
//!
//! ## Example
//!
//! ```rust
//! use opsupport::conditions::{should_update_condition, UpdatePolicy};
//! use opsupport::crd::ConditionStatus;
//!
//! // A status flip always goes through
//! assert!(should_update_condition(
//!     ConditionStatus::True, "Ready", "ready",
//!     ConditionStatus::False, "Failed", "failed",
//!     UpdatePolicy::Never,
//! ));
//! ```

pub mod bootstrap;
pub mod conditions;
pub mod config;
pub mod constants;
pub mod crd;
pub mod errors;
pub mod metrics;
pub mod store;

#[cfg(test)]
mod test_support;
