// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition update helpers.
//!
//! Reconcilers call [`set_condition`] every time they observe a resource. Whether
//! an existing condition is actually rewritten is governed by an [`UpdatePolicy`],
//! so that noisy reasons or messages do not churn the status subresource.
//!
//! # Example
//!
//! ```rust
//! use opsupport::conditions::{set_condition, UpdatePolicy};
//! use opsupport::crd::ConditionStatus;
//!
//! let mut conditions = Vec::new();
//! let changed = set_condition(
//!     &mut conditions,
//!     "Ready",
//!     ConditionStatus::True,
//!     "AccountReady",
//!     "Account is ready",
//!     UpdatePolicy::Never,
//! );
//! assert!(changed);
//! assert_eq!(conditions.len(), 1);
//! ```

use crate::crd::{Condition, ConditionStatus};
use crate::metrics::{record_condition_skipped, record_condition_updated};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Controls when an existing condition of the same type is overwritten.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UpdatePolicy {
    /// Always rewrite the condition, refreshing its timestamps and message
    Always,

    /// Only rewrite the condition when its status flips
    #[default]
    Never,

    /// Rewrite on a status flip, or when the reason or message differ
    IfReasonOrMessageChange,
}

/// Decide whether a condition should be overwritten.
///
/// - [`UpdatePolicy::Always`] returns `true` unconditionally.
/// - [`UpdatePolicy::Never`] returns `true` only on a status transition.
/// - [`UpdatePolicy::IfReasonOrMessageChange`] additionally returns `true` when
///   the reason or message differ.
///
/// # Example
///
/// ```rust
/// use opsupport::conditions::{should_update_condition, UpdatePolicy};
/// use opsupport::crd::ConditionStatus;
///
/// assert!(!should_update_condition(
///     ConditionStatus::True, "OldReason", "old",
///     ConditionStatus::True, "NewReason", "new",
///     UpdatePolicy::Never,
/// ));
/// ```
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn should_update_condition(
    old_status: ConditionStatus,
    old_reason: &str,
    old_message: &str,
    new_status: ConditionStatus,
    new_reason: &str,
    new_message: &str,
    policy: UpdatePolicy,
) -> bool {
    match policy {
        UpdatePolicy::Always => true,
        UpdatePolicy::Never => old_status != new_status,
        UpdatePolicy::IfReasonOrMessageChange => {
            old_status != new_status || old_reason != new_reason || old_message != new_message
        }
    }
}

/// Create a new condition with both timestamps set to the current time.
#[must_use]
pub fn new_condition(
    condition_type: &str,
    status: ConditionStatus,
    reason: &str,
    message: &str,
) -> Condition {
    let now = Utc::now().to_rfc3339();
    Condition {
        r#type: condition_type.to_string(),
        status,
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_probe_time: Some(now.clone()),
        last_transition_time: Some(now),
    }
}

/// Find a condition by type in a list of conditions.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Add or update a condition in a conditions list (in-memory, no API call).
///
/// A missing condition is always appended. An existing one is only rewritten when
/// [`should_update_condition`] allows it; `lastTransitionTime` moves only when the
/// status actually changes, while `lastProbeTime` moves on every rewrite.
///
/// Returns `true` if the list was modified and the caller should persist the status.
pub fn set_condition(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: ConditionStatus,
    reason: &str,
    message: &str,
    policy: UpdatePolicy,
) -> bool {
    let Some(index) = conditions.iter().position(|c| c.r#type == condition_type) else {
        debug!(
            condition_type = %condition_type,
            status = %status,
            reason = %reason,
            "Adding new condition"
        );
        conditions.push(new_condition(condition_type, status, reason, message));
        record_condition_updated(condition_type);
        return true;
    };
    let existing = &mut conditions[index];

    let update = should_update_condition(
        existing.status,
        existing.reason.as_deref().unwrap_or_default(),
        existing.message.as_deref().unwrap_or_default(),
        status,
        reason,
        message,
        policy,
    );

    if !update {
        debug!(
            condition_type = %condition_type,
            status = %status,
            policy = ?policy,
            "Condition unchanged, skipping update"
        );
        record_condition_skipped(condition_type);
        return false;
    }

    let now = Utc::now().to_rfc3339();
    if existing.status != status {
        debug!(
            condition_type = %condition_type,
            from = %existing.status,
            to = %status,
            "Condition status transition"
        );
        existing.last_transition_time = Some(now.clone());
    } else if existing.last_transition_time.is_none() {
        existing.last_transition_time = Some(now.clone());
    }
    existing.status = status;
    existing.reason = Some(reason.to_string());
    existing.message = Some(message.to_string());
    existing.last_probe_time = Some(now);
    record_condition_updated(condition_type);

    true
}

#[cfg(test)]
#[path = "conditions_tests.rs"]
mod conditions_tests;
