// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator identity and metrics configuration.
//!
//! Both are resolved once at startup from the process environment and then
//! passed by value to the code that needs them, so the bootstrap itself never
//! reads ambient process state.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `OPERATOR_NAME` | required |
//! | `OPERATOR_NAMESPACE` | service-account namespace file |
//! | `METRICS_PORT` | `8080` |
//! | `METRICS_PORT_NAME` | `metrics` |
//! | `METRICS_BIND_ADDRESS` | `0.0.0.0` |

use crate::constants::{
    DEFAULT_METRICS_BIND_ADDRESS, DEFAULT_METRICS_PORT, DEFAULT_METRICS_PORT_NAME,
    ENV_METRICS_BIND_ADDRESS, ENV_METRICS_PORT, ENV_METRICS_PORT_NAME, ENV_OPERATOR_NAME,
    ENV_OPERATOR_NAMESPACE, SERVICE_ACCOUNT_NAMESPACE_PATH,
};
use crate::errors::ConfigError;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tracing::debug;

/// Name and namespace the operator runs as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorIdentity {
    pub name: String,
    pub namespace: String,
}

impl OperatorIdentity {
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Resolve the identity from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when `OPERATOR_NAME` is unset, or
    /// [`ConfigError::NamespaceFile`] when no namespace override is set and the
    /// service-account namespace file cannot be read.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            Path::new(SERVICE_ACCOUNT_NAMESPACE_PATH),
        )
    }

    /// Resolve the identity through `lookup`, falling back to `namespace_file`.
    ///
    /// # Errors
    ///
    /// See [`OperatorIdentity::from_env`].
    pub fn from_lookup<F>(lookup: F, namespace_file: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = non_empty(&lookup, ENV_OPERATOR_NAME).ok_or_else(|| ConfigError::MissingVar {
            name: ENV_OPERATOR_NAME.to_string(),
        })?;

        let namespace = if let Some(ns) = non_empty(&lookup, ENV_OPERATOR_NAMESPACE) {
            debug!(namespace = %ns, "Using operator namespace from environment");
            ns
        } else {
            read_namespace_file(namespace_file)?
        };

        Ok(Self { name, namespace })
    }
}

/// Settings of the metrics Service and exporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Port exposed by the Service and bound by the exporter
    pub port: u16,
    /// Name of the Service port, referenced by the `ServiceMonitor`
    pub port_name: String,
    /// Address the exporter binds to
    pub bind_address: IpAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_METRICS_PORT,
            port_name: DEFAULT_METRICS_PORT_NAME.to_string(),
            bind_address: IpAddr::from([0, 0, 0, 0]),
        }
    }
}

impl MetricsConfig {
    /// Read overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`, keeping defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = non_empty(&lookup, ENV_METRICS_PORT) {
            config.port = match raw.parse::<u16>() {
                Ok(0) => {
                    return Err(invalid(ENV_METRICS_PORT, &raw, "port must be non-zero"));
                }
                Ok(port) => port,
                Err(e) => return Err(invalid(ENV_METRICS_PORT, &raw, &e.to_string())),
            };
        }

        if let Some(name) = non_empty(&lookup, ENV_METRICS_PORT_NAME) {
            config.port_name = name;
        }

        let bind = non_empty(&lookup, ENV_METRICS_BIND_ADDRESS)
            .unwrap_or_else(|| DEFAULT_METRICS_BIND_ADDRESS.to_string());
        config.bind_address = bind.parse().map_err(|e: std::net::AddrParseError| {
            invalid(ENV_METRICS_BIND_ADDRESS, &bind, &e.to_string())
        })?;

        Ok(config)
    }

    /// Socket address the exporter listens on.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(name: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn read_namespace_file(path: &Path) -> Result<String, ConfigError> {
    let to_error = |source: std::io::Error| ConfigError::NamespaceFile {
        path: path.display().to_string(),
        source,
    };

    let namespace = std::fs::read_to_string(path).map_err(to_error)?;
    let namespace = namespace.trim();
    if namespace.is_empty() {
        return Err(to_error(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "namespace file is empty",
        )));
    }

    debug!(namespace = %namespace, path = %path.display(), "Read operator namespace from file");
    Ok(namespace.to_string())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
