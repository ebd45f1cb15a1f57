// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use crate::config::{MetricsConfig, OperatorIdentity};
    use crate::errors::ConfigError;
    use std::collections::HashMap;
    use std::io::Write;
    use std::net::IpAddr;
    use std::path::Path;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn namespace_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_identity_from_env_override() {
        let identity = OperatorIdentity::from_lookup(
            env(&[
                ("OPERATOR_NAME", "foo-operator"),
                ("OPERATOR_NAMESPACE", "foo-ns"),
            ]),
            Path::new("/nonexistent/namespace"),
        )
        .unwrap();

        assert_eq!(identity, OperatorIdentity::new("foo-operator", "foo-ns"));
    }

    #[test]
    fn test_identity_namespace_from_file() {
        let file = namespace_file("foo-ns\n");

        let identity =
            OperatorIdentity::from_lookup(env(&[("OPERATOR_NAME", "foo-operator")]), file.path())
                .unwrap();

        assert_eq!(identity.namespace, "foo-ns");
    }

    #[test]
    fn test_identity_requires_operator_name() {
        let err = OperatorIdentity::from_lookup(
            env(&[("OPERATOR_NAME", "  "), ("OPERATOR_NAMESPACE", "foo-ns")]),
            Path::new("/nonexistent/namespace"),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingVar { ref name } if name == "OPERATOR_NAME"));
    }

    #[test]
    fn test_identity_missing_namespace_file() {
        let err = OperatorIdentity::from_lookup(
            env(&[("OPERATOR_NAME", "foo-operator")]),
            Path::new("/nonexistent/namespace"),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::NamespaceFile { .. }));
    }

    #[test]
    fn test_identity_empty_namespace_file() {
        let file = namespace_file("   \n");

        let err =
            OperatorIdentity::from_lookup(env(&[("OPERATOR_NAME", "foo-operator")]), file.path())
                .unwrap_err();

        assert!(matches!(err, ConfigError::NamespaceFile { .. }));
    }

    #[test]
    fn test_metrics_config_defaults() {
        let config = MetricsConfig::from_lookup(env(&[])).unwrap();

        assert_eq!(config, MetricsConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.port_name, "metrics");
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_metrics_config_overrides() {
        let config = MetricsConfig::from_lookup(env(&[
            ("METRICS_PORT", "9090"),
            ("METRICS_PORT_NAME", "http-metrics"),
            ("METRICS_BIND_ADDRESS", "127.0.0.1"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.port_name, "http-metrics");
        assert_eq!(config.bind_address, IpAddr::from([127, 0, 0, 1]));
    }

    #[test]
    fn test_metrics_config_rejects_bad_port() {
        for bad in ["0", "70000", "http"] {
            let err = MetricsConfig::from_lookup(env(&[("METRICS_PORT", bad)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "METRICS_PORT"),
                "port {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_metrics_config_rejects_bad_bind_address() {
        let err =
            MetricsConfig::from_lookup(env(&[("METRICS_BIND_ADDRESS", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
