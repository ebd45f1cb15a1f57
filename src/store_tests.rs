// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `store.rs`

#[cfg(test)]
mod tests {
    use crate::store::{create_or_update, is_already_exists, is_transient, ApplyOutcome};
    use crate::test_support::{api_error, MemoryStore};
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    const TEST_NAMESPACE: &str = "test-namespace";
    const TEST_NAME: &str = "test-resource";

    fn configmap(value: &str) -> ConfigMap {
        let mut data = BTreeMap::new();
        data.insert("key1".to_string(), value.to_string());

        ConfigMap {
            metadata: ObjectMeta {
                name: Some(TEST_NAME.to_string()),
                namespace: Some(TEST_NAMESPACE.to_string()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_already_exists_requires_reason() {
        assert!(is_already_exists(&api_error(409, "AlreadyExists")));
        assert!(!is_already_exists(&api_error(409, "Conflict")));
        assert!(!is_already_exists(&api_error(404, "NotFound")));
    }

    #[test]
    fn test_is_transient() {
        assert!(is_transient(&api_error(429, "TooManyRequests")));
        assert!(is_transient(&api_error(500, "InternalError")));
        assert!(is_transient(&api_error(503, "ServiceUnavailable")));
        assert!(!is_transient(&api_error(400, "BadRequest")));
        assert!(!is_transient(&api_error(409, "AlreadyExists")));
    }

    #[tokio::test]
    async fn test_create_or_update_creates_when_missing() {
        let store = MemoryStore::new();

        let outcome = create_or_update(&store, TEST_NAMESPACE, &configmap("v1"))
            .await
            .unwrap();

        assert_eq!(outcome, ApplyOutcome::Created);
        assert_eq!(
            store.calls(),
            vec!["create ConfigMap test-namespace/test-resource"]
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_or_update_updates_when_exists() {
        let store = MemoryStore::new();
        store.insert(TEST_NAMESPACE, &configmap("v1"));

        let outcome = create_or_update(&store, TEST_NAMESPACE, &configmap("v2"))
            .await
            .unwrap();

        assert_eq!(outcome, ApplyOutcome::Updated);
        assert_eq!(
            store.calls(),
            vec![
                "create ConfigMap test-namespace/test-resource",
                "replace ConfigMap test-namespace/test-resource",
            ]
        );
        let stored = store.get("ConfigMap", TEST_NAMESPACE, TEST_NAME).unwrap();
        assert_eq!(stored["data"]["key1"], "v2");
    }

    #[tokio::test]
    async fn test_create_or_update_is_idempotent() {
        let store = MemoryStore::new();

        let first = create_or_update(&store, TEST_NAMESPACE, &configmap("v1"))
            .await
            .unwrap();
        let second = create_or_update(&store, TEST_NAMESPACE, &configmap("v1"))
            .await
            .unwrap();

        assert_eq!(first, ApplyOutcome::Created);
        assert_eq!(second, ApplyOutcome::Updated);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_or_update_propagates_other_create_errors() {
        let store = MemoryStore::new();
        store.fail_create("ConfigMap", 403, "Forbidden");

        let err = create_or_update(&store, TEST_NAMESPACE, &configmap("v1"))
            .await
            .unwrap_err();

        assert!(!is_already_exists(&err));
        // No fallback update for errors other than AlreadyExists
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_create_or_update_propagates_update_errors() {
        let store = MemoryStore::new();
        store.insert(TEST_NAMESPACE, &configmap("v1"));
        store.fail_replace("ConfigMap", 422, "Invalid");

        let err = create_or_update(&store, TEST_NAMESPACE, &configmap("v2"))
            .await
            .unwrap_err();

        match err {
            kube::Error::Api(resp) => assert_eq!(resp.code, 422),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
