// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`ObjectStore`] used by unit tests.

use crate::store::{ObjectStore, StoreResource};
use async_trait::async_trait;
use kube::core::{GroupVersionKind, Status};
use kube::ResourceExt;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

type ObjectKey = (String, String, String);

/// Builds a kube API error with the given code and reason.
pub fn api_error(code: u16, reason: &str) -> kube::Error {
    let message = format!("injected {reason}");
    kube::Error::Api(Box::new(Status::failure(&message, reason).with_code(code)))
}

/// Object store keeping serialized objects in a map keyed by (kind, namespace, name).
///
/// Errors are injected per kind and per operation as `(code, reason)` pairs,
/// since `kube::Error` is not `Clone`.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<ObjectKey, serde_json::Value>>,
    served: Mutex<BTreeSet<(String, String, String)>>,
    discovery_failure: Mutex<Option<(u16, String)>>,
    create_failures: Mutex<BTreeMap<String, (u16, String)>>,
    replace_failures: Mutex<BTreeMap<String, (u16, String)>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that serves the monitoring.coreos.com/v1 `ServiceMonitor` kind.
    pub fn with_monitoring() -> Self {
        let store = Self::new();
        store.serve("monitoring.coreos.com", "v1", "ServiceMonitor");
        store
    }

    pub fn serve(&self, group: &str, version: &str, kind: &str) {
        self.served.lock().unwrap().insert((
            group.to_string(),
            version.to_string(),
            kind.to_string(),
        ));
    }

    pub fn fail_discovery(&self, code: u16, reason: &str) {
        *self.discovery_failure.lock().unwrap() = Some((code, reason.to_string()));
    }

    pub fn fail_create(&self, kind: &str, code: u16, reason: &str) {
        self.create_failures
            .lock()
            .unwrap()
            .insert(kind.to_string(), (code, reason.to_string()));
    }

    pub fn fail_replace(&self, kind: &str, code: u16, reason: &str) {
        self.replace_failures
            .lock()
            .unwrap()
            .insert(kind.to_string(), (code, reason.to_string()));
    }

    /// Seeds an object as if it had been created earlier.
    pub fn insert<K: StoreResource>(&self, namespace: &str, obj: &K) {
        let key = (K::kind(&()).to_string(), namespace.to_string(), obj.name_any());
        self.objects
            .lock()
            .unwrap()
            .insert(key, serde_json::to_value(obj).unwrap());
    }

    pub fn get(&self, kind: &str, namespace: &str, name: &str) -> Option<serde_json::Value> {
        self.objects
            .lock()
            .unwrap()
            .get(&(kind.to_string(), namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Operations performed so far, e.g. `create Service foo-ns/foo-operator`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn is_kind_served(&self, gvk: &GroupVersionKind) -> Result<bool, kube::Error> {
        self.record(format!("discover {}/{} {}", gvk.group, gvk.version, gvk.kind));
        if let Some((code, reason)) = self.discovery_failure.lock().unwrap().clone() {
            return Err(api_error(code, &reason));
        }
        Ok(self.served.lock().unwrap().contains(&(
            gvk.group.clone(),
            gvk.version.clone(),
            gvk.kind.clone(),
        )))
    }

    async fn create<K: StoreResource>(&self, namespace: &str, obj: &K) -> Result<(), kube::Error> {
        let kind = K::kind(&()).to_string();
        let name = obj.name_any();
        self.record(format!("create {kind} {namespace}/{name}"));

        if let Some((code, reason)) = self.create_failures.lock().unwrap().get(&kind).cloned() {
            return Err(api_error(code, &reason));
        }

        let mut objects = self.objects.lock().unwrap();
        let key = (kind, namespace.to_string(), name);
        if objects.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists"));
        }
        objects.insert(key, serde_json::to_value(obj).unwrap());
        Ok(())
    }

    async fn replace<K: StoreResource>(
        &self,
        namespace: &str,
        obj: &K,
    ) -> Result<(), kube::Error> {
        let kind = K::kind(&()).to_string();
        let name = obj.name_any();
        self.record(format!("replace {kind} {namespace}/{name}"));

        if let Some((code, reason)) = self.replace_failures.lock().unwrap().get(&kind).cloned() {
            return Err(api_error(code, &reason));
        }

        let mut objects = self.objects.lock().unwrap();
        let key = (kind, namespace.to_string(), name);
        if !objects.contains_key(&key) {
            return Err(api_error(404, "NotFound"));
        }
        objects.insert(key, serde_json::to_value(obj).unwrap());
        Ok(())
    }
}
