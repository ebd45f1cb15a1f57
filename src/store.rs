// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Object store seam between the bootstrap logic and the Kubernetes API.
//!
//! [`ObjectStore`] is the narrow set of API operations the metrics bootstrap
//! needs: checking that a kind is served, creating an object, and replacing
//! an existing one. [`KubeStore`] implements it on top of a [`kube::Client`].
//!
//! [`create_or_update`] layers the "try create, update on `AlreadyExists`"
//! strategy over any store so callers get a single idempotent operation.
//!
//! # Example
//!
//! ```rust,no_run
//! use opsupport::store::{create_or_update, KubeStore};
//! use k8s_openapi::api::core::v1::Service;
//! use kube::Client;
//!
//! async fn example(client: Client, service: Service) -> Result<(), kube::Error> {
//!     let store = KubeStore::new(client);
//!     let outcome = create_or_update(&store, "operators", &service).await?;
//!     println!("service {outcome}");
//!     Ok(())
//! }
//! ```

use crate::constants::{HTTP_CONFLICT, REASON_ALREADY_EXISTS};
use crate::metrics::{record_resource_created, record_resource_updated};
use async_trait::async_trait;
use kube::api::PostParams;
use kube::core::{GroupVersionKind, NamespaceResourceScope};
use kube::discovery::Discovery;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Typed, namespaced resources the store can write.
pub trait StoreResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<T> StoreResource for T where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// API operations required by the metrics bootstrap.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns whether the API server serves the given group/version/kind.
    async fn is_kind_served(&self, gvk: &GroupVersionKind) -> Result<bool, kube::Error>;

    /// Create `obj` in `namespace`. Must surface `AlreadyExists` as a 409 API error.
    async fn create<K: StoreResource>(&self, namespace: &str, obj: &K) -> Result<(), kube::Error>;

    /// Overwrite the existing object with the same name as `obj` in `namespace`.
    async fn replace<K: StoreResource>(&self, namespace: &str, obj: &K)
        -> Result<(), kube::Error>;
}

/// Result of [`create_or_update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The object did not exist and was created
    Created,
    /// The object already existed and was updated in place
    Updated,
}

impl fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Updated => f.write_str("updated"),
        }
    }
}

/// Returns true if the API error means the object already exists.
///
/// A 409 is also used for `resourceVersion` conflicts, so the reason is checked too.
#[must_use]
pub fn is_already_exists(err: &kube::Error) -> bool {
    matches!(
        err,
        kube::Error::Api(resp) if resp.code == HTTP_CONFLICT && resp.reason == REASON_ALREADY_EXISTS
    )
}

/// Returns true if the error is transient and the call may succeed when retried.
///
/// Rate limiting (429), server errors (5xx) and transport failures are transient.
#[must_use]
pub fn is_transient(err: &kube::Error) -> bool {
    match err {
        kube::Error::Api(resp) => resp.code == 429 || (500..600).contains(&resp.code),
        kube::Error::Service(_) => true,
        _ => false,
    }
}

/// Create a resource, falling back to an update when it already exists.
///
/// Any create error other than `AlreadyExists` is returned as-is, as is any
/// error from the fallback update. A successful fallback update is a success.
///
/// # Errors
///
/// Returns the underlying API error from the create or the update.
pub async fn create_or_update<S, K>(
    store: &S,
    namespace: &str,
    obj: &K,
) -> Result<ApplyOutcome, kube::Error>
where
    S: ObjectStore,
    K: StoreResource,
{
    let kind = K::kind(&());
    let name = obj.name_any();

    debug!(
        namespace = %namespace,
        name = %name,
        kind = %kind,
        "Creating resource, updating on conflict"
    );

    match store.create(namespace, obj).await {
        Ok(()) => {
            info!("Created {} {}/{}", kind, namespace, name);
            record_resource_created(&kind);
            Ok(ApplyOutcome::Created)
        }
        Err(e) if is_already_exists(&e) => {
            debug!(
                "{} {}/{} already exists, updating with desired spec",
                kind, namespace, name
            );
            store.replace(namespace, obj).await?;
            info!("Updated {} {}/{}", kind, namespace, name);
            record_resource_updated(&kind);
            Ok(ApplyOutcome::Updated)
        }
        Err(e) => Err(e),
    }
}

/// [`ObjectStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn is_kind_served(&self, gvk: &GroupVersionKind) -> Result<bool, kube::Error> {
        let discovery = Discovery::new(self.client.clone())
            .filter(&[gvk.group.as_str()])
            .run()
            .await?;
        Ok(discovery.resolve_gvk(gvk).is_some())
    }

    async fn create<K: StoreResource>(&self, namespace: &str, obj: &K) -> Result<(), kube::Error> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), obj).await?;
        Ok(())
    }

    async fn replace<K: StoreResource>(
        &self,
        namespace: &str,
        obj: &K,
    ) -> Result<(), kube::Error> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let name = obj.name_any();

        // Replace requires the live resourceVersion for optimistic concurrency
        let live = api.get(&name).await?;
        let mut desired = obj.clone();
        desired.meta_mut().resource_version = live.resource_version();

        api.replace(&name, &PostParams::default(), &desired).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
