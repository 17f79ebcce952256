//! # Kubernetes wrapper
//!
//! List/watch plumbing over the cluster API: namespaces, pods, the pull
//! secrets a pod references, and a pod watcher stream. Per-namespace and
//! per-secret failures are logged and skipped so one broken object never
//! hides the rest of the cluster.

pub mod types;

use anyhow::{Context, Result};
use futures::Stream;
use k8s_openapi::api::core::v1::{ContainerStatus, LocalObjectReference, Namespace, Pod, Secret};
use kube::api::ListParams;
use kube::{Api, Client};
use kube_runtime::watcher;
use tracing::{debug, error};

use self::types::{ContainerInfo, PodInfo};
use crate::constants::{
    SECRET_KEY_DOCKER_CFG, SECRET_KEY_DOCKER_CONFIG_JSON, SECRET_TYPE_DOCKER_CFG,
    SECRET_TYPE_DOCKER_CONFIG_JSON,
};
use crate::oci::reference::trim_runtime_scheme;
use crate::oci::types::{RegistryImage, SecretFormat, SecretRecord};
use crate::util::unescape;

/// Thin client wrapper for the read paths this library needs.
#[derive(Clone)]
pub struct KubeClient {
    pub client: Client,
}

impl std::fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClient").finish_non_exhaustive()
    }
}

impl KubeClient {
    /// Build a client from the ambient kubeconfig or in-cluster
    /// environment.
    pub async fn new() -> Result<Self> {
        let client = Client::try_default()
            .await
            .context("Could not create Kubernetes client from config")?;
        Ok(Self { client })
    }

    /// Wrap an already-constructed client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn list_params(label_selector: Option<&str>) -> ListParams {
        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            if !selector.is_empty() {
                let selector = unescape(selector);
                debug!("Applied labelSelector {}", selector);
                params = params.labels(&selector);
            }
        }
        params
    }

    /// List namespaces, optionally filtered by a label selector.
    pub async fn list_namespaces(&self, label_selector: Option<&str>) -> Result<Vec<Namespace>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api
            .list(&Self::list_params(label_selector))
            .await
            .context("failed to list namespaces")?;
        Ok(list.items)
    }

    async fn list_pods(&self, namespace: &str, label_selector: Option<&str>) -> Result<Vec<Pod>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&Self::list_params(label_selector))
            .await
            .context(format!("failed to list pods in namespace {namespace}"))?;
        Ok(list.items)
    }

    /// Collect pod infos across the given namespaces. A namespace whose
    /// pod listing fails is logged and skipped.
    pub async fn load_pod_infos(
        &self,
        namespaces: &[Namespace],
        pod_label_selector: Option<&str>,
    ) -> Vec<PodInfo> {
        let mut pod_infos = Vec::new();

        for namespace in namespaces {
            let Some(name) = namespace.metadata.name.as_deref() else {
                continue;
            };

            let pods = match self.list_pods(name, pod_label_selector).await {
                Ok(pods) => pods,
                Err(err) => {
                    error!("failed to list pods for namespace: {name}: {err:#}");
                    continue;
                }
            };

            for pod in pods {
                pod_infos.push(PodInfo {
                    containers: self.extract_container_infos(&pod).await,
                    pod_name: pod.metadata.name.clone().unwrap_or_default(),
                    pod_namespace: pod.metadata.namespace.clone().unwrap_or_default(),
                    annotations: pod.metadata.annotations.clone().unwrap_or_default(),
                });
            }
        }

        pod_infos
    }

    /// Walk the pod's regular, init and ephemeral container statuses and
    /// pair each reported image with the pod's pull secrets. Containers
    /// without an image ID (not yet started) are skipped.
    pub async fn extract_container_infos(&self, pod: &Pod) -> Vec<ContainerInfo> {
        let namespace = pod.metadata.namespace.as_deref().unwrap_or_default();
        let secret_refs = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.image_pull_secrets.as_deref())
            .unwrap_or_default();
        let pull_secrets = self.load_pull_secrets(namespace, secret_refs).await;

        let mut statuses: Vec<&ContainerStatus> = Vec::new();
        if let Some(status) = pod.status.as_ref() {
            for list in [
                &status.container_statuses,
                &status.init_container_statuses,
                &status.ephemeral_container_statuses,
            ] {
                if let Some(list) = list {
                    statuses.extend(list.iter());
                }
            }
        }

        let mut containers = Vec::new();
        for status in statuses {
            if status.image_id.is_empty() {
                continue;
            }

            containers.push(ContainerInfo {
                image: RegistryImage {
                    image: status.image.clone(),
                    image_id: trim_runtime_scheme(&status.image_id).to_string(),
                    pull_secrets: pull_secrets.clone(),
                },
                name: status.name.clone(),
            });
        }

        containers
    }

    /// Fetch the referenced pull secrets. Unsupported secret types and
    /// fetch failures are logged and skipped.
    pub async fn load_pull_secrets(
        &self,
        namespace: &str,
        refs: &[LocalObjectReference],
    ) -> Vec<SecretRecord> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let mut records = Vec::new();

        for reference in refs {
            let name = reference.name.as_str();

            let secret = match api.get(name).await {
                Ok(secret) => secret,
                Err(err) => {
                    error!("Could not load secret: {namespace}/{name}: {err}");
                    continue;
                }
            };

            if let Some(record) = secret_to_record(&secret) {
                records.push(record);
            }
        }

        records
    }

    /// Watch pods across all namespaces, optionally filtered by a label
    /// selector.
    pub fn watch_pods(
        &self,
        label_selector: Option<&str>,
    ) -> impl Stream<Item = Result<watcher::Event<Pod>, watcher::Error>> {
        let api: Api<Pod> = Api::all(self.client.clone());
        let mut config = watcher::Config::default();
        if let Some(selector) = label_selector {
            if !selector.is_empty() {
                config = config.labels(&unescape(selector));
            }
        }
        watcher(api, config)
    }
}

/// Map a secret object to a raw pull-secret record, selecting the payload
/// format by the secret's declared type. Returns `None` (after logging)
/// for unsupported types, missing data keys and empty payloads.
#[must_use]
pub fn secret_to_record(secret: &Secret) -> Option<SecretRecord> {
    let name = secret.metadata.name.clone().unwrap_or_default();
    let namespace = secret.metadata.namespace.as_deref().unwrap_or_default();
    let secret_type = secret.type_.as_deref().unwrap_or_default();

    let (format, key) = match secret_type {
        SECRET_TYPE_DOCKER_CONFIG_JSON => (SecretFormat::Modern, SECRET_KEY_DOCKER_CONFIG_JSON),
        SECRET_TYPE_DOCKER_CFG => (SecretFormat::Legacy, SECRET_KEY_DOCKER_CFG),
        other => {
            error!("invalid secret-type {other} for pullSecret {namespace}/{name}");
            return None;
        }
    };

    let payload = secret.data.as_ref()?.get(key)?;
    if payload.0.is_empty() {
        return None;
    }

    Some(SecretRecord {
        name,
        format,
        payload: payload.0.clone(),
    })
}
