//! # Types
//!
//! Carrier types for pod/container extraction.

use std::collections::BTreeMap;

use crate::oci::types::RegistryImage;

/// One container of a pod: its image reference plus the pod's pull
/// secrets, ready for credential aggregation.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub image: RegistryImage,
    pub name: String,
}

/// Pod identity and the containers extracted from its statuses.
#[derive(Debug, Clone)]
pub struct PodInfo {
    pub containers: Vec<ContainerInfo>,
    pub pod_name: String,
    pub pod_namespace: String,
    pub annotations: BTreeMap<String, String>,
}
