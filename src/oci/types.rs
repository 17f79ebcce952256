//! # Types
//!
//! Data structures for pull-secret decoding and credential aggregation.

use std::collections::BTreeMap;

/// On-disk format of a pull-secret payload, declared by the Kubernetes
/// secret `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretFormat {
    /// `kubernetes.io/dockerconfigjson`: JSON object with an `auths` map.
    Modern,
    /// `kubernetes.io/dockercfg`: bare top-level map of registries.
    Legacy,
}

/// Raw pull secret as read from the cluster. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct SecretRecord {
    /// Secret object name, used for log attribution only.
    pub name: String,
    /// Declared payload format.
    pub format: SecretFormat,
    /// Undecoded payload bytes from the secret data key.
    pub payload: Vec<u8>,
}

/// Normalized per-registry credential produced by decoding a pull secret.
///
/// `server_address` is the canonical key used for lookup and proxy
/// rewriting. An all-empty record means anonymous access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedAuth {
    pub username: String,
    pub password: String,
    /// Bearer token for registries that issue one instead of (or alongside)
    /// a username/password pair.
    pub token: String,
    pub server_address: String,
}

/// A container image reference together with the pull secrets its pod
/// references, in pod-spec order.
#[derive(Debug, Clone)]
pub struct RegistryImage {
    /// Image as declared in the pod spec (e.g. `nginx:latest`).
    pub image: String,
    /// Image ID reported by the runtime, possibly prefixed with a
    /// transport scheme (`docker://`, `containerd://`, ...).
    pub image_id: String,
    pub pull_secrets: Vec<SecretRecord>,
}

/// Source-registry-host to proxy-registry-host substitution rules.
///
/// An ordered map: rule application iterates keys in sorted order, which
/// keeps rewriting deterministic when more than one rule could match.
pub type ProxyMap = BTreeMap<String, String>;
