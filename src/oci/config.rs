//! # Pull-secret payload decoding
//!
//! Decodes the two historical docker credential file formats carried by
//! Kubernetes pull secrets into one normalized per-registry map:
//!
//! - **Modern** (`kubernetes.io/dockerconfigjson`): a JSON object with an
//!   `auths` map keyed by registry host.
//! - **Legacy** (`kubernetes.io/dockercfg`): the same per-registry entries
//!   as a bare top-level map, without the `auths` wrapper.
//!
//! Entries may carry explicit `username`/`password` fields, a base64
//! `auth` blob (`user:pass`), or both; explicit fields win.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::oci::reference::convert_to_hostname;
use crate::oci::types::{NormalizedAuth, SecretFormat, SecretRecord};

/// Error type for malformed pull-secret payloads.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("secret {name} is not valid JSON for its declared format: {source}")]
    Payload {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("auth entry for {server} is not valid base64: {source}")]
    AuthField {
        server: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("auth entry for {server} is not valid UTF-8")]
    AuthEncoding { server: String },
    #[error("auth entry for {server} is not user:pass formatted")]
    AuthFormat { server: String },
}

/// One entry of a docker credential file, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Base64-encoded `user:pass`, the older way of carrying the pair.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth: String,
    #[serde(default, rename = "identitytoken", skip_serializing_if = "String::is_empty")]
    pub identity_token: String,
    #[serde(default, rename = "registrytoken", skip_serializing_if = "String::is_empty")]
    pub registry_token: String,
}

/// Modern credential file shape: per-registry entries under `auths`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: BTreeMap<String, AuthEntry>,
}

/// Decode a pull-secret payload into a normalized per-registry map.
///
/// The secret's declared format selects the parse arm; both arms normalize
/// to the same [`NormalizedAuth`] shape keyed by the registry host the
/// entry was stored under.
pub fn decode(record: &SecretRecord) -> Result<BTreeMap<String, NormalizedAuth>, DecodeError> {
    let entries: BTreeMap<String, AuthEntry> = match record.format {
        SecretFormat::Modern => {
            serde_json::from_slice::<DockerConfig>(&record.payload)
                .map_err(|source| DecodeError::Payload {
                    name: record.name.clone(),
                    source,
                })?
                .auths
        }
        SecretFormat::Legacy => {
            serde_json::from_slice(&record.payload).map_err(|source| DecodeError::Payload {
                name: record.name.clone(),
                source,
            })?
        }
    };

    entries
        .into_iter()
        .map(|(server, entry)| normalize_entry(&server, entry).map(|auth| (server, auth)))
        .collect()
}

/// Re-encode a normalized auth map as a modern `auths`-wrapped payload.
pub fn encode_modern(
    auths: &BTreeMap<String, NormalizedAuth>,
) -> Result<Vec<u8>, serde_json::Error> {
    let config = DockerConfig {
        auths: auths
            .iter()
            .map(|(server, auth)| {
                (
                    server.clone(),
                    AuthEntry {
                        username: auth.username.clone(),
                        password: auth.password.clone(),
                        registry_token: auth.token.clone(),
                        ..AuthEntry::default()
                    },
                )
            })
            .collect(),
    };
    serde_json::to_vec(&config)
}

/// Look up the auth record for a registry host.
///
/// Exact key match first, then a scheme-stripped hostname comparison so
/// `https://index.docker.io/v1/` entries match a bare `index.docker.io`
/// key and vice versa (same fallback the Docker client performs).
#[must_use]
pub fn auth_for_host<'a>(
    auths: &'a BTreeMap<String, NormalizedAuth>,
    host: &str,
) -> Option<&'a NormalizedAuth> {
    if let Some(auth) = auths.get(host) {
        return Some(auth);
    }

    let wanted = convert_to_hostname(host);
    auths
        .iter()
        .find(|(server, _)| convert_to_hostname(server) == wanted)
        .map(|(_, auth)| auth)
}

fn normalize_entry(server: &str, entry: AuthEntry) -> Result<NormalizedAuth, DecodeError> {
    let mut username = entry.username;
    let mut password = entry.password;

    if username.is_empty() && password.is_empty() && !entry.auth.is_empty() {
        let decoded = general_purpose::STANDARD
            .decode(entry.auth.trim())
            .map_err(|source| DecodeError::AuthField {
                server: server.to_string(),
                source,
            })?;
        let decoded = String::from_utf8(decoded).map_err(|_| DecodeError::AuthEncoding {
            server: server.to_string(),
        })?;
        let (user, pass) = decoded.split_once(':').ok_or_else(|| DecodeError::AuthFormat {
            server: server.to_string(),
        })?;
        username = user.to_string();
        password = pass.to_string();
    }

    let token = if entry.registry_token.is_empty() {
        entry.identity_token
    } else {
        entry.registry_token
    };

    Ok(NormalizedAuth {
        username,
        password,
        token,
        server_address: server.to_string(),
    })
}
