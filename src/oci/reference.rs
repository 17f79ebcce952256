//! # Registry key resolution
//!
//! Parses image references into the canonical registry host used to look
//! up credentials, collapsing all Docker Hub hostname aliases onto one
//! fixed default key so a Hub credential entry matches any Hub-hosted
//! image regardless of which alias appears in the reference.

use oci_distribution::Reference;
use thiserror::Error;

use crate::constants::{DEFAULT_REGISTRY_KEY, DOCKER_HUB_ALIASES};

/// Error type for unparsable image references.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("cannot parse image reference {reference:?}: {source}")]
    Parse {
        reference: String,
        #[source]
        source: oci_distribution::ParseError,
    },
}

/// Strip the container-runtime transport prefix from an image ID.
///
/// Runtimes report image IDs as `docker://...`, `containerd://...` and so
/// on; only the substring after the last `://` is the actual reference.
#[must_use]
pub fn trim_runtime_scheme(image_id: &str) -> &str {
    image_id.rsplit("://").next().unwrap_or(image_id)
}

/// Resolve an image ID to the canonical registry host credentials are
/// keyed by.
///
/// Docker Hub aliases all resolve to [`DEFAULT_REGISTRY_KEY`]; any other
/// registry resolves to its hostname as parsed from the reference.
pub fn canonical_host(image_id: &str) -> Result<String, ReferenceError> {
    let trimmed = trim_runtime_scheme(image_id);
    let parsed: Reference = trimmed.parse().map_err(|source| ReferenceError::Parse {
        reference: trimmed.to_string(),
        source,
    })?;

    let registry = parsed.registry();
    if is_docker_hub_alias(registry) {
        Ok(DEFAULT_REGISTRY_KEY.to_string())
    } else {
        Ok(registry.to_string())
    }
}

/// Reduce a server address to a bare hostname for comparison: drop the
/// scheme prefix and anything after the first path separator. Matches the
/// Docker client's credential lookup normalization.
#[must_use]
pub fn convert_to_hostname(server: &str) -> &str {
    let stripped = server
        .strip_prefix("https://")
        .or_else(|| server.strip_prefix("http://"))
        .unwrap_or(server);
    stripped.split('/').next().unwrap_or(stripped)
}

/// Whether a server address names Docker Hub under any of its aliases.
#[must_use]
pub fn is_docker_hub_alias(server: &str) -> bool {
    DOCKER_HUB_ALIASES.contains(&convert_to_hostname(server))
}
