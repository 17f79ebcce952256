//! # Constants
//!
//! Shared constants used throughout the library.

/// Canonical lookup key representing Docker Hub, regardless of which
/// hostname alias appears in an image reference. Matches the key the
/// Docker client writes for Hub credentials.
pub const DEFAULT_REGISTRY_KEY: &str = "https://index.docker.io/v1/";

/// Hostname aliases that all refer to Docker Hub.
pub const DOCKER_HUB_ALIASES: [&str; 4] = [
    "docker.io",
    "index.docker.io",
    "registry-1.docker.io",
    "registry.hub.docker.com",
];

/// Secret type carrying a modern `auths`-wrapped docker config payload.
pub const SECRET_TYPE_DOCKER_CONFIG_JSON: &str = "kubernetes.io/dockerconfigjson";

/// Data key holding the payload in a `kubernetes.io/dockerconfigjson` secret.
pub const SECRET_KEY_DOCKER_CONFIG_JSON: &str = ".dockerconfigjson";

/// Secret type carrying a legacy dockercfg payload (bare top-level map).
pub const SECRET_TYPE_DOCKER_CFG: &str = "kubernetes.io/dockercfg";

/// Data key holding the payload in a `kubernetes.io/dockercfg` secret.
pub const SECRET_KEY_DOCKER_CFG: &str = ".dockercfg";

/// Default GitHub REST API endpoint for the App installation token exchange.
pub const GITHUB_API_BASE: &str = "https://api.github.com";
