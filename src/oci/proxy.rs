//! # Proxy registry rewriting
//!
//! Substitutes a proxy/mirror host for the server address of a resolved
//! auth record, so operators can redirect pulls (Hub-bound ones in
//! particular) through an internal mirror.

use tracing::debug;

use crate::oci::reference::is_docker_hub_alias;
use crate::oci::types::{NormalizedAuth, ProxyMap};

/// Apply at most one substitution from the proxy map to the auth record.
///
/// An exact server-address match wins over Docker-Hub alias equivalence;
/// within each class the first rule in the map's sorted key order applies.
/// Alias equivalence lets a single Hub-named rule catch every Hub alias.
pub fn rewrite(auth: &mut NormalizedAuth, proxy_map: &ProxyMap) {
    if let Some(proxy) = proxy_map.get(&auth.server_address) {
        debug!(
            "Rewriting registry {} to proxy {}",
            auth.server_address, proxy
        );
        auth.server_address = proxy.clone();
        return;
    }

    if !is_docker_hub_alias(&auth.server_address) {
        return;
    }

    if let Some((source, proxy)) = proxy_map
        .iter()
        .find(|(source, _)| is_docker_hub_alias(source))
    {
        debug!(
            "Rewriting registry {} to proxy {} (Docker Hub alias {})",
            auth.server_address, proxy, source
        );
        auth.server_address = proxy.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_REGISTRY_KEY;

    fn auth(server: &str) -> NormalizedAuth {
        NormalizedAuth {
            username: "u".to_string(),
            password: "p".to_string(),
            token: String::new(),
            server_address: server.to_string(),
        }
    }

    #[test]
    fn test_exact_match() {
        let map = ProxyMap::from([("ghcr.io".to_string(), "mirror.internal".to_string())]);
        let mut record = auth("ghcr.io");
        rewrite(&mut record, &map);
        assert_eq!(record.server_address, "mirror.internal");
    }

    #[test]
    fn test_no_match_leaves_address_alone() {
        let map = ProxyMap::from([("ghcr.io".to_string(), "mirror.internal".to_string())]);
        let mut record = auth("quay.io");
        rewrite(&mut record, &map);
        assert_eq!(record.server_address, "quay.io");
    }

    #[test]
    fn test_hub_alias_equivalence() {
        // the rule names one Hub alias, the record carries another
        let map = ProxyMap::from([(
            "registry-1.docker.io".to_string(),
            "mirror.internal".to_string(),
        )]);
        let mut record = auth(DEFAULT_REGISTRY_KEY);
        rewrite(&mut record, &map);
        assert_eq!(record.server_address, "mirror.internal");
    }

    #[test]
    fn test_exact_match_wins_over_alias_match() {
        let map = ProxyMap::from([
            ("docker.io".to_string(), "alias-mirror.internal".to_string()),
            (
                DEFAULT_REGISTRY_KEY.to_string(),
                "exact-mirror.internal".to_string(),
            ),
        ]);
        let mut record = auth(DEFAULT_REGISTRY_KEY);
        rewrite(&mut record, &map);
        assert_eq!(record.server_address, "exact-mirror.internal");
    }

    #[test]
    fn test_rewrite_is_idempotent_once_settled() {
        let map = ProxyMap::from([(
            "registry-1.docker.io".to_string(),
            "mirror.internal".to_string(),
        )]);
        let mut record = auth("index.docker.io");
        rewrite(&mut record, &map);
        let once = record.clone();
        rewrite(&mut record, &map);
        assert_eq!(record, once);
    }
}
