//! # Credential Resolution Tests
//!
//! End-to-end coverage of the registry credential path over the public
//! API: pull-secret decoding, canonical registry keys, proxy rewriting
//! and aggregation across ordered secret lists.

use std::collections::BTreeMap;

use kube_registry_creds::constants::DEFAULT_REGISTRY_KEY;
use kube_registry_creds::oci::reference::canonical_host;
use kube_registry_creds::oci::resolve::{convert_pull_secrets, resolve_auth_config};
use kube_registry_creds::oci::{config, proxy};
use kube_registry_creds::{NormalizedAuth, ProxyMap, RegistryImage, SecretFormat, SecretRecord};

fn modern_secret(name: &str, payload: &str) -> SecretRecord {
    SecretRecord {
        name: name.to_string(),
        format: SecretFormat::Modern,
        payload: payload.as_bytes().to_vec(),
    }
}

fn image(image_id: &str, pull_secrets: Vec<SecretRecord>) -> RegistryImage {
    RegistryImage {
        image: image_id.to_string(),
        image_id: image_id.to_string(),
        pull_secrets,
    }
}

const HUB_PAYLOAD: &str =
    r#"{"auths":{"https://index.docker.io/v1/":{"username":"u","password":"p"}}}"#;

#[test]
fn test_hub_image_resolves_through_runtime_prefix() {
    // the concrete scenario from the interface contract: a
    // dockerconfigjson secret plus a docker:// image ID
    let image = image("docker://nginx:latest", vec![modern_secret("hub", HUB_PAYLOAD)]);
    let credentials = convert_pull_secrets(&image, &ProxyMap::new());

    assert_eq!(
        credentials,
        vec![NormalizedAuth {
            username: "u".to_string(),
            password: "p".to_string(),
            token: String::new(),
            server_address: DEFAULT_REGISTRY_KEY.to_string(),
        }]
    );
}

#[test]
fn test_hub_alias_equivalence_law() {
    let references = [
        "nginx:latest",
        "docker.io/library/nginx:latest",
        "index.docker.io/library/nginx:latest",
        "registry-1.docker.io/library/nginx:latest",
        "docker://nginx:latest",
    ];

    for reference in references {
        assert_eq!(
            canonical_host(reference).unwrap(),
            DEFAULT_REGISTRY_KEY,
            "{reference} should resolve to the default registry key"
        );
    }
}

#[test]
fn test_empty_pull_secret_list_yields_empty_credentials() {
    let image = image("docker://nginx:latest", Vec::new());
    assert!(convert_pull_secrets(&image, &ProxyMap::new()).is_empty());
}

#[test]
fn test_order_preserved_across_secrets() {
    let first = r#"{"auths":{"https://index.docker.io/v1/":{"username":"first","password":"1"}}}"#;
    let second = r#"{"auths":{"docker.io":{"username":"second","password":"2"}}}"#;
    let image = image(
        "docker://nginx:latest",
        vec![modern_secret("a", first), modern_secret("b", second)],
    );

    let credentials = convert_pull_secrets(&image, &ProxyMap::new());
    let usernames: Vec<_> = credentials.iter().map(|c| c.username.as_str()).collect();
    assert_eq!(usernames, ["first", "second"]);
}

#[test]
fn test_legacy_format_secret_resolves() {
    use base64::{engine::general_purpose, Engine as _};

    let encoded = general_purpose::STANDARD.encode("legacy-user:legacy-pass");
    let payload =
        format!(r#"{{"https://index.docker.io/v1/":{{"auth":"{encoded}","email":"x@y.z"}}}}"#);
    let image = image(
        "docker://nginx:latest",
        vec![SecretRecord {
            name: "legacy".to_string(),
            format: SecretFormat::Legacy,
            payload: payload.into_bytes(),
        }],
    );

    let credentials = convert_pull_secrets(&image, &ProxyMap::new());
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].username, "legacy-user");
    assert_eq!(credentials[0].password, "legacy-pass");
}

#[test]
fn test_broken_secret_is_skipped_not_fatal() {
    let image = image(
        "docker://nginx:latest",
        vec![
            modern_secret("broken", "{invalid"),
            modern_secret("hub", HUB_PAYLOAD),
        ],
    );

    let credentials = convert_pull_secrets(&image, &ProxyMap::new());
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].username, "u");
}

#[test]
fn test_unparsable_image_reference_contributes_nothing() {
    let image = image("", vec![modern_secret("hub", HUB_PAYLOAD)]);
    assert!(convert_pull_secrets(&image, &ProxyMap::new()).is_empty());
}

#[test]
fn test_proxy_rewrite_via_hub_alias() {
    // the rule names registry-1.docker.io; the resolved record carries the
    // default registry key, a different Hub alias
    let map = ProxyMap::from([(
        "registry-1.docker.io".to_string(),
        "mirror.internal".to_string(),
    )]);
    let image = image("docker://nginx:latest", vec![modern_secret("hub", HUB_PAYLOAD)]);

    let credentials = convert_pull_secrets(&image, &map);
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].server_address, "mirror.internal");
}

#[test]
fn test_proxy_rewrite_idempotence() {
    let map = ProxyMap::from([(
        "registry-1.docker.io".to_string(),
        "mirror.internal".to_string(),
    )]);
    let mut auth = NormalizedAuth {
        username: "u".to_string(),
        password: "p".to_string(),
        token: String::new(),
        server_address: DEFAULT_REGISTRY_KEY.to_string(),
    };

    proxy::rewrite(&mut auth, &map);
    let once = auth.clone();
    proxy::rewrite(&mut auth, &map);

    assert_eq!(auth, once);
    assert_eq!(auth.server_address, "mirror.internal");
}

#[test]
fn test_modern_payload_round_trip() {
    let payload = r#"{"auths":{"ghcr.io":{"username":"a","password":"b"},"https://index.docker.io/v1/":{"username":"u","password":"p"}}}"#;
    let decoded = config::decode(&modern_secret("hub", payload)).unwrap();

    let reencoded = config::encode_modern(&decoded).unwrap();
    let redecoded = config::decode(&SecretRecord {
        name: "round-trip".to_string(),
        format: SecretFormat::Modern,
        payload: reencoded,
    })
    .unwrap();

    let triples = |auths: &BTreeMap<String, NormalizedAuth>| -> Vec<(String, String, String)> {
        auths
            .values()
            .map(|a| (a.username.clone(), a.password.clone(), a.server_address.clone()))
            .collect()
    };
    assert_eq!(triples(&decoded), triples(&redecoded));
}

#[test]
fn test_single_credential_compatibility_path() {
    let image = image(
        "docker://nginx:latest",
        vec![
            modern_secret("broken", "{invalid"),
            modern_secret("hub", HUB_PAYLOAD),
        ],
    );

    let auth = resolve_auth_config(&image);
    assert_eq!(auth.username, "u");

    let anonymous = resolve_auth_config(&self::image("docker://nginx:latest", Vec::new()));
    assert_eq!(anonymous, NormalizedAuth::default());
}
