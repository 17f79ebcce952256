//! # Credential aggregation
//!
//! Walks an image's ordered pull secrets and produces the normalized
//! credentials that match the image's registry. A failure decoding or
//! matching one secret never aborts the aggregation: the secret is logged
//! and skipped, and resolution continues with the rest of the list.

use thiserror::Error;
use tracing::{debug, warn};

use crate::oci::types::{NormalizedAuth, ProxyMap, RegistryImage, SecretRecord};
use crate::oci::{config, proxy, reference};

/// Error type for a single secret's resolution against one image.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Decode(#[from] config::DecodeError),
    #[error(transparent)]
    Reference(#[from] reference::ReferenceError),
}

/// Resolve the auth record a single pull secret provides for an image.
///
/// `Ok(None)` means the secret decoded fine but carries no entry for the
/// image's registry key, so it contributes nothing.
pub fn resolve_with_pull_secret(
    image: &RegistryImage,
    secret: &SecretRecord,
) -> Result<Option<NormalizedAuth>, ResolveError> {
    let auths = config::decode(secret)?;
    let host = reference::canonical_host(&image.image_id)?;
    Ok(config::auth_for_host(&auths, &host).cloned())
}

/// Resolve every credential the image's pull secrets provide, in pull
/// secret order, with the proxy map applied to each server address.
///
/// Never fails as a whole: per-secret failures are logged and skipped.
#[must_use]
pub fn convert_pull_secrets(image: &RegistryImage, proxy_map: &ProxyMap) -> Vec<NormalizedAuth> {
    let mut credentials = Vec::new();

    for secret in &image.pull_secrets {
        let mut auth = match resolve_with_pull_secret(image, secret) {
            Ok(Some(auth)) => auth,
            Ok(None) => {
                debug!(
                    "image: {}, secret {} has no entry for the image registry",
                    image.image_id, secret.name
                );
                continue;
            }
            Err(err) => {
                warn!(
                    "image: {}, read authentication configuration from secret: {} failed: {}",
                    image.image_id, secret.name, err
                );
                continue;
            }
        };

        proxy::rewrite(&mut auth, proxy_map);
        credentials.push(auth);
    }

    credentials
}

/// Single-credential compatibility path: the first successfully resolved
/// entry, or an empty (anonymous) record when nothing matches.
///
/// Kept for callers that predate list-valued resolution and still expect
/// exactly one credential. No proxy rewriting is applied here.
#[must_use]
pub fn resolve_auth_config(image: &RegistryImage) -> NormalizedAuth {
    for secret in &image.pull_secrets {
        match resolve_with_pull_secret(image, secret) {
            Ok(Some(auth)) => return auth,
            Ok(None) => {}
            Err(err) => {
                warn!(
                    "image: {}, read authentication configuration from secret: {} failed: {}",
                    image.image_id, secret.name, err
                );
            }
        }
    }

    NormalizedAuth::default()
}
