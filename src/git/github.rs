//! # GitHub App token exchange
//!
//! A GitHub App authenticates by signing a short-lived JWT with its
//! private key and exchanging it for an installation access token. The
//! exchange is a network round trip that can fail independently of the
//! strategy being configured; such a failure aborts the calling Git
//! operation rather than falling back to a weaker strategy.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::GITHUB_API_BASE;
use crate::git::auth::ResolvedGitAuth;

/// Error type for the App token exchange.
#[derive(Debug, Error)]
pub enum AuthExchangeError {
    #[error("app token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("installation token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("installation token request rejected with {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// GitHub App credentials: App ID, Installation ID and PEM private key.
#[derive(Clone)]
pub struct GitHubAppAuth {
    app_id: String,
    installation_id: String,
    private_key: String,
    api_base: String,
}

impl std::fmt::Debug for GitHubAppAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // the private key stays out of debug output
        f.debug_struct("GitHubAppAuth")
            .field("app_id", &self.app_id)
            .field("installation_id", &self.installation_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Debug, Deserialize)]
struct InstallationToken {
    token: String,
}

impl GitHubAppAuth {
    pub fn new(
        app_id: impl Into<String>,
        installation_id: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            installation_id: installation_id.into(),
            private_key: private_key.into(),
            api_base: GITHUB_API_BASE.to_string(),
        }
    }

    /// Point the exchange at a GitHub Enterprise API endpoint.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// All three inputs must be present for the strategy to be usable.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.app_id.is_empty() && !self.installation_id.is_empty() && !self.private_key.is_empty()
    }

    /// Sign the app JWT. Issued-at is backdated 60 seconds against clock
    /// drift; GitHub caps the lifetime at 10 minutes.
    fn sign_app_jwt(&self) -> Result<String, AuthExchangeError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        let now = Utc::now().timestamp();
        let claims = AppClaims {
            iat: now - 60,
            exp: now + 540,
            iss: self.app_id.clone(),
        };
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    /// Exchange the signed app JWT for an installation access token.
    pub async fn exchange(&self) -> Result<ResolvedGitAuth, AuthExchangeError> {
        let jwt = self.sign_app_jwt()?;
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.api_base, self.installation_id
        );

        let response = reqwest::Client::new()
            .post(&url)
            .bearer_auth(jwt)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, "kube-registry-creds")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(AuthExchangeError::Api { status, message });
        }

        let body: InstallationToken = response.json().await?;
        Ok(ResolvedGitAuth {
            username: "x-access-token".to_string(),
            password: body.token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = include_str!("../../tests/fixtures/github-app-test-key.pem");

    #[test]
    fn test_is_configured_requires_all_fields() {
        assert!(GitHubAppAuth::new("1", "2", TEST_KEY).is_configured());
        assert!(!GitHubAppAuth::new("", "2", TEST_KEY).is_configured());
        assert!(!GitHubAppAuth::new("1", "", TEST_KEY).is_configured());
        assert!(!GitHubAppAuth::new("1", "2", "").is_configured());
    }

    #[test]
    fn test_sign_app_jwt_produces_compact_jwt() {
        let auth = GitHubAppAuth::new("12345", "67890", TEST_KEY);
        let jwt = auth.sign_app_jwt().unwrap();
        assert_eq!(jwt.split('.').count(), 3);
    }

    #[test]
    fn test_sign_app_jwt_rejects_garbage_key() {
        let auth = GitHubAppAuth::new("12345", "67890", "not a pem key");
        assert!(matches!(
            auth.sign_app_jwt().unwrap_err(),
            AuthExchangeError::Jwt(_)
        ));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let auth = GitHubAppAuth::new("12345", "67890", TEST_KEY);
        let printed = format!("{auth:?}");
        assert!(!printed.contains("PRIVATE KEY"));
    }
}
