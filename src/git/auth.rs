//! # Git authenticator chain
//!
//! A fixed, closed set of authentication strategies queried in priority
//! order: personal access token, then basic username/password, then
//! GitHub App. The first strategy that reports itself configured produces
//! the transport credential; if none is configured the chain yields no
//! auth, which is valid for public remotes.
//!
//! The chain is an explicit value constructed by the caller and injected
//! wherever credentials are resolved; there is no process-global
//! authenticator registry.

use crate::git::github::{AuthExchangeError, GitHubAppAuth};

/// HTTP basic credential pair handed to the git transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGitAuth {
    pub username: String,
    pub password: String,
}

/// One authentication strategy and the configuration it needs.
#[derive(Debug, Clone)]
pub enum GitAuthenticator {
    /// Personal access token; rides in the username field with an empty
    /// password (`TOKEN:` over HTTP basic).
    Token { token: String },
    /// Plain username/password pair.
    Basic { username: String, password: String },
    /// GitHub App with a deferred installation-token exchange.
    GitHubApp(GitHubAppAuth),
}

impl GitAuthenticator {
    /// Idempotent availability predicate; never touches the network.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        match self {
            Self::Token { token } => !token.is_empty(),
            Self::Basic { username, password } => !username.is_empty() && !password.is_empty(),
            Self::GitHubApp(app) => app.is_configured(),
        }
    }

    /// Produce the transport credential. Only the GitHub App arm can fail,
    /// and only at its token-exchange step.
    pub async fn resolve(&self) -> Result<ResolvedGitAuth, AuthExchangeError> {
        match self {
            Self::Token { token } => Ok(ResolvedGitAuth {
                username: token.clone(),
                password: String::new(),
            }),
            Self::Basic { username, password } => Ok(ResolvedGitAuth {
                username: username.clone(),
                password: password.clone(),
            }),
            Self::GitHubApp(app) => app.exchange().await,
        }
    }
}

/// Priority-ordered list of authenticators, constructed once at
/// configuration time and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct GitAuthChain {
    authenticators: Vec<GitAuthenticator>,
}

impl GitAuthChain {
    #[must_use]
    pub fn new(authenticators: Vec<GitAuthenticator>) -> Self {
        Self { authenticators }
    }

    /// Build the default priority chain {token, basic, GitHub App} from
    /// flat configuration values. Empty values simply leave the
    /// corresponding strategy unconfigured.
    #[must_use]
    pub fn from_config(
        token: &str,
        username: &str,
        password: &str,
        github_app_id: &str,
        github_app_installation_id: &str,
        github_app_private_key: &str,
    ) -> Self {
        Self::new(vec![
            GitAuthenticator::Token {
                token: token.to_string(),
            },
            GitAuthenticator::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
            GitAuthenticator::GitHubApp(GitHubAppAuth::new(
                github_app_id,
                github_app_installation_id,
                github_app_private_key,
            )),
        ])
    }

    /// Resolve transport credentials from the first configured strategy.
    ///
    /// `Ok(None)` means no strategy is configured: anonymous access, not
    /// an error. A failure in a configured strategy (the GitHub App
    /// exchange) is fatal to the operation: no fallback to a
    /// lower-priority strategy once a higher-priority one claimed
    /// availability.
    pub async fn resolve(&self) -> Result<Option<ResolvedGitAuth>, AuthExchangeError> {
        for authenticator in &self.authenticators {
            if authenticator.is_configured() {
                return authenticator.resolve().await.map(Some);
            }
        }

        Ok(None)
    }
}
