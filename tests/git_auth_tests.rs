//! # Git Auth Chain Tests
//!
//! Strategy selection over the public API: priority order, availability
//! predicates, anonymous fallback and the GitHub App failure mode.

use kube_registry_creds::{GitAuthChain, GitAuthenticator, GitHubAppAuth, ResolvedGitAuth};

const TEST_KEY: &str = include_str!("fixtures/github-app-test-key.pem");

#[tokio::test]
async fn test_token_outranks_everything() {
    let chain = GitAuthChain::from_config("tok", "user", "pass", "1", "2", TEST_KEY);
    let auth = chain.resolve().await.unwrap().unwrap();

    assert_eq!(
        auth,
        ResolvedGitAuth {
            username: "tok".to_string(),
            password: String::new(),
        }
    );
}

#[tokio::test]
async fn test_basic_outranks_github_app() {
    let chain = GitAuthChain::from_config("", "user", "pass", "1", "2", TEST_KEY);
    let auth = chain.resolve().await.unwrap().unwrap();

    assert_eq!(auth.username, "user");
    assert_eq!(auth.password, "pass");
}

#[tokio::test]
async fn test_no_strategy_configured_means_anonymous() {
    let chain = GitAuthChain::from_config("", "", "", "", "", "");
    assert!(chain.resolve().await.unwrap().is_none());
}

#[tokio::test]
async fn test_resolution_is_repeatable() {
    // the chain never mutates strategy state; every query yields the same
    // selection
    let chain = GitAuthChain::from_config("tok", "", "", "", "", "");
    let first = chain.resolve().await.unwrap();
    let second = chain.resolve().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_github_app_with_bad_key_fails_without_fallback() {
    let basic = GitAuthenticator::Basic {
        username: "fallback".to_string(),
        password: "pass".to_string(),
    };
    // custom order: the App outranks basic here; its signing failure must
    // abort resolution instead of degrading to the weaker strategy
    let chain = GitAuthChain::new(vec![
        GitAuthenticator::GitHubApp(GitHubAppAuth::new("1", "2", "not a pem key")),
        basic,
    ]);

    assert!(chain.resolve().await.is_err());
}

#[tokio::test]
async fn test_partially_configured_strategies_are_skipped() {
    // basic without a password and an App without an installation ID both
    // leave the chain anonymous
    let chain = GitAuthChain::new(vec![
        GitAuthenticator::Basic {
            username: "user".to_string(),
            password: String::new(),
        },
        GitAuthenticator::GitHubApp(GitHubAppAuth::new("1", "", TEST_KEY)),
    ]);

    assert!(chain.resolve().await.unwrap().is_none());
}
