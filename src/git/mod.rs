//! # Git working-tree operations
//!
//! Thin wrapper over the `git` binary for the clone/checkout/commit/push
//! cycle GitOps writers need, with transport credentials resolved through
//! the injected authenticator chain per network operation. Credentials are
//! passed as a transient `http.extraHeader` so they never land in
//! `.git/config` or command output.

pub mod auth;
pub mod github;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

use self::auth::{GitAuthChain, ResolvedGitAuth};

/// Git working tree handle: a commit identity plus the authenticator
/// chain used for clone, pull and push.
#[derive(Debug, Clone)]
pub struct GitWorkspace {
    name: String,
    email: String,
    auth: GitAuthChain,
}

impl GitWorkspace {
    pub fn new(name: impl Into<String>, email: impl Into<String>, auth: GitAuthChain) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            auth,
        }
    }

    /// Clone the repository if `path` does not hold one yet, force-checkout
    /// `branch`, and pull when the clone pre-existed. Being already up to
    /// date is not an error.
    pub async fn prepare_repository(&self, repo_url: &str, path: &Path, branch: &str) -> Result<()> {
        let path_arg = path.display().to_string();
        let cloned = !path.join(".git").exists();

        if cloned {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context(format!("Failed to create parent directory for {path_arg}"))?;
            }

            let auth = self.resolve_auth().await?;
            let mut args = auth_config_args(auth.as_ref());
            args.extend([
                "clone".to_string(),
                repo_url.to_string(),
                path_arg.clone(),
            ]);
            run_git(args, "clone").await?;
        }

        run_git(["-C", path_arg.as_str(), "checkout", "-f", branch], "checkout").await?;

        if !cloned {
            let auth = self.resolve_auth().await?;
            let mut args = vec!["-C".to_string(), path_arg.clone()];
            args.extend(auth_config_args(auth.as_ref()));
            args.extend(["pull".to_string(), "origin".to_string(), branch.to_string()]);
            run_git(args, "pull").await?;
        }

        debug!("Git repository at {} is prepared", path_arg);
        Ok(())
    }

    /// Stage everything and commit-and-push. A clean worktree is a no-op.
    pub async fn commit_all(&self, path: &Path, message: &str) -> Result<()> {
        if worktree_clean(path).await? {
            debug!("Git worktree is clean, skip commit");
            return Ok(());
        }

        let path_arg = path.display().to_string();
        run_git(["-C", path_arg.as_str(), "add", "-A", "."], "add").await?;
        self.commit_and_push_staged(path, message).await
    }

    /// Stage the removal of `target` inside the worktree.
    pub async fn remove(&self, worktree: &Path, target: &str) -> Result<()> {
        let worktree_arg = worktree.display().to_string();
        run_git(["-C", worktree_arg.as_str(), "rm", "-r", target], "rm").await?;
        Ok(())
    }

    /// Commit whatever is already staged and push. A clean worktree is a
    /// no-op.
    pub async fn commit_and_push(&self, path: &Path, message: &str) -> Result<()> {
        if worktree_clean(path).await? {
            debug!("Git worktree is clean, skip commit");
            return Ok(());
        }

        self.commit_and_push_staged(path, message).await
    }

    async fn commit_and_push_staged(&self, path: &Path, message: &str) -> Result<()> {
        let path_arg = path.display().to_string();
        let author_name = format!("user.name={}", self.name);
        let author_email = format!("user.email={}", self.email);

        run_git(
            [
                "-C",
                path_arg.as_str(),
                "-c",
                author_name.as_str(),
                "-c",
                author_email.as_str(),
                "commit",
                "-m",
                message,
            ],
            "commit",
        )
        .await?;

        let head = run_git(["-C", path_arg.as_str(), "rev-parse", "HEAD"], "rev-parse").await?;
        info!(
            "Created commit {}",
            String::from_utf8_lossy(&head.stdout).trim()
        );

        let auth = self.resolve_auth().await?;
        let mut args = vec!["-C".to_string(), path_arg];
        args.extend(auth_config_args(auth.as_ref()));
        args.push("push".to_string());
        run_git(args, "push").await?;

        info!("Push was successful");
        Ok(())
    }

    async fn resolve_auth(&self) -> Result<Option<ResolvedGitAuth>> {
        self.auth
            .resolve()
            .await
            .context("Git auth resolution failed")
    }
}

/// Transient per-invocation config injecting the credential as a basic
/// authorization header. Empty when the chain resolved to anonymous.
fn auth_config_args(auth: Option<&ResolvedGitAuth>) -> Vec<String> {
    match auth {
        Some(auth) => {
            let basic =
                general_purpose::STANDARD.encode(format!("{}:{}", auth.username, auth.password));
            vec![
                "-c".to_string(),
                format!("http.extraHeader=Authorization: Basic {basic}"),
            ]
        }
        None => Vec::new(),
    }
}

async fn worktree_clean(path: &Path) -> Result<bool> {
    let path_arg = path.display().to_string();
    let output = run_git(["-C", path_arg.as_str(), "status", "--porcelain"], "status").await?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Run a git subcommand; a non-zero exit becomes an error carrying the
/// subcommand name and stderr, never the full argument list (it can hold
/// an authorization header).
async fn run_git<I, S>(args: I, action: &str) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new("git")
        .args(args)
        .output()
        .await
        .context(format!("Failed to execute git {action}"))?;

    if !output.status.success() {
        bail!(
            "git {action} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(output)
}
