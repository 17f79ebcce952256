//! # kube-registry-creds
//!
//! Credential resolution for tooling that pushes to Git remotes and pulls
//! container images referenced by Kubernetes workloads (GitOps writers,
//! image auditors/scanners).
//!
//! Two resolution paths:
//!
//! - **Registry credentials**: decode the image pull secrets attached to a
//!   workload (both docker config formats) into normalized per-registry
//!   auth records, with Docker Hub hostname aliasing and optional
//!   proxy/mirror substitution ([`oci`]).
//! - **Git credentials**: query a priority-ordered chain of
//!   authentication strategies (token, basic, GitHub App) and hand the
//!   first usable credential to the working-tree wrapper ([`git`]).
//!
//! The [`kubernetes`] module supplies the list/watch plumbing that feeds
//! pull secrets and image references into the resolution paths.

pub mod constants;
pub mod git;
pub mod kubernetes;
pub mod oci;
pub mod util;

pub use git::auth::{GitAuthChain, GitAuthenticator, ResolvedGitAuth};
pub use git::github::{AuthExchangeError, GitHubAppAuth};
pub use git::GitWorkspace;
pub use oci::types::{NormalizedAuth, ProxyMap, RegistryImage, SecretFormat, SecretRecord};
