//! # OCI credential resolution
//!
//! Decoding of Kubernetes image pull secrets into normalized per-registry
//! auth records, canonical registry key resolution for image references,
//! proxy/mirror host rewriting, and the aggregation that ties the three
//! together per image.

pub mod config;
pub mod proxy;
pub mod reference;
pub mod resolve;
pub mod types;
