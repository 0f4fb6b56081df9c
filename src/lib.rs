//! Keeps container image tags in a Kubernetes manifests repository in step
//! with the head commits of the source repositories that build them, and
//! proposes every update as a draft pull request on GitHub.
pub mod changelog;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod forge;
pub mod manifest;
pub mod orchestrator;
pub mod staleness;

pub use error::{ManifestReleaseError, Result};

#[cfg(test)]
pub mod test_helpers;
