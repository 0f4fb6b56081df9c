//! GitHub access for reading source repositories and writing to the
//! manifests repository.
//!
//! Provides token-based authentication, file contents, branch and commit
//! lookups, and pull request operations through a common trait.

/// Connection settings for the manifests repository.
pub mod config;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Dry-run aware wrapper around a [`traits::Forge`].
pub mod manager;

/// Request and response types shared by forge implementations.
pub mod request;

/// Common trait for forge platform abstraction.
pub mod traits;
