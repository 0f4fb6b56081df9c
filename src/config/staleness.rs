use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{ManifestReleaseError, Result};

/// Compares the version deployed in production, as recorded in a file, with
/// the latest tag of a repository.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessCheckConfig {
    /// Repository holding the recorded production version.
    pub repo: String,
    /// Owner of `repo` (defaults to the manifests owner).
    pub owner: Option<String>,
    /// File recording the production version.
    pub path: String,
    /// Optional regex extracting the version from the file (first capture
    /// group). The whole trimmed file is used when absent.
    pub pattern: Option<String>,
    /// Repository whose latest tag is the reference (defaults to `repo`).
    pub tag_repo: Option<String>,
    /// Prefix stripped from the latest tag before comparing, e.g. `v`.
    pub strip_prefix: Option<String>,
    /// Warning rendered at the top of the pull request body when stale.
    pub message: String,
}

impl StalenessCheckConfig {
    pub fn tag_repo(&self) -> &str {
        self.tag_repo.as_deref().unwrap_or(&self.repo)
    }

    /// Compiles the extraction pattern, if any.
    pub fn compiled_pattern(&self) -> Result<Option<Regex>> {
        self.pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(ManifestReleaseError::from)
    }

    pub fn validate(&self) -> Result<()> {
        if self.repo.is_empty() || self.path.is_empty() {
            return Err(ManifestReleaseError::invalid_config(
                "staleness checks require repo and path",
            ));
        }

        if self.message.is_empty() {
            return Err(ManifestReleaseError::invalid_config(format!(
                "staleness check for {}/{} requires a message",
                self.repo, self.path
            )));
        }

        if let Some(re) = self.compiled_pattern()?
            && re.captures_len() < 2
        {
            return Err(ManifestReleaseError::invalid_config(format!(
                "staleness pattern for {}/{} must contain a capture group",
                self.repo, self.path
            )));
        }

        Ok(())
    }
}
