//! Warnings about production lagging behind the latest released versions.
use futures_util::future::try_join_all;
use log::*;
use regex::Regex;
use serde::Serialize;

use crate::{
    ManifestReleaseError, Result,
    config::staleness::StalenessCheckConfig,
    forge::{manager::ForgeManager, request::GetFileRequest},
};

/// Outcome of one staleness check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StalenessReport {
    pub repo: String,
    /// Version recorded as deployed.
    pub deployed: String,
    /// Latest tag, after prefix stripping.
    pub latest: Option<String>,
    pub stale: bool,
    pub message: String,
}

/// Reads the deployed version from file content, using the first capture
/// group of `pattern` when given.
pub fn extract_version(
    content: &str,
    pattern: Option<&Regex>,
    path: &str,
) -> Result<String> {
    let Some(re) = pattern else {
        return Ok(content.trim().to_string());
    };

    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .ok_or_else(|| ManifestReleaseError::pattern_mismatch(re.as_str(), path))
}

/// Strips `prefix` from the front of a tag name.
pub fn normalize_tag(tag: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => tag.strip_prefix(prefix).unwrap_or(tag).to_string(),
        None => tag.to_string(),
    }
}

/// Runs a single check against the forge.
pub async fn run_check(
    forge: &ForgeManager,
    check: &StalenessCheckConfig,
) -> Result<StalenessReport> {
    let owner = check.owner.as_deref().unwrap_or(forge.owner()).to_string();

    let file = forge
        .get_file(GetFileRequest {
            owner: owner.clone(),
            repo: check.repo.clone(),
            path: check.path.clone(),
            reference: None,
        })
        .await?;

    let pattern = check.compiled_pattern()?;
    let deployed = extract_version(&file.content, pattern.as_ref(), &check.path)?;

    let latest = forge
        .latest_tag(&owner, check.tag_repo())
        .await?
        .map(|tag| normalize_tag(&tag, check.strip_prefix.as_deref()));

    let stale = latest.as_ref().is_some_and(|latest| *latest != deployed);

    if stale {
        warn!(
            "{}: deployed version {deployed} is behind latest {:?}",
            check.repo, latest
        );
    } else {
        debug!("{}: deployed version {deployed} is current", check.repo);
    }

    Ok(StalenessReport {
        repo: check.repo.clone(),
        deployed,
        latest,
        stale,
        message: check.message.clone(),
    })
}

/// Runs every check concurrently and returns the warning messages of the
/// stale ones, in configuration order.
pub async fn stale_warnings(
    forge: &ForgeManager,
    checks: &[StalenessCheckConfig],
) -> Result<Vec<String>> {
    let reports =
        try_join_all(checks.iter().map(|check| run_check(forge, check))).await?;

    Ok(reports
        .into_iter()
        .filter(|r| r.stale)
        .map(|r| r.message)
        .collect())
}
