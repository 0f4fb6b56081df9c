//! CLI argument parsing and GitHub remote configuration.
use clap::{Parser, Subcommand};
use git_url_parse::{GitUrl, Scheme};
use secrecy::SecretString;
use std::env;

use crate::{
    ManifestReleaseError, Result, config::DEFAULT_CONFIG_FILE,
    forge::config::RemoteConfig,
};

/// Environment variables searched for a token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "TOKEN"];

/// Global CLI arguments for the manifests repository and debugging.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "", global = true)]
    /// Manifests repository URL (https://github.com/owner/repo).
    pub github_repo: String,

    #[arg(long, default_value = "", global = true)]
    /// GitHub personal access token. Falls back to GITHUB_TOKEN, then TOKEN.
    pub github_token: String,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    /// Path to the configuration file.
    pub config: String,

    #[arg(long, default_value_t = false, global = true)]
    /// Log write operations instead of performing them.
    pub dry_run: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Release operation subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Update manifests to the latest source commits and open a draft
    /// release pull request.
    ReleasePr,

    /// Print the pending manifest changes and pull request body as JSON
    /// without writing anything.
    Plan {
        #[arg(long)]
        /// Write the JSON to this file instead of stdout.
        out_file: Option<String>,
    },
}

impl Args {
    /// Configure the manifests repository connection from CLI arguments.
    pub fn get_remote(&self) -> Result<RemoteConfig> {
        if self.github_repo.is_empty() {
            return Err(ManifestReleaseError::InvalidArgs(
                "must set --github-repo".into(),
            ));
        }

        get_github_remote(&self.github_repo, &self.github_token, self.dry_run)
    }
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: Scheme) -> Result<()> {
    match scheme {
        Scheme::Http => Ok(()),
        Scheme::Https => Ok(()),
        _ => Err(ManifestReleaseError::InvalidArgs(
            "only http and https schemes are supported for repo urls".into(),
        )),
    }
}

/// Token from the flag, then the URL, then the environment.
fn resolve_token(flag: &str, url_token: Option<String>) -> Option<String> {
    if !flag.is_empty() {
        return Some(flag.to_string());
    }

    if let Some(token) = url_token.filter(|t| !t.is_empty()) {
        return Some(token);
    }

    TOKEN_ENV_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|token| !token.is_empty())
}

/// Configure GitHub remote with URL parsing and token resolution.
fn get_github_remote(
    github_repo: &str,
    github_token: &str,
    dry_run: bool,
) -> Result<RemoteConfig> {
    let parsed = GitUrl::parse(github_repo)?;

    validate_scheme(parsed.scheme)?;

    let token = resolve_token(github_token, parsed.token).ok_or_else(|| {
        ManifestReleaseError::InvalidArgs("must set github token".into())
    })?;

    let host = parsed.host.ok_or_else(|| {
        ManifestReleaseError::InvalidArgs(
            "unable to parse host from github repo".into(),
        )
    })?;

    let owner = parsed.owner.ok_or_else(|| {
        ManifestReleaseError::InvalidArgs(
            "unable to parse owner from github repo".into(),
        )
    })?;

    Ok(RemoteConfig {
        host,
        scheme: parsed.scheme.to_string(),
        owner,
        repo: parsed.name,
        token: SecretString::from(token),
        dry_run,
    })
}
