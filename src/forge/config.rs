//! Configuration for the GitHub connection.
use secrecy::SecretString;

/// Default GitHub host.
pub const DEFAULT_HOST: &str = "github.com";

/// Connection to the manifests repository. Source repositories are reached
/// through the same client and default to the same owner.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Owner of the manifests repository.
    pub owner: String,
    /// Name of the manifests repository.
    pub repo: String,
    /// Access token for authentication.
    pub token: SecretString,
    /// Log write operations instead of performing them.
    pub dry_run: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            scheme: "https".to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            token: SecretString::from("".to_string()),
            dry_run: false,
        }
    }
}

impl RemoteConfig {
    /// REST API base URI for the configured host.
    pub fn api_base_uri(&self) -> String {
        if self.host == DEFAULT_HOST {
            format!("{}://api.{}", self.scheme, self.host)
        } else {
            // GitHub Enterprise Server
            format!("{}://{}/api/v3", self.scheme, self.host)
        }
    }

    /// Web URL of a repository, used for links in pull request bodies.
    pub fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!("{}://{}/{}/{}", self.scheme, self.host, owner, repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_remote_config() {
        let remote = RemoteConfig::default();
        assert_eq!(remote.host, DEFAULT_HOST);
        assert!(!remote.dry_run);
    }

    #[test]
    fn api_base_uri_for_github_and_enterprise() {
        let mut remote = RemoteConfig::default();
        assert_eq!(remote.api_base_uri(), "https://api.github.com");

        remote.host = "github.example.com".into();
        assert_eq!(remote.api_base_uri(), "https://github.example.com/api/v3");
    }

    #[test]
    fn repo_url_joins_owner_and_repo() {
        let remote = RemoteConfig::default();
        assert_eq!(
            remote.repo_url("cds-snc", "notification-api"),
            "https://github.com/cds-snc/notification-api"
        );
    }
}
