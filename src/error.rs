//! Custom error types for manifest-release.

use thiserror::Error;

/// Main error type for manifest-release operations.
#[derive(Error, Debug)]
pub enum ManifestReleaseError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Remote lookups
    #[error("Not found: {path} in repository {repo}")]
    NotFound { repo: String, path: String },

    #[error("No reference to image '{image}' found in {path}")]
    PatternMismatch { image: String, path: String },

    // Network/API errors
    #[error("GitHub API error: {0}")]
    ApiError(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    // Parsing errors - automatic conversions via #[from]
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ManifestReleaseError
pub type Result<T> = std::result::Result<T, ManifestReleaseError>;

impl ManifestReleaseError {
    /// Create an API error with context
    pub fn api(msg: impl Into<String>) -> Self {
        Self::ApiError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a not found error for a path in a repository
    pub fn not_found(repo: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            repo: repo.into(),
            path: path.into(),
        }
    }

    /// Create a pattern mismatch error for an image reference
    pub fn pattern_mismatch(
        image: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::PatternMismatch {
            image: image.into(),
            path: path.into(),
        }
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for ManifestReleaseError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Implement From for octocrab errors (GitHub API)
impl From<octocrab::Error> for ManifestReleaseError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            _ => Self::ApiError(err.to_string()),
        }
    }
}
