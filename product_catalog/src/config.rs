//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Base URL used when `CATALOG_API_BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Largest page size the client will ask for
pub const MAX_PAGE_SIZE: u32 = 100;

/// Complete client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API base URL without a trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// File holding the persisted session
    pub session_file: PathBuf,
    /// Page size used when a listing does not specify one
    pub default_page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            session_file: default_session_file(),
            default_page_size: 10,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `base_url_override` - Optional base URL override (from CLI args)
    /// * `session_file_override` - Optional session file override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but invalid
    pub fn from_env(
        base_url_override: Option<String>,
        session_file_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            base_url_override,
            session_file_override,
        )
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(
        lookup: F,
        base_url_override: Option<String>,
        session_file_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = base_url_override
            .or_else(|| lookup("CATALOG_API_BASE_URL"))
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        let session_file = session_file_override
            .or_else(|| lookup("CATALOG_SESSION_FILE").map(PathBuf::from))
            .unwrap_or(defaults.session_file);

        let config = ClientConfig {
            base_url,
            timeout_secs: parse_var(&lookup, "CATALOG_HTTP_TIMEOUT_SECS", defaults.timeout_secs)?,
            session_file,
            default_page_size: parse_var(
                &lookup,
                "CATALOG_DEFAULT_PAGE_SIZE",
                defaults.default_page_size,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "CATALOG_API_BASE_URL".to_string(),
                reason: format!("Must start with http:// or https:// (got {})", self.base_url),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "CATALOG_HTTP_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.default_page_size == 0 || self.default_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid {
                var: "CATALOG_DEFAULT_PAGE_SIZE".to_string(),
                reason: format!("Must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Session file under the user's config directory, or the working directory
fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("product-catalog").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".product-catalog-session.json"))
}

/// Parse a variable if present; an unparseable value is an error, not a default
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Could not parse {raw:?}"),
        }),
        None => Ok(default),
    }
}
