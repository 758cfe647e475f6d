//! Check configuration structures.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fetch::FeedSource;

use super::validation::{ConfigError, expand_env_vars};

// =============================================================================
// Constants
// =============================================================================

/// Default stats source: the local admin socket.
pub const DEFAULT_URL: &str = "unix:///run/haproxy/admin.sock";

/// Default retrieval timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound on a single feed (1 MiB).
pub const DEFAULT_MAX_FEED_BYTES: u64 = 1024 * 1024;

// =============================================================================
// TLS Configuration
// =============================================================================

/// TLS material for HTTPS stats pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// CA bundle; when set, it is the only trusted root.
    pub ca: Option<PathBuf>,

    /// Client certificate (PEM).
    pub cert: Option<PathBuf>,

    /// Client private key (PEM).
    pub key: Option<PathBuf>,

    /// Skip server certificate verification.
    pub insecure_skip_verify: bool,
}

// =============================================================================
// Check Configuration
// =============================================================================

/// Everything one check run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Stats sources, collected in order.
    pub urls: Vec<String>,

    /// Stats page user (basic auth).
    pub admin_user: Option<String>,

    /// Stats page password (basic auth).
    pub admin_pass: Option<String>,

    /// Host label override; defaults to each source's own host.
    pub host: Option<String>,

    /// Per-source retrieval timeout (default: 30s).
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Largest accepted feed in bytes (default: 1 MiB).
    pub max_feed_bytes: u64,

    /// TLS settings for HTTPS sources.
    pub tls: TlsConfig,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_URL.to_string()],
            admin_user: None,
            admin_pass: None,
            host: None,
            timeout: DEFAULT_TIMEOUT,
            max_feed_bytes: DEFAULT_MAX_FEED_BYTES,
            tls: TlsConfig::default(),
        }
    }
}

impl CheckConfig {
    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` and `${VAR:-default}` references are expanded before parsing.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            sources = config.urls.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(&expand_env_vars(content))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.urls.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one stats url is required".to_string(),
            ));
        }

        // Every url must map to a fetcher
        self.sources()?;

        match (&self.tls.cert, &self.tls.key) {
            (Some(_), None) => {
                return Err(ConfigError::ValidationError(
                    "tls.cert requires tls.key".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::ValidationError(
                    "tls.key requires tls.cert".to_string(),
                ));
            }
            _ => {}
        }

        if self.max_feed_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max_feed_bytes must be positive".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed stats sources, in configured order.
    pub fn sources(&self) -> Result<Vec<FeedSource>, ConfigError> {
        self.urls
            .iter()
            .map(|url| {
                FeedSource::parse(url).map_err(|e| {
                    ConfigError::ValidationError(format!("invalid stats url '{url}': {e}"))
                })
            })
            .collect()
    }

    /// Host label for a source: the configured override, else the source's own.
    pub fn host_for(&self, source: &FeedSource) -> String {
        match self.host.as_deref() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => source.default_host().to_string(),
        }
    }
}
