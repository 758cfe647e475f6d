//! Configuration validation utilities.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Parse duration string using humantime.
///
/// Supports various formats: `30s`, `1m`, `500ms`, `1m30s`, etc.
///
/// # Examples
///
/// ```
/// use haproxy_check::config::parse_duration;
///
/// assert_eq!(parse_duration("30s").unwrap().as_secs(), 30);
/// assert_eq!(parse_duration("1m30s").unwrap().as_secs(), 90);
/// assert_eq!(parse_duration("500ms").unwrap().as_millis(), 500);
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("duration string is empty".to_string());
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Parse a strictly positive timeout.
pub fn parse_timeout(s: &str) -> Result<Duration, String> {
    let timeout = parse_duration(s)?;
    if timeout.is_zero() {
        return Err("timeout must be greater than zero".to_string());
    }
    Ok(timeout)
}

/// Split a comma-separated list, dropping blank entries.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand environment variables in a string.
/// Supports ${VAR} and ${VAR:-default} syntax.
pub fn expand_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: OnceLock<Regex> = OnceLock::new();

    let regex = ENV_VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("failed to compile env var regex")
    });

    regex
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_valid() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration(" 2m ").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("30").is_err());
    }

    #[test]
    fn test_parse_timeout_rejects_zero() {
        assert!(parse_timeout("0s").is_err());
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("unix:///run/haproxy/admin.sock, http://lb-1/stats,,"),
            vec!["unix:///run/haproxy/admin.sock", "http://lb-1/stats"]
        );
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let input = "urls: [/run/haproxy/admin.sock]";
        assert_eq!(expand_env_vars(input), input);
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        let result = expand_env_vars("admin_user: ${NONEXISTENT_HAPROXY_USER_12345:-stats}");
        assert_eq!(result, "admin_user: stats");
    }

    #[test]
    fn test_expand_env_vars_from_env() {
        // SAFETY: This test runs in isolation and only modifies a test-specific variable.
        unsafe {
            std::env::set_var("TEST_HAPROXY_PASS_EXPAND", "s3cret");
        }
        let result = expand_env_vars("admin_pass: ${TEST_HAPROXY_PASS_EXPAND}");
        assert_eq!(result, "admin_pass: s3cret");
        // SAFETY: Cleanup test variable.
        unsafe {
            std::env::remove_var("TEST_HAPROXY_PASS_EXPAND");
        }
    }
}
