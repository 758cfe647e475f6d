//! Configuration module for haproxy-check.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Stats sources (admin socket, saved dump, stats page)
//! - Stats page credentials and TLS material
//! - Retrieval limits (timeout, feed size)

mod check;
mod validation;

pub use check::{CheckConfig, TlsConfig};
pub use validation::{ConfigError, expand_env_vars, parse_duration, parse_timeout, split_list};

// Re-export constants
pub use check::{DEFAULT_MAX_FEED_BYTES, DEFAULT_TIMEOUT, DEFAULT_URL};
