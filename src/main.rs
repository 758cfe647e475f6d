//! haproxy-check Binary Entry Point
//!
//! Runs a single check against one or more HAProxy instances and writes the
//! exposition text to stdout. Core functionality is provided by the
//! `haproxy_check` library crate.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use haproxy_check::{
    CheckConfig, CheckError, CheckStatus,
    config::{parse_timeout, split_list},
    execute,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// haproxy-check - HAProxy statistics as Prometheus gauges
#[derive(Parser, Debug)]
#[command(name = "haproxy-check", version, about, long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "HAPROXY_CHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Comma-separated stats sources (socket path, unix://, file://, http(s)://)
    #[arg(short, long, env = "HAPROXY_URLS")]
    urls: Option<String>,

    /// Stats page user
    #[arg(short, long, env = "HAPROXY_ADMIN_USER")]
    admin_user: Option<String>,

    /// Stats page password
    #[arg(short = 'p', long, env = "HAPROXY_ADMIN_PASS", hide_env_values = true)]
    admin_pass: Option<String>,

    /// CA bundle to trust for HTTPS sources
    #[arg(long, env = "HAPROXY_TLS_CA")]
    tls_ca: Option<PathBuf>,

    /// Client certificate (PEM)
    #[arg(long, env = "HAPROXY_TLS_CERT")]
    tls_cert: Option<PathBuf>,

    /// Client private key (PEM)
    #[arg(long, env = "HAPROXY_TLS_KEY")]
    tls_key: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long, env = "HAPROXY_INSECURE_SKIP_VERIFY")]
    insecure_skip_verify: bool,

    /// Per-source retrieval timeout (e.g. 10s, 1m)
    #[arg(long, env = "HAPROXY_TIMEOUT", value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Largest accepted feed in bytes
    #[arg(long, env = "HAPROXY_MAX_FEED_BYTES")]
    max_feed_bytes: Option<u64>,

    /// Host label for every sample (defaults to each source's host)
    #[arg(long, env = "HAPROXY_HOST")]
    host: Option<String>,
}

impl Cli {
    /// Build the effective configuration (CLI > ENV > config file > defaults).
    fn into_config(self) -> Result<CheckConfig, CheckError> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading configuration");
                CheckConfig::load(path)?
            }
            None => CheckConfig::default(),
        };

        if let Some(urls) = self.urls {
            config.urls = split_list(&urls);
        }
        if let Some(user) = self.admin_user {
            config.admin_user = Some(user);
        }
        if let Some(pass) = self.admin_pass {
            config.admin_pass = Some(pass);
        }
        if let Some(ca) = self.tls_ca {
            config.tls.ca = Some(ca);
        }
        if let Some(cert) = self.tls_cert {
            config.tls.cert = Some(cert);
        }
        if let Some(key) = self.tls_key {
            config.tls.key = Some(key);
        }
        if self.insecure_skip_verify {
            config.tls.insecure_skip_verify = true;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(max) = self.max_feed_bytes {
            config.max_feed_bytes = max;
        }
        if let Some(host) = self.host {
            config.host = Some(host);
        }

        config.validate()?;
        Ok(config)
    }
}

async fn run(cli: Cli) -> Result<String, CheckError> {
    let config = cli.into_config()?;
    tracing::debug!(
        sources = config.urls.len(),
        timeout = ?config.timeout,
        max_feed_bytes = config.max_feed_bytes,
        "Configuration resolved"
    );
    execute(&config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the exposition
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,haproxy_check=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(text) => {
            print!("{text}");
            ExitCode::from(CheckStatus::Ok.exit_code())
        }
        Err(e) => {
            let status = e.status();
            tracing::error!(%status, error = %e, "Check failed");
            println!("haproxy-check {status}: {e}");
            ExitCode::from(status.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = Cli::try_parse_from([
            "haproxy-check",
            "--urls",
            "http://lb-1/stats, /run/haproxy/admin.sock",
            "--admin-user",
            "stats",
            "--timeout",
            "5s",
            "--host",
            "edge-1",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        assert_eq!(config.urls, vec!["http://lb-1/stats", "/run/haproxy/admin.sock"]);
        assert_eq!(config.admin_user.as_deref(), Some("stats"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.host.as_deref(), Some("edge-1"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check.yaml");
        std::fs::write(&path, "urls: [\"http://lb-1/stats\"]\nadmin_user: file-user\n").unwrap();

        let cli = Cli::try_parse_from([
            "haproxy-check",
            "--config",
            path.to_str().unwrap(),
            "--admin-user",
            "cli-user",
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        assert_eq!(config.urls, vec!["http://lb-1/stats"]);
        assert_eq!(config.admin_user.as_deref(), Some("cli-user"));
    }

    #[test]
    fn test_cli_rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["haproxy-check", "--timeout", "0s"]).is_err());
    }

    #[test]
    fn test_cli_invalid_config_is_unknown() {
        let cli = Cli::try_parse_from(["haproxy-check", "--tls-cert", "client.pem"]).unwrap();
        let err = cli.into_config().unwrap_err();
        assert_eq!(err.status(), CheckStatus::Unknown);
    }
}
