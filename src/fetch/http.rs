//! Stats page fetcher.

use std::path::Path;
use std::time::Duration;

use reqwest::{Certificate, Client, Identity};
use url::Url;

use crate::config::{CheckConfig, TlsConfig};
use crate::fetch::{FeedFetcher, FetchError, stats_url};

/// Fetches the CSV export of the HAProxy stats page over HTTP(S).
pub struct HttpFetcher {
    client: Client,
    url: Url,
    credentials: Option<(String, String)>,
    timeout: Duration,
    max_bytes: u64,
}

impl HttpFetcher {
    /// Build a client for `url` with the configured TLS material and credentials.
    ///
    /// # Errors
    /// Returns [`FetchError::Io`] or [`FetchError::Tls`] when TLS files cannot be
    /// loaded, and [`FetchError::Http`] if the client cannot be built.
    pub fn new(url: &Url, config: &CheckConfig) -> Result<Self, FetchError> {
        let builder = Client::builder().timeout(config.timeout);
        let client = apply_tls(builder, &config.tls)?.build()?;

        let credentials = match (&config.admin_user, &config.admin_pass) {
            (None, None) => None,
            (user, pass) => Some((
                user.clone().unwrap_or_default(),
                pass.clone().unwrap_or_default(),
            )),
        };

        Ok(Self {
            client,
            url: stats_url(url),
            credentials,
            timeout: config.timeout,
            max_bytes: config.max_feed_bytes,
        })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                target: self.describe(),
                after: self.timeout,
            }
        } else {
            FetchError::Http(err.without_url())
        }
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("url", &self.describe())
            .field("timeout", &self.timeout)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, FetchError> {
    std::fs::read(path).map_err(|source| FetchError::Io {
        target: path.display().to_string(),
        source,
    })
}

fn tls_error(path: &Path) -> impl FnOnce(reqwest::Error) -> FetchError + '_ {
    move |source| FetchError::Tls {
        path: path.display().to_string(),
        source,
    }
}

/// Apply the CA trust store, client identity and verification settings.
fn apply_tls(
    mut builder: reqwest::ClientBuilder,
    tls: &TlsConfig,
) -> Result<reqwest::ClientBuilder, FetchError> {
    if let Some(ca) = &tls.ca {
        let cert = Certificate::from_pem(&read_pem(ca)?).map_err(tls_error(ca))?;
        // Only the configured CA is trusted
        builder = builder
            .tls_built_in_root_certs(false)
            .add_root_certificate(cert);
    }

    if let (Some(cert), Some(key)) = (&tls.cert, &tls.key) {
        let mut pem = read_pem(cert)?;
        if !pem.ends_with(b"\n") {
            pem.push(b'\n');
        }
        pem.extend(read_pem(key)?);
        let identity = Identity::from_pem(&pem).map_err(tls_error(cert))?;
        builder = builder.identity(identity);
    }

    if tls.insecure_skip_verify {
        tracing::warn!("TLS certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder)
}

#[async_trait::async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let mut request = self.client.get(self.url.clone());
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let mut response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::Status {
                url: self.describe(),
                status: status.as_u16(),
            });
        }

        let too_large = || FetchError::TooLarge {
            target: self.describe(),
            limit: self.max_bytes,
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes)
        {
            return Err(too_large());
        }

        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if (data.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(too_large());
            }
            data.extend_from_slice(&chunk);
        }

        tracing::debug!(
            feed = %self.describe(),
            status = status.as_u16(),
            bytes = data.len(),
            "Feed read from stats page"
        );
        Ok(data)
    }

    fn describe(&self) -> String {
        let mut shown = self.url.clone();
        let _ = shown.set_password(None);
        shown.to_string()
    }
}
