//! Feed retrieval.
//!
//! - [`FeedSource`]: where a stats dump lives (admin socket, file, stats page)
//! - [`FeedFetcher`]: one implementation per transport, chosen by [`fetcher_for`]
//!
//! Every fetch is bounded in size and time; an oversized feed is an error,
//! never a silently truncated dump.

mod error;
mod file;
mod http;
#[cfg(unix)]
mod socket;
mod source;

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

pub use error::FetchError;
pub use file::FileFetcher;
pub use http::HttpFetcher;
#[cfg(unix)]
pub use socket::SocketFetcher;
pub use source::{FeedSource, LOCAL_HOST, stats_url};

use crate::config::CheckConfig;

/// Command sent to the admin socket.
pub const SHOW_STAT_COMMAND: &[u8] = b"show stat\n";

/// Retrieves raw stats feed bytes from one source.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Read the complete feed.
    async fn fetch(&self) -> Result<Vec<u8>, FetchError>;

    /// Human-readable location, safe to log.
    fn describe(&self) -> String;
}

/// Build the fetcher for a source using the configured limits and credentials.
pub fn fetcher_for(
    source: &FeedSource,
    config: &CheckConfig,
) -> Result<Box<dyn FeedFetcher>, FetchError> {
    let fetcher: Box<dyn FeedFetcher> = match source {
        #[cfg(unix)]
        FeedSource::Socket(path) => Box::new(SocketFetcher::new(
            path.clone(),
            config.timeout,
            config.max_feed_bytes,
        )),
        #[cfg(not(unix))]
        FeedSource::Socket(_) => return Err(FetchError::UnsupportedScheme("unix".to_string())),
        FeedSource::File(path) => Box::new(FileFetcher::new(
            path.clone(),
            config.timeout,
            config.max_feed_bytes,
        )),
        FeedSource::Http(url) => Box::new(HttpFetcher::new(url, config)?),
    };
    Ok(fetcher)
}

/// Read to EOF, failing once more than `limit` bytes arrive.
pub(crate) async fn read_limited<R>(
    reader: R,
    limit: u64,
    target: &str,
) -> Result<Vec<u8>, FetchError>
where
    R: AsyncRead + Unpin,
{
    let mut data = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut data)
        .await
        .map_err(|source| FetchError::Io {
            target: target.to_string(),
            source,
        })?;

    if data.len() as u64 > limit {
        return Err(FetchError::TooLarge {
            target: target.to_string(),
            limit,
        });
    }
    Ok(data)
}

/// Run a retrieval future under a deadline.
pub(crate) async fn with_timeout<F>(
    after: Duration,
    target: &str,
    fut: F,
) -> Result<Vec<u8>, FetchError>
where
    F: Future<Output = Result<Vec<u8>, FetchError>>,
{
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| FetchError::Timeout {
            target: target.to_string(),
            after,
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_limited_within_bound() {
        let data = read_limited(&b"abc"[..], 3, "test").await.unwrap();
        assert_eq!(data, b"abc");
    }

    #[tokio::test]
    async fn test_read_limited_over_bound() {
        let err = read_limited(&b"abcd"[..], 3, "test").await.unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { limit: 3, .. }));
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let err = with_timeout(Duration::from_millis(10), "slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { ref target, .. } if target == "slow"));
    }

    #[test]
    fn test_fetcher_for_describes_source() {
        let config = CheckConfig::default();

        let source = FeedSource::parse("file:///tmp/stats.csv").unwrap();
        let fetcher = fetcher_for(&source, &config).unwrap();
        assert_eq!(fetcher.describe(), "file:///tmp/stats.csv");

        let source = FeedSource::parse("http://lb-1/stats").unwrap();
        let fetcher = fetcher_for(&source, &config).unwrap();
        assert_eq!(fetcher.describe(), "http://lb-1/stats;csv");
    }

    #[cfg(unix)]
    #[test]
    fn test_fetcher_for_socket() {
        let config = CheckConfig::default();
        let source = FeedSource::parse("/run/haproxy/admin.sock").unwrap();
        let fetcher = fetcher_for(&source, &config).unwrap();
        assert_eq!(fetcher.describe(), "unix:///run/haproxy/admin.sock");
    }
}
