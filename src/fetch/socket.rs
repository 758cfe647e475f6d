//! Admin socket fetcher.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

use crate::fetch::{FeedFetcher, FetchError, SHOW_STAT_COMMAND, read_limited, with_timeout};

/// Queries the HAProxy admin socket with `show stat`.
#[derive(Debug, Clone)]
pub struct SocketFetcher {
    path: PathBuf,
    timeout: Duration,
    max_bytes: u64,
}

impl SocketFetcher {
    pub fn new(path: PathBuf, timeout: Duration, max_bytes: u64) -> Self {
        Self {
            path,
            timeout,
            max_bytes,
        }
    }

    async fn query(&self, target: &str) -> Result<Vec<u8>, FetchError> {
        let io_error = |source| FetchError::Io {
            target: target.to_string(),
            source,
        };

        let mut stream = UnixStream::connect(&self.path).await.map_err(io_error)?;
        stream.write_all(SHOW_STAT_COMMAND).await.map_err(io_error)?;
        tracing::trace!(feed = target, "Stats command sent");

        read_limited(stream, self.max_bytes, target).await
    }
}

#[async_trait::async_trait]
impl FeedFetcher for SocketFetcher {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let target = self.describe();
        let data = with_timeout(self.timeout, &target, self.query(&target)).await?;
        tracing::debug!(feed = %target, bytes = data.len(), "Feed read from socket");
        Ok(data)
    }

    fn describe(&self) -> String {
        format!("unix://{}", self.path.display())
    }
}
