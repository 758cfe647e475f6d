//! Saved-dump fetcher.

use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::{FeedFetcher, FetchError, read_limited, with_timeout};

/// Reads a stats dump previously saved to disk.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    path: PathBuf,
    timeout: Duration,
    max_bytes: u64,
}

impl FileFetcher {
    pub fn new(path: PathBuf, timeout: Duration, max_bytes: u64) -> Self {
        Self {
            path,
            timeout,
            max_bytes,
        }
    }

    async fn read(&self, target: &str) -> Result<Vec<u8>, FetchError> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                target: target.to_string(),
                source,
            })?;
        read_limited(file, self.max_bytes, target).await
    }
}

#[async_trait::async_trait]
impl FeedFetcher for FileFetcher {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let target = self.describe();
        let data = with_timeout(self.timeout, &target, self.read(&target)).await?;
        tracing::debug!(feed = %target, bytes = data.len(), "Feed read from file");
        Ok(data)
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
