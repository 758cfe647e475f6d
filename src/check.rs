//! Check orchestration.
//!
//! Wires the pipeline together: fetch, parse, load, dispatch, record and
//! render. A run either produces a complete exposition or an error; samples
//! are only recorded once every metric of a feed dispatched successfully.

use strum_macros::{Display, EnumIter, FromRepr, IntoStaticStr};
use thiserror::Error;

use crate::config::{CheckConfig, ConfigError};
use crate::dispatch::{DispatchError, MetricDispatcher};
use crate::exposition::{Exposition, ExpositionError};
use crate::feed::{FeedError, StatsFeed};
use crate::fetch::{FetchError, fetcher_for};
use crate::storage::{StatsStore, StorageError};

/// Monitoring-plugin status of a check run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr, IntoStaticStr,
)]
#[repr(u8)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CheckStatus {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl CheckStatus {
    /// Process exit code for this status.
    pub fn exit_code(self) -> u8 {
        self as u8
    }
}

/// Any failure of a check run.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Exposition(#[from] ExpositionError),
}

impl CheckError {
    /// Status reported for this failure.
    pub fn status(&self) -> CheckStatus {
        match self {
            Self::Config(_) => CheckStatus::Unknown,
            Self::Fetch(_) => CheckStatus::Critical,
            Self::Feed(_) | Self::Storage(_) | Self::Dispatch(_) | Self::Exposition(_) => {
                CheckStatus::Warning
            }
        }
    }
}

/// Parse a raw feed and load it into a fresh store.
pub async fn ingest(data: &[u8]) -> Result<StatsStore, CheckError> {
    let feed = StatsFeed::parse(data)?;
    tracing::debug!(
        columns = feed.columns().len(),
        rows = feed.rows().len(),
        "Feed parsed"
    );
    Ok(StatsStore::load(&feed).await?)
}

/// Ingest one feed and record all of its samples into `exposition`.
///
/// Nothing is recorded unless every metric dispatches. Returns the number of
/// samples recorded.
pub async fn collect_into(
    exposition: &mut Exposition,
    data: &[u8],
    host: &str,
) -> Result<usize, CheckError> {
    let store = ingest(data).await?;
    let dispatched = MetricDispatcher::new(&store, host).dispatch_all().await;
    store.close().await;

    let samples = dispatched?;
    exposition.record_all(&samples)?;
    Ok(samples.len())
}

/// Render the exposition for a single feed.
pub async fn collect(data: &[u8], host: &str) -> Result<String, CheckError> {
    let mut exposition = Exposition::new();
    collect_into(&mut exposition, data, host).await?;
    Ok(exposition.render()?)
}

/// Run a full check: fetch every configured source in order, then render once.
pub async fn execute(config: &CheckConfig) -> Result<String, CheckError> {
    config.validate()?;

    let mut exposition = Exposition::new();
    for source in config.sources()? {
        let fetcher = fetcher_for(&source, config)?;
        let data = fetcher.fetch().await?;
        let host = config.host_for(&source);

        let samples = collect_into(&mut exposition, &data, &host).await?;
        tracing::info!(feed = %fetcher.describe(), host = %host, samples, "Source collected");
    }

    Ok(exposition.render()?)
}
