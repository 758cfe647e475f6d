//! haproxy-check - HAProxy statistics ingestion
//!
//! This crate turns HAProxy's `show stat` CSV dump into Prometheus-style
//! gauges. It can be used as a library, or run as a standalone monitoring
//! check with the `haproxy-check` executable.
//!
//! # Architecture
//!
//! - **Feed**: Header-driven parsing of the raw dump into typed cells
//! - **Storage**: Per-run in-memory SQLite table synthesized from the header
//! - **Mapping**: Native/canonical metric names, help text, instance types
//! - **Dispatch**: One tag-projecting query per metric
//! - **Exposition**: Private gauge registry rendered as exposition text
//! - **Fetch**: Admin socket, saved dump and stats page retrieval
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), haproxy_check::CheckError> {
//! let feed = b"# pxname,svname,act,bck,type\nweb,s1,1,0,2\n";
//! let store = haproxy_check::ingest(feed).await?;
//!
//! let samples = haproxy_check::MetricDispatcher::new(&store, "lb-1")
//!     .dispatch("active_servers")
//!     .await?;
//! assert_eq!(samples[0].tags.instance_type, "server");
//! # Ok(())
//! # }
//! ```

pub mod check;
pub mod config;
pub mod dispatch;
pub mod exposition;
pub mod feed;
pub mod fetch;
pub mod mapping;
pub mod storage;

pub use check::{CheckError, CheckStatus, collect, collect_into, execute, ingest};
pub use config::{CheckConfig, ConfigError, TlsConfig};
pub use dispatch::{DispatchError, MetricDispatcher, MetricSample};
pub use exposition::{Exposition, ExpositionError};
pub use feed::{Cell, ColumnName, FeedError, StatsFeed};
pub use fetch::{FeedFetcher, FeedSource, FetchError, fetcher_for};
pub use mapping::{InstanceType, TagSet};
pub use storage::{StatsStore, StorageError};
