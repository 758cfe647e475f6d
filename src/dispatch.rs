//! Metric dispatcher.
//!
//! Builds one tag-projecting query per canonical metric, runs it against the
//! loaded [`StatsStore`], and turns result rows into [`MetricSample`]s.

use thiserror::Error;

use crate::feed::{Cell, ColumnName, FeedError};
use crate::mapping::{self, METRICS, TagSet};
use crate::storage::{StatsStore, StorageError, TABLE_NAME};

/// Errors raised while dispatching metric queries.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The query for one metric failed, usually because the feed lacks its column.
    #[error("query for metric '{metric}' failed: {source}")]
    MetricQuery {
        metric: String,
        #[source]
        source: StorageError,
    },

    /// The metric's native name is not a safe column identifier.
    #[error("invalid metric name '{metric}': {source}")]
    InvalidMetricName {
        metric: String,
        #[source]
        source: FeedError,
    },
}

/// One tagged value for a canonical metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Canonical id (or the native spelling when it has no mapping).
    pub metric: String,
    pub tags: TagSet,
    pub value: f64,
}

/// Query selecting the tag set, the metric value and its native name.
///
/// The host is bound as the only parameter.
fn metric_query(native: &ColumnName) -> String {
    format!(
        "SELECT [pxname] AS proxy, ? AS host, [type] AS type, [svname] AS sv, \
         {} AS value, '{}' AS metric_name FROM {TABLE_NAME}",
        native.quoted(),
        native.as_str()
    )
}

/// Turn one result row into a sample; `None` when the value is not numeric.
fn sample_from_row(row: Vec<Cell>) -> Option<MetricSample> {
    let [proxy, host, instance_type, service, value, metric_name]: [Cell; 6] =
        row.try_into().ok()?;

    let Some(value) = value.as_f64() else {
        if !value.is_null() {
            tracing::debug!(%metric_name, %proxy, %service, "Skipping non-numeric value");
        }
        return None;
    };
    if !value.is_finite() {
        tracing::debug!(%metric_name, %proxy, %service, value, "Skipping non-finite value");
        return None;
    }

    let instance_type = instance_type
        .as_i64()
        .map_or("", mapping::decode_instance_type);
    let metric_name = metric_name.to_string();

    Some(MetricSample {
        metric: mapping::to_canonical(&metric_name).to_string(),
        tags: TagSet {
            proxy: proxy.to_string(),
            host: host.to_string(),
            instance_type: instance_type.to_string(),
            service: service.to_string(),
        },
        value,
    })
}

/// Runs metric queries against one loaded store.
#[derive(Debug)]
pub struct MetricDispatcher<'a> {
    store: &'a StatsStore,
    host: String,
}

impl<'a> MetricDispatcher<'a> {
    /// Create a dispatcher; `host` becomes the `host` tag of every sample.
    pub fn new(store: &'a StatsStore, host: impl Into<String>) -> Self {
        Self {
            store,
            host: host.into(),
        }
    }

    /// Samples for a single canonical metric, in store result order.
    ///
    /// Null and non-numeric values are dropped.
    pub async fn dispatch(&self, metric: &str) -> Result<Vec<MetricSample>, DispatchError> {
        let native = ColumnName::parse(mapping::to_native(metric)).map_err(|source| {
            DispatchError::InvalidMetricName {
                metric: metric.to_string(),
                source,
            }
        })?;
        let sql = metric_query(&native);
        let rows = self
            .store
            .query(&sql, &[Cell::Text(self.host.clone())])
            .await
            .map_err(|source| DispatchError::MetricQuery {
                metric: metric.to_string(),
                source,
            })?;

        let total = rows.len();
        let samples: Vec<_> = rows.into_iter().filter_map(sample_from_row).collect();
        tracing::trace!(metric, rows = total, samples = samples.len(), "Metric dispatched");
        Ok(samples)
    }

    /// Samples for every metric in [`METRICS`] order.
    ///
    /// Fails fast: the first failing metric aborts the remaining dispatch.
    pub async fn dispatch_all(&self) -> Result<Vec<MetricSample>, DispatchError> {
        self.dispatch_metrics(METRICS).await
    }

    /// Samples for the given metrics, in order. Fails fast.
    pub async fn dispatch_metrics(
        &self,
        metrics: &[&str],
    ) -> Result<Vec<MetricSample>, DispatchError> {
        let mut samples = Vec::new();
        for metric in metrics {
            samples.extend(self.dispatch(metric).await?);
        }

        tracing::debug!(
            metrics = metrics.len(),
            samples = samples.len(),
            "Metrics dispatched"
        );
        Ok(samples)
    }
}
