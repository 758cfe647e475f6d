//! Scrape exposition adapter.
//!
//! A private Prometheus registry holding one gauge vector per canonical
//! metric, labelled by the tag set. Rendering is a plain synchronous call
//! that returns the text exposition snapshot; nothing listens on a socket.
//!
//! The registry is not the process-global default one, so no process or
//! runtime self-metrics are ever exported.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::string::FromUtf8Error;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::dispatch::MetricSample;
use crate::mapping::{self, TAG_LABELS};

/// Prefix of every exported metric name.
pub const NAMESPACE: &str = "haproxy";

/// Errors raised while recording or rendering metrics.
#[derive(Debug, Error)]
pub enum ExpositionError {
    /// Gauge creation, registration, label binding or encoding failed.
    #[error("exposition error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// Encoder produced non-UTF-8 output.
    #[error("exposition output is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Registry of gauge-shaped metrics bound to the tag set labels.
pub struct Exposition {
    registry: Registry,
    gauges: BTreeMap<String, GaugeVec>,
}

impl std::fmt::Debug for Exposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exposition")
            .field("gauges", &self.gauges.len())
            .finish_non_exhaustive()
    }
}

impl Default for Exposition {
    fn default() -> Self {
        Self::new()
    }
}

impl Exposition {
    /// Create an empty exposition registry.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            gauges: BTreeMap::new(),
        }
    }

    /// Gauge vector for a metric, registering it on first use.
    fn gauge(&mut self, metric: &str) -> Result<&GaugeVec, ExpositionError> {
        match self.gauges.entry(metric.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let opts = Opts::new(metric, mapping::help_text(metric)).namespace(NAMESPACE);
                let gauge = GaugeVec::new(opts, &TAG_LABELS)?;
                self.registry.register(Box::new(gauge.clone()))?;
                tracing::trace!(metric, "Gauge registered");
                Ok(entry.insert(gauge))
            }
        }
    }

    /// Set the sample's value for its label combination, replacing any prior value.
    pub fn record(&mut self, sample: &MetricSample) -> Result<(), ExpositionError> {
        let values = sample.tags.values();
        self.gauge(&sample.metric)?
            .get_metric_with_label_values(&values)?
            .set(sample.value);
        Ok(())
    }

    /// Record every sample in order.
    pub fn record_all<'s>(
        &mut self,
        samples: impl IntoIterator<Item = &'s MetricSample>,
    ) -> Result<(), ExpositionError> {
        for sample in samples {
            self.record(sample)?;
        }
        Ok(())
    }

    /// Current value for a metric and label combination, if recorded.
    pub fn value(&self, metric: &str, labels: &[&str; 4]) -> Option<f64> {
        let gauge = self.gauges.get(metric)?;
        gauge
            .get_metric_with_label_values(labels)
            .ok()
            .map(|g| g.get())
    }

    /// Render the full text exposition snapshot.
    pub fn render(&self) -> Result<String, ExpositionError> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
