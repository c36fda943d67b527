//! Sample data model shared by the parser, the cache and the columns.
//!
//! A `Sample` is one timestamped snapshot of server readings, partitioned
//! into named domains ("status", "variables"). Samples are assembled by the
//! parser and never modified once handed to a consumer.

use serde::Serialize;
use std::collections::BTreeMap;

/// Domain holding `SHOW GLOBAL STATUS` style readings.
pub const STATUS_DOMAIN: &str = "status";
/// Domain holding `SHOW GLOBAL VARIABLES` style readings.
pub const VARIABLES_DOMAIN: &str = "variables";

/// Whether a reading is a point-in-time magnitude or a cumulative counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// A single named reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricValue {
    pub name: String,
    pub value: f64,
    pub kind: MetricKind,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            value,
            kind,
        }
    }
}

/// What the `begin`/`end` timestamps of a sample are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleClock {
    /// Unix seconds taken from the local wall clock (live polling).
    Wall,
    /// Server uptime seconds embedded in the data (replayed dumps).
    Uptime,
}

/// One snapshot of readings.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    begin: f64,
    end: f64,
    clock: SampleClock,
    domains: BTreeMap<String, Vec<MetricValue>>,
}

impl Sample {
    pub fn new(begin: f64, end: f64, clock: SampleClock) -> Self {
        Self {
            begin,
            end,
            clock,
            domains: BTreeMap::new(),
        }
    }

    /// Builder-style variant of [`Sample::insert_domain`].
    pub fn with_domain(mut self, domain: impl Into<String>, metrics: Vec<MetricValue>) -> Self {
        self.insert_domain(domain, metrics);
        self
    }

    /// Installs (or replaces) the readings of one domain.
    pub fn insert_domain(&mut self, domain: impl Into<String>, metrics: Vec<MetricValue>) {
        self.domains.insert(domain.into(), metrics);
    }

    pub fn begin(&self) -> f64 {
        self.begin
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn clock(&self) -> SampleClock {
        self.clock
    }

    /// Readings of one domain in stream order.
    pub fn domain(&self, name: &str) -> Option<&[MetricValue]> {
        self.domains.get(name).map(Vec::as_slice)
    }

    /// All domains, sorted by name.
    pub fn domains(&self) -> impl Iterator<Item = (&str, &[MetricValue])> {
        self.domains
            .iter()
            .map(|(name, metrics)| (name.as_str(), metrics.as_slice()))
    }

    /// Total number of readings across all domains.
    pub fn metric_count(&self) -> usize {
        self.domains.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.metric_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_domains_sorted() {
        let sample = Sample::new(1.0, 2.0, SampleClock::Uptime)
            .with_domain(VARIABLES_DOMAIN, vec![MetricValue::new("max_connections", 151.0, MetricKind::Gauge)])
            .with_domain(STATUS_DOMAIN, vec![MetricValue::new("uptime", 2.0, MetricKind::Counter)]);

        let names: Vec<&str> = sample.domains().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["status", "variables"]);
        assert_eq!(sample.metric_count(), 2);
        assert!(!sample.is_empty());
    }

    #[test]
    fn test_empty_sample() {
        let sample = Sample::new(0.0, 0.0, SampleClock::Wall).with_domain(STATUS_DOMAIN, Vec::new());
        assert!(sample.is_empty());
        assert_eq!(sample.domain(STATUS_DOMAIN).map(<[MetricValue]>::len), Some(0));
        assert!(sample.domain("missing").is_none());
    }
}
