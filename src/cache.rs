//! Two-generation sample cache.
//!
//! `SampleCache` keeps the most recent sample ("current") and the one before
//! it ("previous"), each with a `domain -> name -> position` index so that
//! columns can look readings up in constant time. Rates and diffs are always
//! computed between these two generations.

use ahash::AHashMap as HashMap;

use crate::key::{is_glob, matches_pattern, pattern_prefix};
use crate::sample::{MetricValue, Sample};

/// A sample together with its lookup index.
#[derive(Debug, Clone)]
pub struct Generation {
    sample: Sample,
    index: HashMap<String, HashMap<String, usize>>,
}

impl Generation {
    fn new(sample: Sample) -> Self {
        let mut index: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for (domain, metrics) in sample.domains() {
            let names = index.entry(domain.to_string()).or_default();
            for (position, metric) in metrics.iter().enumerate() {
                // Later duplicates win, matching the order they were printed.
                names.insert(metric.name.clone(), position);
            }
        }
        Self { sample, index }
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    fn get(&self, domain: &str, name: &str) -> Option<&MetricValue> {
        let position = *self.index.get(domain)?.get(name)?;
        self.sample.domain(domain)?.get(position)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SampleCache {
    current: Option<Generation>,
    previous: Option<Generation>,
}

impl SampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new current generation.
    ///
    /// A non-empty sample shifts the old current into previous. `None` or an
    /// empty sample clears current and leaves previous untouched, so the next
    /// real sample is still compared against the last good one.
    pub fn update(&mut self, sample: Option<Sample>) {
        match sample {
            Some(sample) if !sample.is_empty() => {
                let next = Generation::new(sample);
                if let Some(current) = self.current.replace(next) {
                    self.previous = Some(current);
                }
            }
            _ => self.current = None,
        }
    }

    pub fn current(&self) -> Option<&Sample> {
        self.current.as_ref().map(Generation::sample)
    }

    pub fn previous(&self) -> Option<&Sample> {
        self.previous.as_ref().map(Generation::sample)
    }

    pub fn get_metric(&self, domain: &str, name: &str) -> Option<&MetricValue> {
        self.current.as_ref()?.get(domain, name)
    }

    pub fn get_prev_metric(&self, domain: &str, name: &str) -> Option<&MetricValue> {
        self.previous.as_ref()?.get(domain, name)
    }

    /// Current value, or 0.0 when absent.
    pub fn get_value(&self, domain: &str, name: &str) -> f64 {
        self.get_metric(domain, name).map_or(0.0, |m| m.value)
    }

    /// Previous value, or 0.0 when absent.
    pub fn get_prev_value(&self, domain: &str, name: &str) -> f64 {
        self.get_prev_metric(domain, name).map_or(0.0, |m| m.value)
    }

    /// Seconds between the two generations, 0 until both exist.
    pub fn seconds_diff(&self) -> f64 {
        match (&self.current, &self.previous) {
            (Some(current), Some(previous)) => current.sample.end() - previous.sample.end(),
            _ => 0.0,
        }
    }

    /// Readings of the current generation selected by a literal name or a
    /// prefix glob, sorted by name.
    ///
    /// Always evaluated against the live key set: readings that appear in a
    /// later generation show up in later calls.
    pub fn find_metrics(&self, domain: &str, pattern: &str) -> Vec<&MetricValue> {
        let Some(current) = &self.current else {
            return Vec::new();
        };

        if !is_glob(pattern) {
            return current
                .get(domain, pattern_prefix(pattern))
                .into_iter()
                .collect();
        }

        let mut found: Vec<&MetricValue> = current
            .sample
            .domain(domain)
            .unwrap_or_default()
            .iter()
            .filter(|m| matches_pattern(pattern, &m.name))
            .filter(|m| current.get(domain, &m.name).is_some_and(|indexed| std::ptr::eq(indexed, *m)))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    pub fn domain_exists(&self, domain: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.index.contains_key(domain))
    }

    /// Domains of the current generation, sorted.
    pub fn all_domains(&self) -> Vec<&str> {
        self.current()
            .map(|sample| sample.domains().map(|(name, _)| name).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{MetricKind, SampleClock, STATUS_DOMAIN};

    fn sample(end: f64, readings: &[(&str, f64)]) -> Sample {
        let metrics = readings
            .iter()
            .map(|(name, value)| MetricValue::new(*name, *value, MetricKind::Counter))
            .collect();
        Sample::new(end, end, SampleClock::Uptime).with_domain(STATUS_DOMAIN, metrics)
    }

    #[test]
    fn test_generations_shift() {
        let mut cache = SampleCache::new();
        cache.update(Some(sample(10.0, &[("questions", 100.0)])));
        assert_eq!(cache.get_value("status", "questions"), 100.0);
        assert!(cache.get_prev_metric("status", "questions").is_none());
        assert_eq!(cache.seconds_diff(), 0.0);

        cache.update(Some(sample(15.0, &[("questions", 160.0)])));
        assert_eq!(cache.get_value("status", "questions"), 160.0);
        assert_eq!(cache.get_prev_value("status", "questions"), 100.0);
        assert_eq!(cache.seconds_diff(), 5.0);
    }

    #[test]
    fn test_update_none_keeps_previous() {
        let mut cache = SampleCache::new();
        cache.update(Some(sample(1.0, &[("a", 1.0)])));
        cache.update(Some(sample(2.0, &[("a", 2.0)])));
        cache.update(None);

        assert!(cache.current().is_none());
        assert_eq!(cache.get_prev_value("status", "a"), 1.0);
        assert_eq!(cache.get_value("status", "a"), 0.0);
        assert_eq!(cache.seconds_diff(), 0.0);
        assert!(cache.all_domains().is_empty());
    }

    #[test]
    fn test_empty_sample_is_treated_as_none() {
        let mut cache = SampleCache::new();
        cache.update(Some(sample(1.0, &[("a", 1.0)])));
        cache.update(Some(sample(2.0, &[])));
        assert!(cache.current().is_none());
        assert!(cache.previous().is_none());
    }

    #[test]
    fn test_find_metrics_literal_and_glob() {
        let mut cache = SampleCache::new();
        cache.update(Some(sample(
            1.0,
            &[("com_update", 3.0), ("com_select", 7.0), ("questions", 10.0)],
        )));

        let names: Vec<&str> = cache
            .find_metrics("status", "com_*")
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["com_select", "com_update"]);

        assert_eq!(cache.find_metrics("status", "^questions").len(), 1);
        assert!(cache.find_metrics("status", "missing").is_empty());
        assert!(cache.find_metrics("variables", "*").is_empty());
    }

    #[test]
    fn test_duplicate_names_resolve_to_last() {
        let mut cache = SampleCache::new();
        cache.update(Some(sample(1.0, &[("a", 1.0), ("a", 2.0)])));
        assert_eq!(cache.get_value("status", "a"), 2.0);
        assert_eq!(cache.find_metrics("status", "a*").len(), 1);
    }

    #[test]
    fn test_domains() {
        let mut cache = SampleCache::new();
        assert!(!cache.domain_exists("status"));
        cache.update(Some(
            sample(1.0, &[("a", 1.0)]).with_domain("variables", vec![MetricValue::new("b", 2.0, MetricKind::Gauge)]),
        ));
        assert!(cache.domain_exists("status"));
        assert!(cache.domain_exists("variables"));
        assert_eq!(cache.all_domains(), vec!["status", "variables"]);
    }
}
