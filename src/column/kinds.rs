//! Value rules shared by the column kinds.

use once_cell::sync::OnceCell;

use crate::cache::SampleCache;
use crate::key::SourceKey;

/// Difference between two counter readings.
///
/// A counter that went backwards was reset (server restart, `FLUSH STATUS`),
/// so the current value is the whole increase since the reset.
pub fn counter_diff(current: f64, previous: f64) -> f64 {
    if current < previous {
        current
    } else {
        current - previous
    }
}

/// Per-second rate, `None` unless `secs` is positive.
pub fn rate(current: f64, previous: f64, secs: f64) -> Option<f64> {
    if secs > 0.0 {
        Some(counter_diff(current, previous) / secs)
    } else {
        None
    }
}

/// Expands glob keys against the current generation of `cache`.
///
/// Literal keys are passed through whether or not they exist. The result
/// keeps key order and contains no duplicates.
pub fn expand_keys(keys: &[SourceKey], cache: &SampleCache) -> Vec<SourceKey> {
    expand(keys, cache).0
}

/// Expansion plus whether every glob key matched at least one reading.
fn expand(keys: &[SourceKey], cache: &SampleCache) -> (Vec<SourceKey>, bool) {
    let mut expanded: Vec<SourceKey> = Vec::new();
    let mut complete = true;
    for key in keys {
        if key.is_glob() {
            let found = cache.find_metrics(key.domain(), key.name());
            complete &= !found.is_empty();
            for metric in found {
                let found = SourceKey::new(key.domain(), &metric.name);
                if !expanded.contains(&found) {
                    expanded.push(found);
                }
            }
        } else if !expanded.contains(key) {
            expanded.push(key.clone());
        }
    }
    (expanded, complete)
}

/// Glob expansion computed once per column, but only once every glob found
/// something: counters that do not exist yet may appear in later samples.
#[derive(Debug, Default)]
pub struct LazyExpansion {
    keys: OnceCell<Vec<SourceKey>>,
}

impl LazyExpansion {
    pub fn get(&self, keys: &[SourceKey], cache: &SampleCache) -> Vec<SourceKey> {
        if let Some(expanded) = self.keys.get() {
            return expanded.clone();
        }
        let (expanded, complete) = expand(keys, cache);
        if complete && !expanded.is_empty() {
            let _ = self.keys.set(expanded.clone());
        }
        expanded
    }

    pub fn is_resolved(&self) -> bool {
        self.keys.get().is_some()
    }
}

impl Clone for LazyExpansion {
    fn clone(&self) -> Self {
        Self::default()
    }
}
