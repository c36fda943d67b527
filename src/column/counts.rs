//! Breakdown of which counters moved, grouped by how much.
//!
//! Rendered as a "total" line followed by one line per distinct increase,
//! largest first, listing the counters that increased by exactly that much:
//!
//! ```text
//!    42 total
//!    30 select
//!     6 insert,update
//! ```

use crate::cache::SampleCache;
use crate::key::SourceKey;
use crate::units::{fill, fit, fit_text, Align, NUMBER_UNITS};

use super::kinds::counter_diff;

/// Width of the count printed in front of each line.
pub const NUMBER_WIDTH: usize = 5;

/// Counters that increased, paired with the name to show for them.
///
/// Each reading is counted once, however many keys select it. Glob matches
/// are shown without the glob's prefix unless that would make two different
/// readings look the same.
pub fn increases(keys: &[SourceKey], cache: &SampleCache) -> Vec<(f64, String)> {
    // (domain, full name, shown name, increase)
    let mut moved: Vec<(&str, String, String, f64)> = Vec::new();

    for key in keys {
        let candidates: Vec<String> = if key.is_glob() {
            cache
                .find_metrics(key.domain(), key.name())
                .into_iter()
                .map(|m| m.name.clone())
                .collect()
        } else {
            vec![key.prefix().to_string()]
        };

        for name in candidates {
            if moved
                .iter()
                .any(|(domain, existing, _, _)| *domain == key.domain() && *existing == name)
            {
                continue;
            }

            let (Some(current), Some(previous)) = (
                cache.get_metric(key.domain(), &name),
                cache.get_prev_metric(key.domain(), &name),
            ) else {
                continue;
            };

            let diff = counter_diff(current.value, previous.value);
            if diff <= 0.0 {
                continue;
            }

            let shown = if key.is_glob() {
                name.strip_prefix(key.prefix()).unwrap_or(&name).to_string()
            } else {
                name.clone()
            };
            moved.push((key.domain(), name, shown, diff));
        }
    }

    let labels: Vec<String> = moved
        .iter()
        .map(|(_, name, shown, _)| {
            let clashes = moved
                .iter()
                .filter(|(_, _, other, _)| other == shown)
                .count();
            if clashes > 1 {
                name.clone()
            } else {
                shown.clone()
            }
        })
        .collect();

    moved
        .into_iter()
        .zip(labels)
        .map(|((_, _, _, diff), label)| (diff, label))
        .collect()
}

/// Renders the breakdown lines, each exactly `width` characters.
pub fn render(keys: &[SourceKey], cache: &SampleCache, width: usize) -> Vec<String> {
    if cache.current().is_none() || cache.previous().is_none() {
        return vec![fill(width)];
    }

    let mut moved = increases(keys, cache);
    let total = moved.iter().fold(0.0, |total, (diff, _)| total + diff);

    // Largest increase first, names alphabetical within one increase.
    moved.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut lines = vec![line(total, "total", width)];
    let mut rest = moved.as_slice();
    while let Some((diff, _)) = rest.first() {
        let run = rest.iter().take_while(|(d, _)| d == diff).count();
        let names: Vec<&str> = rest[..run].iter().map(|(_, name)| name.as_str()).collect();
        lines.push(line(*diff, &names.join(","), width));
        rest = &rest[run..];
    }
    lines
}

fn line(count: f64, label: &str, width: usize) -> String {
    let text = format!("{} {}", fit(count, NUMBER_WIDTH, 0, NUMBER_UNITS), label);
    fit_text(&text, width, false, Align::Left)
}
