//! Key/value extraction from a single raw record.

use super::{Format, HEADER_KEY};

/// Name of the reading used for interval gating.
pub const UPTIME_KEY: &str = "uptime";

/// Raw `(key, value)` text pairs of a record in stream order.
///
/// Header rows, border rows and malformed lines are skipped. For TABULAR
/// records the divider between the key and value cells is taken from the
/// first row of the record and reused for every following row.
pub fn pairs(record: &str, format: Format) -> Vec<(&str, &str)> {
    match format {
        Format::Batch => record.lines().filter_map(batch_pair).collect(),
        Format::Tabular => {
            let mut divider = None;
            record
                .lines()
                .filter_map(|line| tabular_pair(line, &mut divider))
                .collect()
        }
    }
}

fn batch_pair(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('\t')?;
    let key = key.trim();
    if key.is_empty() || key.eq_ignore_ascii_case(HEADER_KEY) {
        return None;
    }
    Some((key, value.trim()))
}

fn tabular_pair<'a>(line: &'a str, divider: &mut Option<usize>) -> Option<(&'a str, &'a str)> {
    let line = line.trim_end();
    if !line.starts_with('|') {
        // Border rows ("+----+") and noise.
        return None;
    }

    let at = match *divider {
        Some(at) => at,
        None => {
            let at = 1 + line[1..].find('|')?;
            *divider = Some(at);
            at
        }
    };

    if line.len() <= at || !line.is_char_boundary(at) || line.as_bytes()[at] != b'|' {
        return None;
    }

    let key = line[1..at].trim();
    let value = line[at + 1..].strip_suffix('|')?.trim();
    if key.is_empty() || key.eq_ignore_ascii_case(HEADER_KEY) {
        return None;
    }
    Some((key, value))
}

/// Lowercased names with finite numeric values; everything else is dropped.
pub fn parse_fields(record: &str, format: Format) -> Vec<(String, f64)> {
    pairs(record, format)
        .into_iter()
        .filter_map(|(key, value)| {
            let value: f64 = value.parse().ok()?;
            value.is_finite().then(|| (key.to_lowercase(), value))
        })
        .collect()
}

/// Finds the uptime reading, stopping at the first line that carries it.
pub fn find_uptime(record: &str, format: Format) -> Option<f64> {
    let mut divider = None;
    record.lines().find_map(|line| {
        let (key, value) = match format {
            Format::Batch => batch_pair(line)?,
            Format::Tabular => tabular_pair(line, &mut divider)?,
        };
        if !key.eq_ignore_ascii_case(UPTIME_KEY) {
            return None;
        }
        value.parse().ok()
    })
}
