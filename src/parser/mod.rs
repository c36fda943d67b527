//! Sample parser: turns a raw status stream into timestamped [`Sample`]s.
//!
//! Two encodings are understood and detected from the first non-whitespace
//! byte of the stream:
//!
//! - BATCH: `key<TAB>value` lines, as printed by `mysql --batch`. A record
//!   starts at a `Variable_name` line or after an empty line.
//! - TABULAR: `| key | value |` rows with `+---+` borders, as printed by
//!   `mysqladmin extended-status`. A record starts at the
//!   `| Variable_name | Value |` row.
//!
//! Records are gated on their `Uptime` reading so that a source emitting once
//! per second can be shown at a coarser interval.

pub mod fields;
pub mod gauges;
pub mod record;

use std::io::Read;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

use crate::error::SourceError;
use crate::sample::{MetricValue, Sample, SampleClock};

pub use fields::{find_uptime, parse_fields, UPTIME_KEY};
pub use gauges::classify;
pub use record::{Record, RecordReader};

/// Key of the row that opens a record in both encodings.
pub const HEADER_KEY: &str = "Variable_name";

/// Shortest interval a source can be initialized with.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Rejects intervals below [`MIN_INTERVAL`].
pub fn check_interval(interval: Duration) -> Result<(), SourceError> {
    if interval < MIN_INTERVAL {
        return Err(SourceError::IntervalTooShort(interval));
    }
    Ok(())
}

/// Textual layout of a status stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Batch,
    Tabular,
}

impl Format {
    /// Detects the encoding from the first non-whitespace byte, if any.
    pub fn sniff(bytes: &[u8]) -> Option<Format> {
        bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .map(|b| match b {
                b'+' | b'|' => Format::Tabular,
                _ => Format::Batch,
            })
    }

    /// Whether `line` (without its newline) opens a new record.
    pub fn is_boundary(self, line: &[u8]) -> bool {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        match self {
            Format::Batch => {
                if line.is_empty() {
                    return true;
                }
                let key = line.split(|&b| b == b'\t').next().unwrap_or(line);
                key.trim_ascii().eq_ignore_ascii_case(HEADER_KEY.as_bytes())
            }
            Format::Tabular => {
                let Some(rest) = line.trim_ascii_start().strip_prefix(b"|") else {
                    return false;
                };
                let cell = rest.split(|&b| b == b'|').next().unwrap_or(rest);
                cell.trim_ascii().eq_ignore_ascii_case(HEADER_KEY.as_bytes())
            }
        }
    }
}

/// Parses one record's text into readings of the given encoding.
pub fn parse_record(text: &str, format: Format) -> Vec<MetricValue> {
    parse_fields(text, format)
        .into_iter()
        .map(|(name, value)| {
            let kind = classify(&name);
            MetricValue::new(name, value, kind)
        })
        .collect()
}

/// Parses a complete one-shot snapshot (for example `SHOW VARIABLES`
/// output), detecting its encoding.
pub fn parse_snapshot(bytes: &[u8]) -> Vec<MetricValue> {
    match Format::sniff(bytes) {
        Some(format) => parse_record(&String::from_utf8_lossy(bytes), format),
        None => Vec::new(),
    }
}

/// Iterator of gated samples over one byte stream.
///
/// I/O errors end the iteration after being logged; they are never surfaced
/// to the consumer.
pub struct SampleStream<R> {
    reader: RecordReader<R>,
    interval: f64,
    domain: String,
    clock: SampleClock,
    baseline: Option<f64>,
    last_end: Option<f64>,
    emitted: usize,
    skipped: usize,
    done: bool,
}

impl<R: Read> SampleStream<R> {
    pub fn new(inner: R, interval: Duration, domain: impl Into<String>, clock: SampleClock) -> Self {
        Self {
            reader: RecordReader::new(inner),
            interval: interval.as_secs_f64(),
            domain: domain.into(),
            clock,
            baseline: None,
            last_end: None,
            emitted: 0,
            skipped: 0,
            done: false,
        }
    }

    pub fn format(&self) -> Option<Format> {
        self.reader.format()
    }

    /// Records discarded by interval gating so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Decides whether a record with the given uptime passes the gate.
    fn admit(&mut self, uptime: Option<f64>) -> bool {
        let (Some(candidate), Some(baseline)) = (uptime, self.baseline) else {
            return true;
        };
        if candidate < baseline {
            info!(
                "Uptime went back from {} to {}, assuming server restart",
                baseline, candidate
            );
            return true;
        }
        candidate - baseline >= self.interval
    }

    fn stamp(&self, record: &Record, uptime: Option<f64>) -> (f64, f64) {
        match self.clock {
            SampleClock::Uptime => {
                let at = uptime
                    .or_else(|| self.last_end.map(|end| end + self.interval))
                    .unwrap_or(0.0);
                (at, at)
            }
            SampleClock::Wall => (unix_seconds(record.first_byte_at), unix_seconds(SystemTime::now())),
        }
    }
}

impl<R: Read> Iterator for SampleStream<R> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        while !self.done {
            let record = match self.reader.next_record() {
                Ok(Some(record)) => record,
                Ok(None) => {
                    debug!(
                        "{} stream ended after {} samples ({} gated)",
                        self.domain, self.emitted, self.skipped
                    );
                    self.done = true;
                    break;
                }
                Err(e) => {
                    error!("Failed to read {} stream: {}", self.domain, e);
                    self.done = true;
                    break;
                }
            };

            // A record has been produced, so the encoding is known.
            let Some(format) = self.reader.format() else {
                continue;
            };
            let text = String::from_utf8_lossy(&record.bytes);

            let uptime = find_uptime(&text, format);
            if !self.admit(uptime) {
                self.skipped += 1;
                debug!("Gated record at uptime {:?}", uptime);
                continue;
            }

            let metrics = parse_record(&text, format);
            if metrics.is_empty() {
                continue;
            }

            if uptime.is_some() {
                self.baseline = uptime;
            }
            let (begin, end) = self.stamp(&record, uptime);
            self.last_end = Some(end);
            self.emitted += 1;

            return Some(Sample::new(begin, end, self.clock).with_domain(self.domain.clone(), metrics));
        }
        None
    }
}

fn unix_seconds(at: SystemTime) -> f64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
