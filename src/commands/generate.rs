//! Generate testdata command implementation.
//!
//! Writes a synthetic status dump that can be replayed with `--file`.

use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::DumpFormat;

/// Uptime of the first generated snapshot.
const START_UPTIME: u64 = 86_400;

/// Counters as `(name, min per second, max per second)`.
const COUNTERS: &[(&str, u64, u64)] = &[
    ("aborted_clients", 0, 1),
    ("aborted_connects", 0, 1),
    ("bytes_received", 50_000, 400_000),
    ("bytes_sent", 200_000, 4_000_000),
    ("com_begin", 10, 80),
    ("com_commit", 10, 80),
    ("com_delete", 0, 40),
    ("com_insert", 5, 150),
    ("com_replace", 0, 5),
    ("com_rollback", 0, 2),
    ("com_select", 200, 1_800),
    ("com_set_option", 20, 100),
    ("com_update", 5, 120),
    ("connections", 1, 20),
    ("created_tmp_disk_tables", 0, 3),
    ("created_tmp_files", 0, 1),
    ("created_tmp_tables", 2, 30),
    ("handler_commit", 20, 200),
    ("handler_delete", 0, 40),
    ("handler_read_first", 0, 20),
    ("handler_read_key", 500, 8_000),
    ("handler_read_next", 1_000, 20_000),
    ("handler_read_rnd_next", 200, 5_000),
    ("handler_update", 5, 150),
    ("handler_write", 10, 400),
    ("innodb_buffer_pool_read_requests", 5_000, 80_000),
    ("innodb_buffer_pool_reads", 0, 50),
    ("innodb_buffer_pool_write_requests", 100, 3_000),
    ("innodb_data_fsyncs", 1, 30),
    ("innodb_data_read", 0, 800_000),
    ("innodb_data_written", 20_000, 2_000_000),
    ("innodb_log_writes", 5, 100),
    ("innodb_os_log_written", 5_000, 400_000),
    ("innodb_rows_deleted", 0, 40),
    ("innodb_rows_inserted", 5, 300),
    ("innodb_rows_read", 1_000, 30_000),
    ("innodb_rows_updated", 5, 150),
    ("opened_tables", 0, 2),
    ("qcache_hits", 0, 100),
    ("queries", 300, 2_500),
    ("questions", 250, 2_200),
    ("select_full_join", 0, 2),
    ("select_range", 5, 80),
    ("select_scan", 5, 60),
    ("slow_queries", 0, 1),
    ("sort_rows", 50, 3_000),
    ("threads_created", 0, 2),
];

/// Gauges as `(name, min, max)`.
const GAUGES: &[(&str, u64, u64)] = &[
    ("innodb_buffer_pool_pages_data", 6_000, 7_900),
    ("innodb_buffer_pool_pages_dirty", 0, 600),
    ("innodb_buffer_pool_pages_free", 100, 2_000),
    ("innodb_buffer_pool_pages_total", 8_191, 8_191),
    ("innodb_row_lock_current_waits", 0, 3),
    ("open_files", 20, 40),
    ("open_tables", 400, 2_000),
    ("threads_cached", 0, 8),
    ("threads_connected", 10, 150),
    ("threads_running", 1, 24),
];

/// Generates a synthetic status dump for replay.
pub fn command_generate_testdata(
    output: PathBuf,
    records: usize,
    format: DumpFormat,
    step: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    if records == 0 {
        return Err("records must be at least 1".into());
    }
    if step == 0 {
        return Err("step must be at least 1 second".into());
    }
    debug!(
        "Generating test data: records={}, step={}, format={:?}, output={}",
        records,
        step,
        format,
        output.display()
    );

    let mut writer = BufWriter::new(File::create(&output)?);
    for snapshot in generate(records, step) {
        write_snapshot(&mut writer, &snapshot, format)?;
    }
    writer.flush()?;

    println!(
        "✅ Wrote {} snapshots ({}s apart) to: {}",
        records,
        step,
        output.display()
    );
    println!("   Replay with: statline --file {}", output.display());
    Ok(())
}

/// `records` snapshots of `(name, value)` rows, `step` uptime seconds apart.
fn generate(records: usize, step: u64) -> Vec<Vec<(&'static str, u64)>> {
    let mut rng = rand::thread_rng();
    let mut counters: Vec<u64> = COUNTERS
        .iter()
        .map(|&(_, lo, hi)| rng.gen_range(lo..=hi) * 3_600)
        .collect();

    let mut snapshots = Vec::with_capacity(records);
    for i in 0..records {
        let uptime = START_UPTIME + i as u64 * step;
        let mut rows: Vec<(&'static str, u64)> = Vec::with_capacity(COUNTERS.len() + GAUGES.len() + 1);

        for (value, &(name, lo, hi)) in counters.iter_mut().zip(COUNTERS) {
            if i > 0 {
                *value += rng.gen_range(lo..=hi) * step;
            }
            rows.push((name, *value));
        }
        for &(name, lo, hi) in GAUGES {
            rows.push((name, rng.gen_range(lo..=hi)));
        }
        rows.push(("uptime", uptime));
        rows.sort_by(|a, b| a.0.cmp(b.0));

        snapshots.push(rows);
    }
    snapshots
}

fn write_snapshot<W: Write>(out: &mut W, rows: &[(&str, u64)], format: DumpFormat) -> std::io::Result<()> {
    match format {
        DumpFormat::Batch => {
            writeln!(out, "Variable_name\tValue")?;
            for (name, value) in rows {
                writeln!(out, "{}\t{}", capitalize(name), value)?;
            }
        }
        DumpFormat::Tabular => {
            let key_width = rows
                .iter()
                .map(|(name, _)| name.len())
                .chain(std::iter::once("Variable_name".len()))
                .max()
                .unwrap_or(0);
            let value_width = rows
                .iter()
                .map(|(_, value)| value.to_string().len())
                .chain(std::iter::once("Value".len()))
                .max()
                .unwrap_or(0);
            let border = format!("+{}+{}+", "-".repeat(key_width + 2), "-".repeat(value_width + 2));

            writeln!(out, "{}", border)?;
            writeln!(out, "| {:<kw$} | {:<vw$} |", "Variable_name", "Value", kw = key_width, vw = value_width)?;
            writeln!(out, "{}", border)?;
            for (name, value) in rows {
                writeln!(
                    out,
                    "| {:<kw$} | {:<vw$} |",
                    capitalize(name),
                    value,
                    kw = key_width,
                    vw = value_width
                )?;
            }
            writeln!(out, "{}", border)?;
        }
    }
    Ok(())
}

/// Server output spells names as `Com_select`; the parser folds case.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statline::parser::SampleStream;
    use statline::{SampleCache, SampleClock, STATUS_DOMAIN};
    use std::time::Duration;
    use tempfile::tempdir;

    fn replay(path: &std::path::Path, interval: u64) -> Vec<statline::Sample> {
        let file = File::open(path).unwrap();
        SampleStream::new(file, Duration::from_secs(interval), STATUS_DOMAIN, SampleClock::Uptime).collect()
    }

    #[test]
    fn test_generated_batch_replays() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("status.txt");
        command_generate_testdata(path.clone(), 10, DumpFormat::Batch, 2).unwrap();

        let samples = replay(&path, 2);
        assert_eq!(samples.len(), 10);
        assert_eq!(samples[0].end(), START_UPTIME as f64);
        assert_eq!(samples[9].end(), (START_UPTIME + 18) as f64);
    }

    #[test]
    fn test_generated_tabular_replays() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("status.txt");
        command_generate_testdata(path.clone(), 4, DumpFormat::Tabular, 1).unwrap();

        let samples = replay(&path, 1);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].metric_count(), COUNTERS.len() + GAUGES.len() + 1);
    }

    #[test]
    fn test_counters_never_decrease() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("status.txt");
        command_generate_testdata(path.clone(), 5, DumpFormat::Batch, 1).unwrap();

        let mut cache = SampleCache::new();
        for sample in replay(&path, 1) {
            cache.update(Some(sample));
            if cache.previous().is_some() {
                assert!(cache.get_value("status", "questions") >= cache.get_prev_value("status", "questions"));
            }
        }
    }

    #[test]
    fn test_zero_records_rejected() {
        let dir = tempdir().unwrap();
        assert!(command_generate_testdata(dir.path().join("x"), 0, DumpFormat::Batch, 1).is_err());
    }
}
