//! Integration tests for replaying captured dumps.
//!
//! These tests run a dump file through `FileSource`, the sample cache and a
//! view, checking the rows a user would see.

use statline::{FileSource, SampleCache, SampleSource, ViewCatalog};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

const VIEWS: &str = r#"
views:
  - name: load
    columns:
      - {name: run, type: gauge, key: threads_running, width: 3}
      - {name: qps, type: rate, key: questions, width: 5}
      - {name: pct max, type: percent, numerator: threads_connected, denominator: variables/max_connections, width: 4}
"#;

/// Helper function to write a dump to a temporary file.
fn dump(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn batch_snapshot(uptime: u64, questions: u64, running: u64) -> String {
    format!(
        "Variable_name\tValue\nQuestions\t{}\nThreads_connected\t50\nThreads_running\t{}\nUptime\t{}\n",
        questions, running, uptime
    )
}

fn tabular_snapshot(uptime: u64, questions: u64, running: u64) -> String {
    let row = |name: &str, value: u64| format!("| {:<17} | {:<5} |\n", name, value);
    let border = "+-------------------+-------+\n";
    let mut text = String::new();
    text.push_str(border);
    text.push_str("| Variable_name     | Value |\n");
    text.push_str(border);
    text.push_str(&row("Questions", questions));
    text.push_str(&row("Threads_connected", 50));
    text.push_str(&row("Threads_running", running));
    text.push_str(&row("Uptime", uptime));
    text.push_str(border);
    text
}

/// Replays `status` (and optionally `variables`) through the `load` view.
fn render(status: &str, variables: Option<&str>, interval: u64) -> Vec<String> {
    let view = ViewCatalog::from_yaml(VIEWS).unwrap().build("load").unwrap();

    let status_file = dump(status);
    let variables_file = variables.map(dump);
    let mut source = FileSource::new(status_file.path());
    if let Some(file) = &variables_file {
        source = source.with_variables(file.path());
    }
    source.initialize(Duration::from_secs(interval)).unwrap();

    let mut cache = SampleCache::new();
    let mut rows = view.header_lines();
    for sample in source.produce().unwrap() {
        cache.update(Some(sample));
        rows.extend(view.data_lines(&cache));
    }
    rows
}

#[test]
fn test_batch_dump_rows() {
    let status: String = [(100, 1_000, 3), (101, 1_250, 4), (102, 1_250, 2)]
        .iter()
        .map(|&(u, q, r)| batch_snapshot(u, q, r))
        .collect();

    let rows = render(&status, None, 1);
    assert_eq!(
        rows,
        vec![
            "                    pct",
            "    time run   qps  max",
            " 0:01:40   3     -    -",
            " 0:01:41   4   250    -",
            " 0:01:42   2     0    -",
        ]
    );
}

#[test]
fn test_tabular_matches_batch() {
    let snapshots = [(100, 1_000, 3), (101, 1_250, 4), (102, 1_900, 2)];
    let batch: String = snapshots.iter().map(|&(u, q, r)| batch_snapshot(u, q, r)).collect();
    let tabular: String = snapshots.iter().map(|&(u, q, r)| tabular_snapshot(u, q, r)).collect();

    assert_eq!(render(&batch, None, 1), render(&tabular, None, 1));
}

#[test]
fn test_interval_gating_skips_records() {
    let status: String = (0..10u64).map(|i| batch_snapshot(100 + i, 1_000 + i * 10, 1)).collect();

    let rows = render(&status, None, 3);
    // Header plus samples at uptime 100, 103, 106 and 109.
    assert_eq!(rows.len(), 2 + 4);
    assert_eq!(rows[3], " 0:01:43   1    10    -");
}

#[test]
fn test_variables_feed_percent_column() {
    let status: String = (0..3u64).map(|i| batch_snapshot(100 + i, 1_000, 1)).collect();
    let variables = "Variable_name\tValue\nMax_connections\t200\nVersion\t8.0.36-log\n";

    let rows = render(&status, Some(variables), 1);
    // 50 of 200 connections; the non-numeric variable is dropped.
    assert!(rows[2..].iter().all(|row| row.ends_with("  25")), "{:?}", rows);
}

#[test]
fn test_server_restart_rebases() {
    let status = [
        batch_snapshot(500, 9_000, 1),
        batch_snapshot(501, 9_100, 1),
        batch_snapshot(1, 10, 1),
        batch_snapshot(2, 60, 1),
    ]
    .concat();

    let rows = render(&status, None, 1);
    assert_eq!(rows.len(), 2 + 4);
    assert_eq!(rows[5], " 0:00:02   1    50    -");
}

#[test]
fn test_crlf_and_trailing_garbage() {
    let status = batch_snapshot(10, 100, 1).replace('\n', "\r\n")
        + &batch_snapshot(11, 160, 2).replace('\n', "\r\n")
        + "Variable_name\tValue\r\nQuest";

    let rows = render(&status, None, 1);
    assert_eq!(rows[3], " 0:00:11   2    60    -");
}
