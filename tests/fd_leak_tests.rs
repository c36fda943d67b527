//! Repeated source start/stop cycles must not leak file descriptors or
//! child processes.
//!
//! Kept in its own test binary so that no other test opens files while the
//! descriptor table is being counted.

use statline::pipeline::spawn_producer;
use statline::{CommandSource, FileSource, SampleSource};
use std::fs;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const CYCLES: usize = 25;

/// Number of open descriptors of this process.
fn open_fds() -> usize {
    fs::read_dir("/proc/self/fd").map(|dir| dir.count()).unwrap_or(0)
}

fn dump(records: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for uptime in 0..records {
        write!(file, "Variable_name\tValue\nQuestions\t{}\nUptime\t{}\n", uptime * 10, uptime).unwrap();
    }
    file
}

/// Starts `source`, reads two samples, then cancels and waits for the
/// producer to finish.
async fn cycle(mut source: Box<dyn SampleSource>) {
    source.initialize(Duration::from_secs(1)).unwrap();
    let interrupt = source.interrupt();
    let samples = source.produce().unwrap();

    let cancel = CancellationToken::new();
    let (mut rx, producer) = spawn_producer(samples, 1, cancel.clone());
    for _ in 0..2 {
        rx.recv().await.unwrap();
    }

    cancel.cancel();
    if let Some(interrupt) = interrupt {
        interrupt.interrupt();
    }
    drop(rx);
    timeout(Duration::from_secs(10), producer).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_start_stop_cycles_release_descriptors() {
    let status = dump(100);
    let variables = dump(3);
    // `tail -f` never reaches end-of-stream on its own.
    let command = format!("tail -n +1 -f {}", status.path().display());

    // Warm up lazily created runtime handles before taking the baseline.
    cycle(Box::new(FileSource::new(status.path()))).await;
    let before = open_fds();

    for _ in 0..CYCLES {
        cycle(Box::new(FileSource::new(status.path()).with_variables(variables.path()))).await;
        cycle(Box::new(CommandSource::new(command.as_str()))).await;
    }

    let after = open_fds();
    assert!(
        after <= before + 2,
        "descriptors grew from {} to {} over {} cycles",
        before,
        after,
        CYCLES
    );
}
