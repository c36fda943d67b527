//! Sample sources: where raw status streams come from.
//!
//! A source is initialized once with the requested interval, which opens the
//! underlying handles and fails fast on anything unusable, and then produces a
//! lazy sequence of samples. Handles are owned by the produced iterator and
//! released when it is dropped, whether it ran to completion or not.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::parser::{check_interval, parse_snapshot, SampleStream};
use crate::sample::{MetricValue, Sample, SampleClock, STATUS_DOMAIN, VARIABLES_DOMAIN};

/// Boxed sample sequence handed to the pipeline.
pub type SampleIter = Box<dyn Iterator<Item = Sample> + Send>;

pub trait SampleSource: Send {
    /// Validates the interval and opens the underlying stream(s).
    fn initialize(&mut self, interval: Duration) -> Result<(), SourceError>;

    /// Hands out the sample sequence. Each initialization can be produced
    /// from once.
    fn produce(&mut self) -> Result<SampleIter, SourceError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;

    /// Handle that can stop the produced sequence from another thread, for
    /// sources whose reads may block indefinitely.
    fn interrupt(&self) -> Option<Interrupt> {
        None
    }
}

/// Kills the child process behind a [`CommandSource`]. The producer blocked
/// on the child's output then sees end-of-stream and finishes normally.
#[derive(Debug, Clone)]
pub struct Interrupt {
    child: Arc<Mutex<Child>>,
}

impl Interrupt {
    pub fn interrupt(&self) {
        let mut child = lock(&self.child);
        if let Ok(None) = child.try_wait() {
            let _ = child.kill();
            debug!("Interrupted command (pid {})", child.id());
        }
    }
}

fn lock(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Replays captured dumps from disk.
pub struct FileSource {
    status_path: PathBuf,
    variables_path: Option<PathBuf>,
    opened: Option<OpenedFiles>,
}

struct OpenedFiles {
    status: File,
    variables: Option<File>,
    interval: Duration,
}

impl FileSource {
    pub fn new(status_path: impl Into<PathBuf>) -> Self {
        Self {
            status_path: status_path.into(),
            variables_path: None,
            opened: None,
        }
    }

    pub fn with_variables(mut self, path: impl Into<PathBuf>) -> Self {
        self.variables_path = Some(path.into());
        self
    }
}

fn open(path: &Path) -> Result<File, SourceError> {
    File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })
}

impl SampleSource for FileSource {
    fn initialize(&mut self, interval: Duration) -> Result<(), SourceError> {
        check_interval(interval)?;

        let status = open(&self.status_path)?;
        let variables = self.variables_path.as_deref().map(open).transpose()?;

        debug!("Opened {}", self.describe());
        self.opened = Some(OpenedFiles {
            status,
            variables,
            interval,
        });
        Ok(())
    }

    fn produce(&mut self) -> Result<SampleIter, SourceError> {
        let opened = self.opened.take().ok_or(SourceError::NotInitialized)?;
        info!("Replaying {}", self.describe());

        let status = SampleStream::new(opened.status, opened.interval, STATUS_DOMAIN, SampleClock::Uptime);

        let Some(variables) = opened.variables else {
            return Ok(Box::new(status));
        };

        // Variables dumps are consumed one record per status sample, so they
        // are never gated.
        let feed = SampleStream::new(variables, Duration::ZERO, VARIABLES_DOMAIN, SampleClock::Uptime)
            .map(|sample| sample.domain(VARIABLES_DOMAIN).map(<[MetricValue]>::to_vec).unwrap_or_default());

        Ok(Box::new(WithVariables::new(status, Box::new(feed), Vec::new())))
    }

    fn describe(&self) -> String {
        match &self.variables_path {
            Some(variables) => format!(
                "dump {} (variables from {})",
                self.status_path.display(),
                variables.display()
            ),
            None => format!("dump {}", self.status_path.display()),
        }
    }
}

/// Polls a live server through a long-running command such as
/// `mysqladmin extended-status -i1`.
pub struct CommandSource {
    command: String,
    variables_command: Option<String>,
    started: Option<StartedCommand>,
    interrupt: Option<Interrupt>,
}

struct StartedCommand {
    output: ChildOutput,
    variables: Vec<MetricValue>,
    interval: Duration,
}

impl CommandSource {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            variables_command: None,
            started: None,
            interrupt: None,
        }
    }

    pub fn with_variables(mut self, command: impl Into<String>) -> Self {
        self.variables_command = Some(command.into());
        self
    }
}

/// Splits a command line on whitespace. No shell is involved.
fn command_for(line: &str) -> Result<Command, SourceError> {
    let mut parts = line.split_whitespace();
    let program = parts.next().ok_or(SourceError::EmptyCommand)?;
    let mut command = Command::new(program);
    command.args(parts).stdin(Stdio::null());
    Ok(command)
}

/// Runs a command to completion and parses its output as one snapshot.
fn capture_snapshot(line: &str) -> Result<Vec<MetricValue>, SourceError> {
    let output = command_for(line)?
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| SourceError::Spawn {
            command: line.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceError::CommandFailed {
            command: line.to_string(),
            reason: format!("{} {}", output.status, stderr.trim()),
        });
    }

    let metrics = parse_snapshot(&output.stdout);
    if metrics.is_empty() {
        warn!("'{}' produced no numeric readings", line);
    }
    Ok(metrics)
}

impl SampleSource for CommandSource {
    fn initialize(&mut self, interval: Duration) -> Result<(), SourceError> {
        check_interval(interval)?;

        // Variables first so a failing snapshot does not leave a child behind.
        let variables = match &self.variables_command {
            Some(line) => capture_snapshot(line)?,
            None => Vec::new(),
        };

        let output = ChildOutput::spawn(&self.command)?;
        info!("Started {} (pid {})", self.describe(), output.id());
        self.interrupt = Some(output.interrupt());

        self.started = Some(StartedCommand {
            output,
            variables,
            interval,
        });
        Ok(())
    }

    fn produce(&mut self) -> Result<SampleIter, SourceError> {
        let started = self.started.take().ok_or(SourceError::NotInitialized)?;
        let status = SampleStream::new(started.output, started.interval, STATUS_DOMAIN, SampleClock::Wall);

        if started.variables.is_empty() {
            return Ok(Box::new(status));
        }
        Ok(Box::new(WithVariables::new(
            status,
            Box::new(std::iter::empty()),
            started.variables,
        )))
    }

    fn describe(&self) -> String {
        format!("command '{}'", self.command)
    }

    fn interrupt(&self) -> Option<Interrupt> {
        self.interrupt.clone()
    }
}

/// Stdout of a spawned command. Dropping it kills and reaps the child.
pub struct ChildOutput {
    stdout: ChildStdout,
    child: Arc<Mutex<Child>>,
}

impl ChildOutput {
    pub fn spawn(line: &str) -> Result<Self, SourceError> {
        let spawn_error = |source| SourceError::Spawn {
            command: line.to_string(),
            source,
        };

        let mut child = command_for(line)?
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_error)?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_error(io::Error::other("stdout was not captured")));
        };

        Ok(Self {
            stdout,
            child: Arc::new(Mutex::new(child)),
        })
    }

    pub fn id(&self) -> u32 {
        lock(&self.child).id()
    }

    pub fn interrupt(&self) -> Interrupt {
        Interrupt {
            child: Arc::clone(&self.child),
        }
    }
}

impl Read for ChildOutput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdout.read(buf)
    }
}

impl Drop for ChildOutput {
    fn drop(&mut self) {
        let mut child = lock(&self.child);
        let pid = child.id();
        match child.try_wait() {
            Ok(Some(status)) => debug!("Command (pid {}) exited: {}", pid, status),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                debug!("Stopped command (pid {})", pid);
            }
        }
    }
}

/// Attaches variables readings to every status sample.
///
/// Each status sample consumes the next record from `feed`; once the feed is
/// exhausted the last record seen keeps being attached.
pub struct WithVariables<S> {
    status: S,
    feed: Box<dyn Iterator<Item = Vec<MetricValue>> + Send>,
    last: Vec<MetricValue>,
}

impl<S> WithVariables<S> {
    pub fn new(
        status: S,
        feed: Box<dyn Iterator<Item = Vec<MetricValue>> + Send>,
        initial: Vec<MetricValue>,
    ) -> Self {
        Self {
            status,
            feed,
            last: initial,
        }
    }
}

impl<S: Iterator<Item = Sample>> Iterator for WithVariables<S> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let mut sample = self.status.next()?;
        if let Some(variables) = self.feed.next() {
            self.last = variables;
        }
        if !self.last.is_empty() {
            sample.insert_domain(VARIABLES_DOMAIN, self.last.clone());
        }
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dump(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_source_requires_initialize() {
        let mut source = FileSource::new("/nonexistent");
        assert!(matches!(source.produce(), Err(SourceError::NotInitialized)));
    }

    #[test]
    fn test_file_source_rejects_short_interval() {
        let status = dump("uptime\t1\n");
        let mut source = FileSource::new(status.path());
        assert!(matches!(
            source.initialize(Duration::from_millis(10)),
            Err(SourceError::IntervalTooShort(_))
        ));
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/status.txt");
        assert!(matches!(
            source.initialize(Duration::from_secs(1)),
            Err(SourceError::Open { .. })
        ));
    }

    #[test]
    fn test_variables_replay_in_lockstep() {
        let status = dump("uptime\t1\n\nuptime\t2\n\nuptime\t3\n");
        let variables = dump("max_connections\t100\n\nmax_connections\t200\n");
        let mut source = FileSource::new(status.path()).with_variables(variables.path());
        source.initialize(Duration::from_secs(1)).unwrap();

        let seen: Vec<f64> = source
            .produce()
            .unwrap()
            .map(|s| s.domain(VARIABLES_DOMAIN).unwrap()[0].value)
            .collect();
        assert_eq!(seen, vec![100.0, 200.0, 200.0]);

        // A second produce needs a new initialize.
        assert!(matches!(source.produce(), Err(SourceError::NotInitialized)));
    }

    #[test]
    fn test_command_source_empty_command() {
        let mut source = CommandSource::new("   ");
        assert!(matches!(
            source.initialize(Duration::from_secs(1)),
            Err(SourceError::EmptyCommand)
        ));
    }

    #[test]
    fn test_command_source_spawn_failure() {
        let mut source = CommandSource::new("/nonexistent/mysqladmin ext");
        assert!(matches!(
            source.initialize(Duration::from_secs(1)),
            Err(SourceError::Spawn { .. })
        ));
    }

    #[test]
    fn test_command_source_reads_stdout() {
        let status = dump("Uptime\t10\nThreads_running\t2\n\nUptime\t11\nThreads_running\t4\n");
        let command = format!("cat {}", status.path().display());
        let mut source = CommandSource::new(command);
        source.initialize(Duration::from_secs(1)).unwrap();

        let samples: Vec<Sample> = source.produce().unwrap().collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].clock(), SampleClock::Wall);
        assert_eq!(samples[1].domain(STATUS_DOMAIN).unwrap()[1].value, 4.0);
    }

    #[test]
    fn test_interrupt_unblocks_reader() {
        let mut source = CommandSource::new("sleep 30");
        assert!(source.interrupt().is_none());
        source.initialize(Duration::from_secs(1)).unwrap();

        let interrupt = source.interrupt().unwrap();
        let samples = source.produce().unwrap();
        let reader = std::thread::spawn(move || samples.count());

        std::thread::sleep(Duration::from_millis(100));
        interrupt.interrupt();
        assert_eq!(reader.join().unwrap(), 0);
    }

    #[test]
    fn test_file_source_needs_no_interrupt() {
        let status = dump("uptime\t1\n");
        let mut source = FileSource::new(status.path());
        source.initialize(Duration::from_secs(1)).unwrap();
        assert!(source.interrupt().is_none());
    }
}
