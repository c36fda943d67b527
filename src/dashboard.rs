//! The foreground print loop.
//!
//! `Dashboard` owns the sample cache and the selected view. Each sample
//! received from the producer is installed in the cache and rendered as one
//! or more rows; the header is printed before the first row and again every
//! `header_every` rows.

use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use statline::{CommandSource, FileSource, Sample, SampleCache, SampleSource, View, ViewCatalog, ViewError};

use crate::config::Config;

pub struct Dashboard<W> {
    view: View,
    cache: SampleCache,
    /// 0 prints the header only once.
    header_every: usize,
    /// `None` until the first header went out.
    rows_since_header: Option<usize>,
    out: W,
}

impl<W: Write> Dashboard<W> {
    pub fn new(view: View, header_every: usize, out: W) -> Self {
        Self {
            view,
            cache: SampleCache::new(),
            header_every,
            rows_since_header: None,
            out,
        }
    }

    fn header_due(&self) -> bool {
        match self.rows_since_header {
            None => true,
            Some(rows) => self.header_every > 0 && rows >= self.header_every,
        }
    }

    /// Installs one sample and prints the rows it produces.
    pub fn show(&mut self, sample: Sample) -> io::Result<()> {
        self.cache.update(Some(sample));

        if self.header_due() {
            for line in self.view.header_lines() {
                writeln!(self.out, "{}", line)?;
            }
            self.rows_since_header = Some(0);
        }

        let lines = self.view.data_lines(&self.cache);
        for line in &lines {
            writeln!(self.out, "{}", line)?;
        }
        self.rows_since_header = self.rows_since_header.map(|rows| rows + lines.len());

        self.out.flush()
    }

    /// Consumes samples until the producer finishes or `cancel` fires.
    /// Returns the number of samples shown.
    pub async fn run(&mut self, mut samples: mpsc::Receiver<Sample>, cancel: CancellationToken) -> io::Result<usize> {
        let mut shown = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Display stopped after {} samples", shown);
                    break;
                }
                next = samples.recv() => match next {
                    Some(sample) => {
                        self.show(sample)?;
                        shown += 1;
                    }
                    None => {
                        debug!("Sample source finished after {} samples", shown);
                        break;
                    }
                }
            }
        }
        // Unblocks a producer waiting on a full queue.
        samples.close();
        Ok(shown)
    }

    #[cfg(test)]
    pub fn cache(&self) -> &SampleCache {
        &self.cache
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Built-in views with the configured views file merged over them.
pub fn load_catalog(config: &Config) -> Result<ViewCatalog, ViewError> {
    let mut catalog = ViewCatalog::builtin();
    if let Some(path) = &config.views_file {
        let count = catalog.merge_file(path)?;
        info!("Loaded {} views from {}", count, path.display());
    }
    Ok(catalog)
}

/// The status source selected by the configuration.
pub fn build_source(config: &Config) -> Box<dyn SampleSource> {
    match &config.status_file {
        Some(path) => {
            let mut source = FileSource::new(path);
            if let Some(variables) = &config.variables_file {
                source = source.with_variables(variables);
            }
            Box::new(source)
        }
        None => {
            let mut source = CommandSource::new(config.effective_status_command());
            if let Some(variables) = &config.variables_command {
                source = source.with_variables(variables.as_str());
            }
            Box::new(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statline::pipeline::spawn_producer;
    use statline::{MetricKind, MetricValue, SampleClock, STATUS_DOMAIN};

    fn view() -> View {
        ViewCatalog::from_yaml(
            "views:\n  - name: t\n    columns:\n      - {name: qps, type: rate, key: questions, width: 4}\n",
        )
        .unwrap()
        .build("t")
        .unwrap()
    }

    fn sample(uptime: f64, questions: f64) -> Sample {
        Sample::new(uptime, uptime, SampleClock::Uptime).with_domain(
            STATUS_DOMAIN,
            vec![MetricValue::new("questions", questions, MetricKind::Counter)],
        )
    }

    fn printed(dashboard: Dashboard<Vec<u8>>) -> Vec<String> {
        String::from_utf8(dashboard.into_inner())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_header_repeats() {
        let mut dashboard = Dashboard::new(view(), 2, Vec::new());
        for i in 0..5 {
            dashboard.show(sample(i as f64, i as f64 * 10.0)).unwrap();
        }
        let lines = printed(dashboard);
        let headers = lines.iter().filter(|l| l.ends_with(" qps")).count();
        assert_eq!(headers, 3);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[1], " 0:00:00    -");
        assert_eq!(lines[2], " 0:00:01   10");
    }

    #[test]
    fn test_header_once() {
        let mut dashboard = Dashboard::new(view(), 0, Vec::new());
        for i in 0..4 {
            dashboard.show(sample(i as f64, 0.0)).unwrap();
        }
        assert_eq!(printed(dashboard).len(), 5);
    }

    #[tokio::test]
    async fn test_run_until_source_ends() {
        let samples: Vec<Sample> = (0..6).map(|i| sample(i as f64, i as f64)).collect();
        let cancel = CancellationToken::new();
        let (rx, producer) = spawn_producer(samples, 1, cancel.clone());

        let mut dashboard = Dashboard::new(view(), 0, Vec::new());
        let shown = dashboard.run(rx, cancel).await.unwrap();

        assert_eq!(shown, 6);
        assert_eq!(producer.await.unwrap(), 6);
        assert_eq!(dashboard.cache().get_value("status", "questions"), 5.0);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let samples = (0..).map(|i| sample(i as f64, i as f64));
        let cancel = CancellationToken::new();
        let (rx, producer) = spawn_producer(samples, 1, cancel.clone());

        cancel.cancel();
        let mut dashboard = Dashboard::new(view(), 0, Vec::new());
        dashboard.run(rx, cancel).await.unwrap();

        // The producer notices the closed queue or the token and exits.
        assert!(producer.await.is_ok());
    }

    #[test]
    fn test_build_source_prefers_file() {
        let config = Config {
            status_file: Some("/tmp/status.txt".into()),
            ..Config::default()
        };
        assert!(build_source(&config).describe().starts_with("dump "));
        assert!(build_source(&Config::default()).describe().starts_with("command "));
    }
}
