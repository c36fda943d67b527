//! statline library
//!
//! Turns a stream of `SHOW GLOBAL STATUS` style snapshots into fixed-width
//! dashboard rows. The library does no terminal I/O of its own: callers feed
//! [`Sample`]s into a [`SampleCache`] and ask a [`View`] for its header and
//! data lines.
//!
//! # Pieces
//!
//! - **Parsing**: [`parser::SampleStream`] splits a byte stream into records,
//!   gates them to the sampling interval and yields [`Sample`]s
//! - **Sources**: [`FileSource`] replays dumps, [`CommandSource`] runs a
//!   long-lived status command
//! - **Cache**: [`SampleCache`] holds the current and previous generation
//! - **Columns and views**: [`Column`] renders one cell per sample,
//!   [`View`] lays a time column and its columns side by side
//! - **Pipeline**: [`pipeline::spawn_producer`] moves samples from a blocking
//!   source onto an async channel
//!
//! # Usage
//!
//! ```rust
//! use statline::{parser::SampleStream, SampleCache, SampleClock, ViewCatalog, STATUS_DOMAIN};
//! use std::time::Duration;
//!
//! let dump = "uptime\t10\nquestions\t100\nthreads_running\t2\n\n\
//!             uptime\t11\nquestions\t150\nthreads_running\t3\n";
//!
//! let views = ViewCatalog::from_yaml(
//!     "views:\n  - name: mini\n    columns:\n      \
//!      - {name: run, type: gauge, key: threads_running, width: 4}\n      \
//!      - {name: qps, type: rate, key: questions, width: 5}\n",
//! )
//! .unwrap();
//! let view = views.build("mini").unwrap();
//!
//! let mut cache = SampleCache::new();
//! let stream = SampleStream::new(dump.as_bytes(), Duration::from_secs(1), STATUS_DOMAIN, SampleClock::Uptime);
//! let mut rows = Vec::new();
//! for sample in stream {
//!     cache.update(Some(sample));
//!     rows.extend(view.data_lines(&cache));
//! }
//!
//! assert_eq!(view.header_lines(), vec!["    time  run   qps"]);
//! assert_eq!(rows, vec![" 0:00:10    2     -", " 0:00:11    3    50"]);
//! ```

pub mod cache;
pub mod column;
pub mod error;
pub mod key;
pub mod parser;
pub mod pipeline;
pub mod sample;
pub mod source;
pub mod units;
pub mod view;

// Re-export main types for convenience
pub use cache::SampleCache;
pub use column::{Column, ColumnDef, ColumnKind, KindDef};
pub use error::{KeyError, SourceError, ViewError};
pub use key::SourceKey;
pub use sample::{MetricKind, MetricValue, Sample, SampleClock, STATUS_DOMAIN, VARIABLES_DOMAIN};
pub use source::{CommandSource, FileSource, Interrupt, SampleIter, SampleSource};
pub use view::{View, ViewCatalog, ViewDef};
