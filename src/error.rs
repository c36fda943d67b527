//! Error types for the sample sources and view definitions.
//!
//! Only initialization and load-time problems surface as errors. Everything
//! that goes wrong while streaming or rendering is recovered locally.

use std::path::PathBuf;
use std::time::Duration;

/// Fatal errors raised while initializing or starting a sample source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("interval {0:?} is below the minimum of one second")]
    IntervalTooShort(Duration),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("empty command line")]
    EmptyCommand,

    #[error("source was not initialized (or was already consumed)")]
    NotInitialized,
}

/// Errors raised while loading or building view definitions.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("failed to parse view definitions: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot read view file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown view '{0}'")]
    UnknownView(String),

    #[error("view '{0}' is defined twice")]
    DuplicateView(String),

    #[error("view '{0}' has no columns")]
    EmptyView(String),

    #[error("column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },
}

/// A malformed `domain/name` source key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid source key '{key}': {reason}")]
pub struct KeyError {
    pub key: String,
    pub reason: &'static str,
}
