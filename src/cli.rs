//! CLI arguments and subcommands for statline.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Layout of generated dump files
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DumpFormat {
    /// `key<TAB>value` lines
    Batch,
    /// `| key | value |` tables
    Tabular,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "statline",
    about = "Scrolling terminal dashboard for database server status counters",
    long_about = "Scrolling terminal dashboard for database server status counters.\n\n\
                  Reads SHOW GLOBAL STATUS style snapshots from a live command \
                  (mysqladmin extended-status -i1) or from a captured dump, and prints \
                  one fixed-width row per interval using the selected view.",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// View to display (see `statline views`)
    pub view: Option<String>,

    /// Sampling interval in seconds
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Replay a captured status dump instead of polling
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Captured variables dump to replay alongside --file
    #[arg(long)]
    pub variables_file: Option<PathBuf>,

    /// Long-running command printing status snapshots
    #[arg(long = "command", value_name = "COMMAND")]
    pub status_command: Option<String>,

    /// Command printing a variables snapshot once at startup
    #[arg(long)]
    pub variables_command: Option<String>,

    /// Additional view definitions (YAML), merged over the built-in views
    #[arg(long)]
    pub views_file: Option<PathBuf>,

    /// Repeat the header every N rows (0 = print it once)
    #[arg(long)]
    pub header_every: Option<usize>,

    /// Samples buffered between reader and display
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available views
    Views {
        /// Describe every column
        #[arg(long)]
        verbose: bool,

        /// Only show this view
        #[arg(long)]
        view: Option<String>,
    },

    /// Generate configuration files
    Config {
        /// Output file path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Validate configuration, view definitions and the status source
    Check,

    /// Generate a synthetic status dump for replay
    GenerateTestdata {
        /// Output file path
        #[arg(short = 'o', long, default_value = "status.txt")]
        output: PathBuf,

        /// Number of snapshots to write
        #[arg(long, default_value_t = 60)]
        records: usize,

        /// Dump layout
        #[arg(long, value_enum, default_value = "batch")]
        format: DumpFormat,

        /// Uptime seconds between snapshots
        #[arg(long, default_value_t = 1)]
        step: u64,
    },
}
