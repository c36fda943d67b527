//! statline - version 0.1.0
//!
//! Scrolling terminal dashboard for database server status counters.
//! This is the main entry point that resolves configuration, handles
//! subcommands and runs the print loop.

mod cli;
mod commands;
mod config;
mod dashboard;
mod terminal;

use anyhow::Context;
use clap::Parser;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Level};

use statline::pipeline::{spawn_producer, DEFAULT_QUEUE_CAPACITY};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_generate_testdata, command_views};
use config::{resolve_config, show_config, validate_effective_config, Config, DEFAULT_INTERVAL, DEFAULT_VIEW};
use dashboard::{build_source, load_catalog, Dashboard};
use terminal::{rows_between_headers, terminal_size};

/// Initializes tracing logging subsystem with configured log level.
///
/// Logs go to stderr (or the configured log file) so they never interleave
/// with table rows on stdout. `off` installs no subscriber at all.
fn setup_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let level = config.effective_log_level().unwrap_or(LogLevel::Warn);
    let max_level = match level {
        LogLevel::Off => return Ok(()),
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| e as Box<dyn std::error::Error>)?;
        }
        None => {
            builder
                .with_writer(io::stderr)
                .try_init()
                .map_err(|e| e as Box<dyn std::error::Error>)?;
        }
    }

    info!("Logging initialized with level: {:?}", level);
    Ok(())
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Resolves once SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Runs the dashboard until the source ends or a shutdown signal arrives.
async fn run_dashboard(config: &Config) -> anyhow::Result<()> {
    let catalog = load_catalog(config).context("Cannot load view definitions")?;
    let view_name = config.view.as_deref().unwrap_or(DEFAULT_VIEW);
    let view = catalog
        .build(view_name)
        .with_context(|| format!("Cannot use view '{}'", view_name))?;

    let interval = Duration::from_secs(config.interval.unwrap_or(DEFAULT_INTERVAL));
    let mut source = build_source(config);
    source
        .initialize(interval)
        .with_context(|| format!("Cannot start {}", source.describe()))?;
    let samples = source.produce().context("Cannot read samples")?;
    info!(
        "Showing view '{}' every {}s from {}",
        view.name(),
        interval.as_secs(),
        source.describe()
    );

    let header_every = config.header_every.unwrap_or_else(|| {
        rows_between_headers(terminal_size().map(|(rows, _)| rows), view.header_lines().len())
    });
    debug!("Repeating header every {} rows", header_every);

    let cancel = CancellationToken::new();
    let capacity = config.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY);
    let (rx, producer) = spawn_producer(samples, capacity, cancel.clone());

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    // A live command may keep the producer blocked in a read; stopping the
    // child ends its output.
    if let Some(interrupt) = source.interrupt() {
        let stop = cancel.clone();
        tokio::spawn(async move {
            stop.cancelled().await;
            interrupt.interrupt();
        });
    }

    let mut dashboard = Dashboard::new(view, header_every, io::stdout());
    let shown = dashboard.run(rx, cancel.clone()).await;
    cancel.cancel();

    match producer.await {
        Ok(sent) => debug!("Producer finished after {} samples", sent),
        Err(e) => warn!("Producer task failed: {}", e),
    }

    match shown {
        Ok(count) => {
            info!("statline stopped after {} samples", count);
            Ok(())
        }
        // Reader of our stdout went away (e.g. piped into `head`).
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e).context("Cannot write to stdout"),
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        return match command {
            Commands::Config {
                output,
                format,
                commented,
            } => command_config(output.clone(), format.clone(), *commented),

            Commands::GenerateTestdata {
                output,
                records,
                format,
                step,
            } => command_generate_testdata(output.clone(), *records, *format, *step),

            // Reports problems itself instead of exiting on the first one
            Commands::Check => command_check(&resolve_config(&args)?),

            Commands::Views { verbose, view } => {
                let config = load_validated_config(&args)?;
                command_views(*verbose, view.clone(), &config)
            }
        };
    }

    let config = load_validated_config(&args)?;
    setup_logging(&config)?;

    info!("Starting statline");

    if let Err(e) = run_dashboard(&config).await {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
