//! Configuration management for statline.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_INTERVAL: u64 = 1;
pub const DEFAULT_VIEW: &str = "cttf";
pub const DEFAULT_STATUS_COMMAND: &str = "mysqladmin extended-status -i1";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Effective statline configuration. Every field is optional so that files
/// only need to mention what they change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Sampling
    pub interval: Option<u64>,
    pub view: Option<String>,

    // Sources
    #[serde(alias = "status-file")]
    pub status_file: Option<PathBuf>,
    #[serde(alias = "variables-file")]
    pub variables_file: Option<PathBuf>,
    #[serde(alias = "status-command")]
    pub status_command: Option<String>,
    #[serde(alias = "variables-command")]
    pub variables_command: Option<String>,

    // Display
    #[serde(alias = "views-file")]
    pub views_file: Option<PathBuf>,
    /// Rows between repeated headers; unset means "fit the terminal"
    #[serde(alias = "header-every")]
    pub header_every: Option<usize>,
    #[serde(alias = "queue-capacity")]
    pub queue_capacity: Option<usize>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
    #[serde(alias = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Some(DEFAULT_INTERVAL),
            view: Some(DEFAULT_VIEW.to_string()),
            status_file: None,
            variables_file: None,
            status_command: None,
            variables_command: None,
            views_file: None,
            header_every: None,
            queue_capacity: Some(statline::pipeline::DEFAULT_QUEUE_CAPACITY),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
            log_file: None,
        }
    }
}

impl Config {
    /// Live command to poll when no dump file is configured.
    pub fn effective_status_command(&self) -> &str {
        self.status_command.as_deref().unwrap_or(DEFAULT_STATUS_COMMAND)
    }

    /// Log level from the config file, if it names a known one.
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        self.log_level
            .as_deref()
            .and_then(|level| LogLevel::from_str(level, true).ok())
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(interval) = cfg.interval {
        if interval < 1 {
            return Err("interval must be at least 1 second".into());
        }
    }

    if cfg.queue_capacity == Some(0) {
        return Err("queue_capacity must be at least 1".into());
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::from_str(level, true).is_err() {
            return Err(format!(
                "Invalid log_level '{}', expected one of off/error/warn/info/debug/trace",
                level
            )
            .into());
        }
    }

    // Exactly one status source: a dump file or a command
    match (&cfg.status_file, &cfg.status_command) {
        (Some(_), Some(_)) => {
            return Err("status_file and status_command are mutually exclusive".into());
        }
        (Some(file), None) => {
            if !file.exists() {
                return Err(format!("Status file not found: {}", file.display()).into());
            }
            if cfg.variables_command.is_some() {
                return Err("variables_command cannot be combined with status_file, \
                    use variables_file instead"
                    .into());
            }
        }
        (None, _) => {
            if cfg.variables_file.is_some() {
                return Err("variables_file requires status_file".into());
            }
            if cfg.effective_status_command().split_whitespace().next().is_none() {
                return Err("status_command is empty".into());
            }
        }
    }

    if let Some(file) = &cfg.variables_file {
        if !file.exists() {
            return Err(format!("Variables file not found: {}", file.display()).into());
        }
    }

    if let Some(file) = &cfg.views_file {
        if !file.exists() {
            return Err(format!("Views file not found: {}", file.display()).into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(view) = &args.view {
        config.view = Some(view.clone());
    }
    if let Some(interval) = args.interval {
        config.interval = Some(interval);
    }

    // A source given on the CLI replaces whatever source the file chose.
    if let Some(file) = &args.file {
        config.status_file = Some(file.clone());
        config.status_command = None;
        config.variables_command = None;
    }
    if let Some(command) = &args.status_command {
        config.status_command = Some(command.clone());
        config.status_file = None;
        config.variables_file = None;
    }
    if let Some(file) = &args.variables_file {
        config.variables_file = Some(file.clone());
    }
    if let Some(command) = &args.variables_command {
        config.variables_command = Some(command.clone());
    }

    if let Some(file) = &args.views_file {
        config.views_file = Some(file.clone());
    }
    if let Some(rows) = args.header_every {
        config.header_every = Some(rows);
    }
    if let Some(capacity) = args.queue_capacity {
        config.queue_capacity = Some(capacity);
    }
    if let Some(level) = args.log_level {
        config.log_level = level
            .to_possible_value()
            .map(|value| value.get_name().to_string());
    }

    Ok(config)
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => {
            // Try default locations
            let defaults = [
                "/etc/statline/statline.yaml",
                "/etc/statline/statline.yml",
                "./statline.yaml",
                "./statline.yml",
                "./statline.json",
                "./statline.toml",
            ];

            match defaults.iter().map(Path::new).find(|p| p.exists()) {
                Some(p) => p.to_path_buf(),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)?;
    parse_config(&content, &path)
}

/// Parses config text, picking the format from the file extension.
/// Fields the file leaves out keep their defaults.
pub fn parse_config(content: &str, path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let loaded: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        // Default to YAML
        _ => serde_yaml::from_str(content)?,
    };
    info!("Loaded configuration from: {}", path.display());

    Ok(merge_over_defaults(loaded))
}

fn merge_over_defaults(loaded: Config) -> Config {
    let defaults = Config::default();
    Config {
        interval: loaded.interval.or(defaults.interval),
        view: loaded.view.or(defaults.view),
        status_file: loaded.status_file,
        variables_file: loaded.variables_file,
        status_command: loaded.status_command,
        variables_command: loaded.variables_command,
        views_file: loaded.views_file,
        header_every: loaded.header_every,
        queue_capacity: loaded.queue_capacity.or(defaults.queue_capacity),
        log_level: loaded.log_level.or(defaults.log_level),
        log_file: loaded.log_file,
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, format)?);
    Ok(())
}

pub fn render_config(config: &Config, format: ConfigFormat) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["statline", "--no-config"];
        full.extend_from_slice(argv);
        Args::parse_from(full)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(validate_effective_config(&config).is_ok());
        assert_eq!(config.effective_status_command(), DEFAULT_STATUS_COMMAND);
        assert_eq!(config.effective_log_level(), Some(LogLevel::Warn));
    }

    #[test]
    fn test_cli_overrides() {
        let config = resolve_config(&args(&["innodb", "-i", "5", "--log-level", "debug"])).unwrap();
        assert_eq!(config.view.as_deref(), Some("innodb"));
        assert_eq!(config.interval, Some(5));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_file_replaces_command() {
        let mut dump = NamedTempFile::new().unwrap();
        writeln!(dump, "uptime\t1").unwrap();
        let path = dump.path().to_str().unwrap();

        let config = resolve_config(&args(&["-f", path])).unwrap();
        assert!(config.status_command.is_none());
        assert!(validate_effective_config(&config).is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let config = Config {
            interval: Some(0),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());

        let config = Config {
            queue_capacity: Some(0),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());

        let config = Config {
            status_file: Some(PathBuf::from("/nonexistent/status.txt")),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());

        let config = Config {
            variables_file: Some(PathBuf::from("/tmp")),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());

        let config = Config {
            log_level: Some("loud".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }

    #[test]
    fn test_parse_formats_merge_defaults() {
        let yaml = parse_config("interval: 3\n", Path::new("statline.yaml")).unwrap();
        assert_eq!(yaml.interval, Some(3));
        assert_eq!(yaml.view.as_deref(), Some(DEFAULT_VIEW));

        let json = parse_config(r#"{"view": "coms"}"#, Path::new("statline.json")).unwrap();
        assert_eq!(json.view.as_deref(), Some("coms"));
        assert_eq!(json.interval, Some(DEFAULT_INTERVAL));

        let toml = parse_config("header_every = 10\n", Path::new("statline.toml")).unwrap();
        assert_eq!(toml.header_every, Some(10));
    }

    #[test]
    fn test_render_round_trip() {
        let rendered = render_config(&Config::default(), ConfigFormat::Yaml).unwrap();
        let parsed = parse_config(&rendered, Path::new("x.yaml")).unwrap();
        assert_eq!(parsed.view.as_deref(), Some(DEFAULT_VIEW));
        assert!(render_config(&Config::default(), ConfigFormat::Toml).is_ok());
    }
}
